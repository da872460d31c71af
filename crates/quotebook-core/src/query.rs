use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Concrete value for an equality filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Text(String),
}

/// Inclusive bounds; `None` leaves that side open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Bounds {
    #[serde(default)]
    pub min: Option<i64>,
    #[serde(default)]
    pub max: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TagMatch {
    /// Document tags must contain every requested tag.
    #[default]
    All,
    /// Document tags must contain at least one requested tag.
    Any,
}

impl fmt::Display for TagMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagMatch::All => f.write_str("all"),
            TagMatch::Any => f.write_str("any"),
        }
    }
}

impl FromStr for TagMatch {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "all" => Ok(TagMatch::All),
            "any" => Ok(TagMatch::Any),
            other => Err(format!("unknown tag match mode `{other}` (expected all|any)")),
        }
    }
}

/// How a single field of a [`SearchRequest`] constrains documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FieldFilter {
    #[default]
    Unset,
    Presence(bool),
    Equals(Scalar),
    Range(Bounds),
    SetMatch { mode: TagMatch, values: Vec<String> },
}

impl FieldFilter {
    pub fn kind(&self) -> &'static str {
        match self {
            FieldFilter::Unset => "unset",
            FieldFilter::Presence(_) => "presence",
            FieldFilter::Equals(_) => "equals",
            FieldFilter::Range(_) => "range",
            FieldFilter::SetMatch { .. } => "set_match",
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, FieldFilter::Unset)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SearchRequest {
    #[serde(default)]
    pub author: FieldFilter,
    #[serde(default)]
    pub title: FieldFilter,
    #[serde(default)]
    pub like_count: FieldFilter,
    #[serde(default)]
    pub tags: FieldFilter,
}

/// Knobs that change how a [`SearchRequest`] is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Compatibility flag: a bound of exactly zero counts as "not provided".
    pub zero_bound_as_unset: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            zero_bound_as_unset: true,
        }
    }
}

/// Raw query-string parameters as they arrive at the transport layer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub like_count_min: Option<i64>,
    #[serde(default)]
    pub like_count_max: Option<i64>,
    #[serde(default)]
    pub tags_str: Option<String>,
    #[serde(default)]
    pub tags_type: TagMatch,
}

impl SearchParams {
    pub fn into_request(self, opts: &SearchOptions) -> SearchRequest {
        let provided = |b: Option<i64>| match b {
            Some(0) if opts.zero_bound_as_unset => None,
            other => other,
        };
        let like_count =
            if provided(self.like_count_min).is_some() || provided(self.like_count_max).is_some() {
                FieldFilter::Range(Bounds {
                    min: self.like_count_min,
                    max: self.like_count_max,
                })
            } else {
                FieldFilter::Unset
            };
        let tags = match self.tags_str {
            Some(s) if !s.is_empty() => FieldFilter::SetMatch {
                mode: self.tags_type,
                values: s.split(',').map(str::to_string).collect(),
            },
            _ => FieldFilter::Unset,
        };
        SearchRequest {
            author: text_filter(self.author),
            title: text_filter(self.title),
            like_count,
            tags,
        }
    }
}

fn text_filter(raw: Option<String>) -> FieldFilter {
    match raw {
        None => FieldFilter::Unset,
        Some(s) => match parse_flag(&s) {
            Some(flag) => FieldFilter::Presence(flag),
            None => FieldFilter::Equals(Scalar::Text(s)),
        },
    }
}

/// Lax boolean spelling accepted for presence flags on text parameters.
pub fn parse_flag(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "on" | "t" | "true" | "y" | "yes" => Some(true),
        "0" | "off" | "f" | "false" | "n" | "no" => Some(false),
        _ => None,
    }
}
