use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage-assigned identifier, 1-based in insertion order.
pub type DocId = u64;

/// One quote document as it is stored and served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub author: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub title_url: Option<String>,
    pub like_count: i64,
    pub quote_url: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// A quote together with the identifier the store gave it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredQuote {
    pub id: DocId,
    #[serde(flatten)]
    pub quote: Quote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Text,
    Author,
    Title,
    TitleUrl,
    LikeCount,
    QuoteUrl,
    Tags,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Text => "text",
            Field::Author => "author",
            Field::Title => "title",
            Field::TitleUrl => "title_url",
            Field::LikeCount => "like_count",
            Field::QuoteUrl => "quote_url",
            Field::Tags => "tags",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Borrowed view of a single field value inside a [`Quote`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRef<'a> {
    Str(&'a str),
    Int(i64),
    List(&'a [String]),
}

impl Quote {
    /// Returns `None` when the field is absent or null.
    pub fn field(&self, field: Field) -> Option<FieldRef<'_>> {
        match field {
            Field::Text => Some(FieldRef::Str(&self.text)),
            Field::Author => Some(FieldRef::Str(&self.author)),
            Field::Title => self.title.as_deref().map(FieldRef::Str),
            Field::TitleUrl => self.title_url.as_deref().map(FieldRef::Str),
            Field::LikeCount => Some(FieldRef::Int(self.like_count)),
            Field::QuoteUrl => Some(FieldRef::Str(&self.quote_url)),
            Field::Tags => self.tags.as_deref().map(FieldRef::List),
        }
    }
}
