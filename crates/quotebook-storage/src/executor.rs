//! Query execution over a [`Storage`] handle: conjunctive search and uniform
//! random selection.
//!
//! [`RandomStrategy::ContiguousIds`] assumes the store numbers its documents
//! `1..=N` without gaps. A store with holes in its numbering makes that
//! strategy fail with [`QuoteError::NotFound`] for the missing ids;
//! [`RandomStrategy::LiveIds`] has no such constraint.

use crate::traits::Storage;
use quotebook_core::predicate::{conjunction, field_predicates};
use quotebook_core::{
    Field, Predicate, QuoteError, Result, SearchOptions, SearchRequest, StoredQuote,
};
use rand::seq::SliceRandom;
use rand::Rng;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RandomStrategy {
    /// Draw an id uniformly from `1..=count()` and fetch it.
    #[default]
    ContiguousIds,
    /// Draw uniformly from the store's list of live ids.
    LiveIds,
}

impl FromStr for RandomStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "contiguous" => Ok(RandomStrategy::ContiguousIds),
            "live" => Ok(RandomStrategy::LiveIds),
            other => Err(format!(
                "unknown random strategy `{other}` (expected contiguous|live)"
            )),
        }
    }
}

/// Builds the single AND-ed predicate for `req`, fields taken in the order
/// author, title, like_count, tags.
pub fn build_predicate(req: &SearchRequest, opts: &SearchOptions) -> Result<Predicate> {
    let mut preds = Vec::new();
    for (field, filter) in [
        (Field::Author, &req.author),
        (Field::Title, &req.title),
        (Field::LikeCount, &req.like_count),
        (Field::Tags, &req.tags),
    ] {
        preds.extend(field_predicates(field, filter, opts)?);
    }
    Ok(conjunction(preds))
}

pub fn search<S: Storage + ?Sized>(
    store: &S,
    req: &SearchRequest,
    opts: &SearchOptions,
) -> Result<Vec<StoredQuote>> {
    let predicate = build_predicate(req, opts)?;
    let docs = store.search(&predicate)?;
    tracing::debug!(?predicate, matched = docs.len(), "search");
    Ok(docs)
}

/// Uniform pick from a non-empty slice.
pub fn pick_random<'a, T, R: Rng + ?Sized>(items: &'a [T], rng: &mut R) -> Result<&'a T> {
    items
        .choose(rng)
        .ok_or_else(|| QuoteError::InvalidArgument("cannot pick from an empty collection".into()))
}

pub fn pick_random_from_store<S: Storage + ?Sized, R: Rng + ?Sized>(
    store: &S,
    rng: &mut R,
    strategy: RandomStrategy,
) -> Result<StoredQuote> {
    match strategy {
        RandomStrategy::ContiguousIds => {
            let n = store.count() as u64;
            if n == 0 {
                return Err(QuoteError::InvalidArgument("store is empty".into()));
            }
            store.get(rng.gen_range(1..=n))
        }
        RandomStrategy::LiveIds => {
            let ids = store.live_ids();
            let id = *pick_random(&ids, rng)?;
            store.get(id)
        }
    }
}

/// Searches, then picks one match. `Ok(None)` means nothing matched.
pub fn search_then_random<S: Storage + ?Sized, R: Rng + ?Sized>(
    store: &S,
    req: &SearchRequest,
    opts: &SearchOptions,
    rng: &mut R,
) -> Result<Option<StoredQuote>> {
    let docs = search(store, req, opts)?;
    if docs.is_empty() {
        return Ok(None);
    }
    pick_random(&docs, rng).map(|d| Some(d.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStore;
    use quotebook_core::{Bounds, FieldFilter, Quote, Scalar, TagMatch};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn quote(author: &str, likes: i64, title: Option<&str>, tags: Option<&[&str]>) -> Quote {
        Quote {
            text: format!("{author} on {likes}"),
            author: author.to_string(),
            title: title.map(str::to_string),
            title_url: None,
            like_count: likes,
            quote_url: format!("https://quotes.example/{author}/{likes}"),
            tags: tags.map(|t| t.iter().map(|s| s.to_string()).collect()),
        }
    }

    fn corpus() -> InMemoryStore {
        InMemoryStore::from_quotes([
            quote("Rumi", 10, None, Some(&["life"])),
            quote("Rumi", 2, Some("Masnavi"), Some(&["wisdom", "life"])),
            quote("Lao Tzu", 7, Some("Tao Te Ching"), Some(&["wisdom"])),
            quote("Seneca", 3, None, None),
            quote("Seneca", 0, Some("Letters"), Some(&["death", "life", "wisdom"])),
        ])
    }

    fn ids(docs: &[StoredQuote]) -> Vec<u64> {
        docs.iter().map(|d| d.id).collect()
    }

    fn tags(mode: TagMatch, values: &[&str]) -> FieldFilter {
        FieldFilter::SetMatch {
            mode,
            values: values.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn empty_request_returns_whole_store_in_order() {
        let store = corpus();
        let docs = search(&store, &SearchRequest::default(), &SearchOptions::default()).unwrap();
        assert_eq!(ids(&docs), vec![1, 2, 3, 4, 5]);
        assert_eq!(
            build_predicate(&SearchRequest::default(), &SearchOptions::default()).unwrap(),
            Predicate::Everything
        );
    }

    #[test]
    fn author_and_lower_bound_example() {
        let store = InMemoryStore::from_quotes([
            quote("Rumi", 10, None, Some(&["life"])),
            quote("Rumi", 2, None, Some(&["wisdom", "life"])),
        ]);
        let req = SearchRequest {
            author: FieldFilter::Equals(Scalar::Text("Rumi".into())),
            like_count: FieldFilter::Range(Bounds {
                min: Some(5),
                max: None,
            }),
            ..Default::default()
        };
        let docs = search(&store, &req, &SearchOptions::default()).unwrap();
        assert_eq!(ids(&docs), vec![1]);
    }

    #[test]
    fn range_results_respect_bounds() {
        let store = corpus();
        let bounded = SearchRequest {
            like_count: FieldFilter::Range(Bounds {
                min: Some(3),
                max: Some(7),
            }),
            ..Default::default()
        };
        let docs = search(&store, &bounded, &SearchOptions::default()).unwrap();
        assert!(docs.iter().all(|d| (3..=7).contains(&d.quote.like_count)));
        assert_eq!(ids(&docs), vec![3, 4]);

        let open = SearchRequest {
            like_count: FieldFilter::Range(Bounds {
                min: Some(3),
                max: None,
            }),
            ..Default::default()
        };
        let docs = search(&store, &open, &SearchOptions::default()).unwrap();
        assert_eq!(ids(&docs), vec![1, 3, 4]);
    }

    #[test]
    fn zero_bound_compat_flag_changes_results() {
        let store = corpus();
        let req = SearchRequest {
            like_count: FieldFilter::Range(Bounds {
                min: None,
                max: Some(0),
            }),
            ..Default::default()
        };
        let legacy = search(&store, &req, &SearchOptions::default()).unwrap();
        assert_eq!(legacy.len(), 5);
        let strict = search(
            &store,
            &req,
            &SearchOptions {
                zero_bound_as_unset: false,
            },
        )
        .unwrap();
        assert_eq!(ids(&strict), vec![5]);
    }

    #[test]
    fn presence_flags_partition_the_store() {
        let store = corpus();
        let with = SearchRequest {
            title: FieldFilter::Presence(true),
            ..Default::default()
        };
        let without = SearchRequest {
            title: FieldFilter::Presence(false),
            ..Default::default()
        };
        let opts = SearchOptions::default();
        let a = ids(&search(&store, &with, &opts).unwrap());
        let b = ids(&search(&store, &without, &opts).unwrap());
        assert_eq!(a, vec![2, 3, 5]);
        assert_eq!(b, vec![1, 4]);
    }

    #[test]
    fn tag_modes() {
        let store = corpus();
        let opts = SearchOptions::default();
        let all = SearchRequest {
            tags: tags(TagMatch::All, &["wisdom", "life"]),
            ..Default::default()
        };
        assert_eq!(ids(&search(&store, &all, &opts).unwrap()), vec![2, 5]);
        let any = SearchRequest {
            tags: tags(TagMatch::Any, &["wisdom", "life"]),
            ..Default::default()
        };
        assert_eq!(ids(&search(&store, &any, &opts).unwrap()), vec![1, 2, 3, 5]);
    }

    #[test]
    fn filters_combine_with_and() {
        let store = corpus();
        let req = SearchRequest {
            author: FieldFilter::Equals(Scalar::Text("Seneca".into())),
            title: FieldFilter::Presence(true),
            tags: tags(TagMatch::Any, &["life"]),
            ..Default::default()
        };
        let docs = search(&store, &req, &SearchOptions::default()).unwrap();
        assert_eq!(ids(&docs), vec![5]);
    }

    #[test]
    fn no_match_is_empty_not_error() {
        let store = corpus();
        let req = SearchRequest {
            author: FieldFilter::Equals(Scalar::Text("Nobody".into())),
            ..Default::default()
        };
        assert!(search(&store, &req, &SearchOptions::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn exact_field_values_find_document_once() {
        let store = corpus();
        let target = store.get(3).unwrap();
        let req = SearchRequest {
            author: FieldFilter::Equals(Scalar::Text(target.quote.author.clone())),
            title: FieldFilter::Equals(Scalar::Text(target.quote.title.clone().unwrap())),
            like_count: FieldFilter::Range(Bounds {
                min: Some(target.quote.like_count),
                max: Some(target.quote.like_count),
            }),
            tags: FieldFilter::SetMatch {
                mode: TagMatch::All,
                values: target.quote.tags.clone().unwrap(),
            },
        };
        let docs = search(&store, &req, &SearchOptions::default()).unwrap();
        assert_eq!(docs, vec![target]);
    }

    #[test]
    fn malformed_filter_fails_loudly() {
        let store = corpus();
        let req = SearchRequest {
            tags: FieldFilter::Equals(Scalar::Text("life".into())),
            ..Default::default()
        };
        let err = search(&store, &req, &SearchOptions::default()).unwrap_err();
        assert!(matches!(err, QuoteError::MalformedFilter { field: "tags", .. }));
    }

    #[test]
    fn pick_random_single_and_empty() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(pick_random(&[42], &mut rng), Ok(&42));
        let empty: [u8; 0] = [];
        assert!(matches!(
            pick_random(&empty, &mut rng),
            Err(QuoteError::InvalidArgument(_))
        ));
    }

    #[test]
    fn store_wide_pick_is_roughly_uniform() {
        let store = corpus();
        let mut rng = StdRng::seed_from_u64(0xC0FFEE);
        let trials = 20_000;
        for strategy in [RandomStrategy::ContiguousIds, RandomStrategy::LiveIds] {
            let mut counts = [0usize; 5];
            for _ in 0..trials {
                let d = pick_random_from_store(&store, &mut rng, strategy).unwrap();
                counts[(d.id - 1) as usize] += 1;
            }
            let expected = trials / 5;
            for c in counts {
                assert!(
                    c.abs_diff(expected) < expected / 10,
                    "{strategy:?}: {counts:?}"
                );
            }
        }
    }

    #[test]
    fn empty_store_pick_is_invalid_argument() {
        let store = InMemoryStore::new();
        let mut rng = StdRng::seed_from_u64(1);
        for strategy in [RandomStrategy::ContiguousIds, RandomStrategy::LiveIds] {
            assert!(matches!(
                pick_random_from_store(&store, &mut rng, strategy),
                Err(QuoteError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn id_gap_breaks_contiguous_strategy_only() {
        let store = InMemoryStore::new();
        store.replay_insert(1, quote("a", 1, None, None));
        store.replay_insert(3, quote("c", 1, None, None));
        let mut rng = StdRng::seed_from_u64(3);
        let mut saw_gap = false;
        for _ in 0..200 {
            match pick_random_from_store(&store, &mut rng, RandomStrategy::ContiguousIds) {
                Ok(d) => assert_eq!(d.id, 1),
                Err(QuoteError::NotFound(2)) => saw_gap = true,
                Err(e) => panic!("unexpected error: {e}"),
            }
            let live = pick_random_from_store(&store, &mut rng, RandomStrategy::LiveIds).unwrap();
            assert!(live.id == 1 || live.id == 3);
        }
        assert!(saw_gap);
    }

    #[test]
    fn search_then_random_reports_no_match() {
        let store = corpus();
        let mut rng = StdRng::seed_from_u64(9);
        let none = SearchRequest {
            author: FieldFilter::Equals(Scalar::Text("Nobody".into())),
            ..Default::default()
        };
        assert_eq!(
            search_then_random(&store, &none, &SearchOptions::default(), &mut rng).unwrap(),
            None
        );
        let rumi = SearchRequest {
            author: FieldFilter::Equals(Scalar::Text("Rumi".into())),
            ..Default::default()
        };
        for _ in 0..20 {
            let d = search_then_random(&store, &rumi, &SearchOptions::default(), &mut rng)
                .unwrap()
                .unwrap();
            assert_eq!(d.quote.author, "Rumi");
        }
    }

    #[test]
    fn strategy_parses_from_config_strings() {
        assert_eq!("live".parse::<RandomStrategy>(), Ok(RandomStrategy::LiveIds));
        assert_eq!(
            "contiguous".parse::<RandomStrategy>(),
            Ok(RandomStrategy::ContiguousIds)
        );
        assert!("random".parse::<RandomStrategy>().is_err());
    }
}
