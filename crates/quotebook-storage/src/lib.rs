pub mod executor;
pub mod mem;
pub mod persistent;
pub mod snapshot;
pub mod traits;

pub use executor::{
    pick_random, pick_random_from_store, search, search_then_random, RandomStrategy,
};
pub use mem::InMemoryStore;
pub use persistent::PersistentStore;
pub use traits::*;
