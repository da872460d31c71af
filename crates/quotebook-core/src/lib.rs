pub mod errors;
pub mod model;
pub mod predicate;
pub mod query;

pub use errors::*;
pub use model::*;
pub use predicate::Predicate;
pub use query::*;
