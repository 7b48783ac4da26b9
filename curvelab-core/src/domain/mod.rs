//! Domain types: run series, aggregates, summaries, conditions.

pub mod aggregate;
pub mod condition;
pub mod series;
pub mod summary;

pub use aggregate::ConditionAggregate;
pub use condition::{Condition, ConditionSet};
pub use series::{RunSeries, SeriesError};
pub use summary::ScalarSummary;
