//! Common types shared by all storage aggregates

pub mod aggregate_id;

pub use aggregate_id::{parse_optional_id, AggregateId, ItemId};
