//! Custom Axum extractors.

pub mod validated_query;

pub use validated_query::ValidatedQuery;
