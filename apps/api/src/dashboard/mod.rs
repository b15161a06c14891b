//! Dashboard Aggregator: read-only cross-entity rollups, curator-scoped and
//! admin-global, built on the same access rules as the entity services.

pub mod handlers;
pub mod service;
pub mod transitions;
