//! Watchlist Service: role-gated threat registry with scheduled-check
//! tracking and aggregate statistics. Independent of the block/contact
//! access model.

pub mod handlers;
pub mod service;
pub mod stats;
