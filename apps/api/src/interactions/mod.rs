//! Interaction Service: CRUD + soft-delete over interactions, cascading
//! touch dates and status changes onto the parent contact.

pub mod handlers;
pub mod service;
pub mod status_change;
