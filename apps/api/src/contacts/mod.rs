//! Contact Service: CRUD + soft-delete + filtered listing over contacts,
//! with block scoping, field encryption and audit recording.

pub mod contact_id;
pub mod handlers;
pub mod service;
