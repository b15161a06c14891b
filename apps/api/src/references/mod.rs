//! Read-mostly reference-value lookups backing the classification dropdowns.

pub mod handlers;
