//! Declaration core — types, manifest parsing, validation, composition.

pub mod compose;
pub mod compute;
pub mod error;
pub mod grants;
pub mod manifest;
pub mod routes;
pub mod types;
