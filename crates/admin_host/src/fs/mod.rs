//! Device filesystem listing models and path helpers.

pub mod path;
pub mod types;
