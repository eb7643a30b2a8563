//! Business rules for jokebot, on top of the storage layer.

pub mod services;

pub use services::*;
