//! HTTP request handlers.

pub mod flyers;
