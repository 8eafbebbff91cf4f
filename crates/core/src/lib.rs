//! Domain layer for the Postul flyer pipeline.
//!
//! Holds everything the other crates share without depending on the
//! database, the HTTP stack, or the generative provider: id/timestamp
//! aliases, the domain error taxonomy, flyer geometry constants, prompt
//! builders, and conversation-turn types.

pub mod conversation;
pub mod error;
pub mod flyer;
pub mod prompt;
pub mod types;
