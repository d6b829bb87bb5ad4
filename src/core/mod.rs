//! Core chat components
//!
//! History windowing, request encoding, response decoding and the turn
//! orchestration that ties them to a completion service.

mod chat;
mod decoder;
mod encoder;
mod memory;
mod session;

pub use chat::{ChatEngine, ChatError};
pub use encoder::CompletionPayload;
pub use memory::MemoryStore;
pub use session::ChatSession;
