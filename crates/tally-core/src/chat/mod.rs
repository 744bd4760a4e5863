//! Conversational memory for the expense assistant.
//!
//! - `ConversationStore`: per-user turn log plus one rolling summary
//! - `policy`: when to compress
//! - `MemoryManager`: drives one exchange end to end
//! - `strategy`: deterministic answers tried before the completion service

pub mod compressor;
pub mod memory;
pub mod policy;
pub mod prompt;
pub mod spend;
pub mod store;
pub mod strategy;
