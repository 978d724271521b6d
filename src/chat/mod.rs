//! Chat request types, validation, and the simulated streaming reply

mod emitter;
mod models;
mod validate;

pub use emitter::{
    EmitOutcome, derive_prompt, emit_fragments, escape_backticks, response_fragments,
};
pub use models::{ChatMessage, ChatRequest, Role};
pub use validate::{
    Issue, IssueCode, MAX_PROMPT_LEN, PathSegment, ValidationError, validate_chat_request,
};
