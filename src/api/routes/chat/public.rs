//! Public types for the chat API
use serde::Serialize;

use crate::chat::Issue;
pub use crate::chat::{ChatMessage, ChatRequest, Role};

pub const CONTENT_TYPE: &str = "text/plain; charset=utf-8";
pub const CACHE_CONTROL: &str = "no-cache";
pub const CONTENT_TYPE_OPTIONS: &str = "nosniff";

/// Body sent back when a chat request fails validation
#[derive(Serialize, Debug)]
pub struct InvalidBodyResponse {
    pub error: String,
    pub issues: Vec<Issue>,
}

impl InvalidBodyResponse {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self {
            error: String::from("Invalid body"),
            issues,
        }
    }
}
