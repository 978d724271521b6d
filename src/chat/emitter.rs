//! Simulated streaming reply
//!
//! The reply is a fixed markdown document. The only part that depends
//! on the request is the line echoing the prompt back.
use std::time::Duration;

use tokio::sync::mpsc;

use super::models::ChatRequest;

/// The prompt the reply refers to: `prompt` when set, otherwise the
/// content of the last message, otherwise empty.
pub fn derive_prompt(request: &ChatRequest) -> &str {
    if let Some(prompt) = request.prompt.as_deref().filter(|p| !p.is_empty()) {
        return prompt;
    }
    request
        .messages
        .as_ref()
        .and_then(|messages| messages.last())
        .map(|m| m.content.as_str())
        .unwrap_or("")
}

/// Escape backticks so the prompt can't close the inline code span it
/// is embedded in.
pub fn escape_backticks(text: &str) -> String {
    text.replace('`', "\\`")
}

pub fn response_fragments(prompt: &str) -> Vec<String> {
    vec![
        String::from("# Streaming response\n\n"),
        format!("You asked for: `{}`\n\n", escape_backticks(prompt)),
        String::from("Here is some markdown with code and a list.\n\n"),
        String::from("- Item 1\n- Item 2\n- Item 3\n\n"),
        String::from("And a code block (TypeScript):\n\n"),
        String::from("```ts\n"),
        String::from("type Message = { role: 'user' | 'assistant'; content: string }\n"),
        String::from("async function* stream() {\n"),
        String::from("  yield 'Hello';\n"),
        String::from("}\n"),
        String::from("```\n\n"),
        String::from("Thanks for trying the streaming demo!\n"),
    ]
}

#[derive(Debug, PartialEq, Eq)]
pub enum EmitOutcome {
    /// Every fragment was handed to the response body
    Completed { written: usize },
    /// The receiving end went away before all fragments were written
    Disconnected { written: usize },
}

/// Write fragments to the response body channel in order, pausing
/// `delay` between two writes. Dropping the sender when this returns
/// ends the response.
pub async fn emit_fragments(
    tx: &mpsc::UnboundedSender<String>,
    fragments: Vec<String>,
    delay: Duration,
) -> EmitOutcome {
    let total = fragments.len();

    for (idx, fragment) in fragments.into_iter().enumerate() {
        if tx.send(fragment).is_err() {
            tracing::debug!("Client disconnected after {} of {} fragments", idx, total);
            return EmitOutcome::Disconnected { written: idx };
        }

        if idx + 1 < total && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    EmitOutcome::Completed { written: total }
}
