use super::stream::{ChatClient, RequestError};
use super::transcript::{Message, Transcript};
use crate::chat::{ChatRequest, Role};

/// Appended to the assistant message when its reply could not be streamed
pub const STREAM_ERROR_ANNOTATION: &str = "\n\n[Error streaming response]";

#[derive(Debug)]
pub enum SendOutcome {
    /// Nothing was sent: the input was blank or a reply is still streaming
    Ignored,
    Completed {
        assistant_id: String,
    },
    Failed {
        assistant_id: String,
        error: RequestError,
    },
}

fn send_allowed(is_streaming: bool, input: &str) -> bool {
    !is_streaming && !input.trim().is_empty()
}

fn clear_allowed(is_streaming: bool) -> bool {
    !is_streaming
}

/// Read-only view of the session handed to the callback of
/// [`ChatSession::send`] after each piece of the reply is appended
#[derive(Debug)]
pub struct StreamUpdate<'a> {
    /// The text just appended to the assistant message
    pub chunk: &'a str,
    pub transcript: &'a Transcript,
    is_streaming: bool,
}

impl StreamUpdate<'_> {
    pub fn is_streaming(&self) -> bool {
        self.is_streaming
    }

    pub fn can_send(&self, input: &str) -> bool {
        send_allowed(self.is_streaming, input)
    }

    pub fn can_clear(&self) -> bool {
        clear_allowed(self.is_streaming)
    }
}

/// State of one chat session: the transcript and whether a reply is
/// currently streaming in. Owned by whatever drives the UI.
#[derive(Debug)]
pub struct ChatSession {
    client: ChatClient,
    transcript: Transcript,
    is_streaming: bool,
}

impl ChatSession {
    pub fn new(client: ChatClient) -> Self {
        Self {
            client,
            transcript: Transcript::new(),
            is_streaming: false,
        }
    }

    pub fn client(&self) -> &ChatClient {
        &self.client
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_streaming(&self) -> bool {
        self.is_streaming
    }

    pub fn can_send(&self, input: &str) -> bool {
        send_allowed(self.is_streaming, input)
    }

    pub fn can_clear(&self) -> bool {
        clear_allowed(self.is_streaming)
    }

    /// Drop every message. Refused while a reply is streaming.
    pub fn clear(&mut self) -> bool {
        if !self.can_clear() {
            return false;
        }
        self.transcript.clear();
        true
    }

    /// Send `input` as a user message and stream the reply into a new
    /// assistant message, calling `on_update` after each piece is
    /// appended. Transport and status errors are recorded in the
    /// assistant message rather than returned as `Err`.
    pub async fn send<F>(&mut self, input: &str, mut on_update: F) -> SendOutcome
    where
        F: FnMut(&StreamUpdate<'_>),
    {
        if !self.can_send(input) {
            return SendOutcome::Ignored;
        }

        self.transcript.push(Message::new(Role::User, input));

        // The conversation so far, ending with the new user message.
        // The assistant placeholder below is not part of it.
        let request = ChatRequest {
            prompt: Some(input.to_string()),
            messages: Some(self.transcript.to_chat_messages()),
        };

        let assistant = Message::new(Role::Assistant, "");
        let assistant_id = assistant.id.clone();
        self.transcript.push(assistant);
        self.is_streaming = true;

        let is_streaming = self.is_streaming;
        let transcript = &mut self.transcript;
        let result = self
            .client
            .stream_chat(&request, |chunk| {
                transcript.append_to(&assistant_id, chunk);
                on_update(&StreamUpdate {
                    chunk,
                    transcript: &*transcript,
                    is_streaming,
                });
            })
            .await;

        self.is_streaming = false;

        match result {
            Ok(()) => {
                if let Some(reply) = self.transcript.get(&assistant_id) {
                    tracing::debug!("Reply complete ({} bytes)", reply.content.len());
                }
                SendOutcome::Completed { assistant_id }
            }
            Err(error) => {
                tracing::warn!("Streaming reply failed: {}", error);
                self.transcript
                    .append_to(&assistant_id, STREAM_ERROR_ANNOTATION);
                SendOutcome::Failed {
                    assistant_id,
                    error,
                }
            }
        }
    }
}
