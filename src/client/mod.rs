//! Terminal side of the chat: streaming reader, transcript, and session

mod decoder;
mod session;
mod stream;
mod transcript;

pub use decoder::Utf8StreamDecoder;
pub use session::{ChatSession, STREAM_ERROR_ANNOTATION, SendOutcome, StreamUpdate};
pub use stream::{ChatClient, RequestError};
pub use transcript::{Message, Transcript};
