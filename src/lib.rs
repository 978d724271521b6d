pub mod api;
pub mod chat;
pub mod cli;
pub mod client;
pub mod core;
