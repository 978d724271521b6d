mod config;
pub use config::{
    AppConfig, DEFAULT_BODY_LIMIT, DEFAULT_CHUNK_DELAY_MS, DEFAULT_PORT, parse_chunk_delay,
    parse_port,
};
