use std::env;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8787;
pub const DEFAULT_CHUNK_DELAY_MS: u64 = 200;
// Same cap the JSON body parser had in the original server
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Pause between two response fragments. Only exists to make the
    /// streaming visible, nothing depends on the exact value.
    pub chunk_delay: Duration,
    pub body_limit: usize,
    /// Base URL the terminal client talks to
    pub api_url: String,
}

impl AppConfig {
    /// Address the server binds to
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let host = env::var("STREAMCHAT_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_port(env::var("PORT").ok().as_deref());
        let chunk_delay = parse_chunk_delay(env::var("STREAMCHAT_CHUNK_DELAY_MS").ok().as_deref());
        let api_url = env::var("STREAMCHAT_API_URL")
            .unwrap_or_else(|_| format!("http://127.0.0.1:{}", port));

        Self {
            host,
            port,
            chunk_delay,
            body_limit: DEFAULT_BODY_LIMIT,
            api_url,
        }
    }
}

/// Parse the listen port, falling back to the default when the value
/// is missing, empty, or not a valid port number.
pub fn parse_port(value: Option<&str>) -> u16 {
    match value.map(str::trim) {
        None | Some("") => DEFAULT_PORT,
        Some(raw) => raw.parse::<u16>().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid port {:?}, using {}", raw, DEFAULT_PORT);
            DEFAULT_PORT
        }),
    }
}

pub fn parse_chunk_delay(value: Option<&str>) -> Duration {
    let millis = value
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_CHUNK_DELAY_MS);
    Duration::from_millis(millis)
}
