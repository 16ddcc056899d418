/// Application name
pub const APP_NAME: &str = "PawChat";

/// Delay between two incremental poll ticks, in milliseconds
pub const POLL_INTERVAL_MS: u64 = 2_000;

/// Lower bound accepted for a configured poll interval, in milliseconds
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

/// Number of messages fetched when a conversation is opened
pub const HISTORY_PAGE_SIZE: u32 = 50;

/// Largest history window a client may request
pub const MAX_HISTORY_PAGE_SIZE: u32 = 200;

/// Maximum message length in characters, checked before sending
pub const MAX_MESSAGE_CHARS: usize = 4_000;

/// Default per-request timeout in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default backend base URL (local development)
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Capacity of a conversation's event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 64;
