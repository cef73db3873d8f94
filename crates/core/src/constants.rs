//! Constants used throughout the converter core crate.
//!
//! Defaults for every environment variable live here, together with the
//! collection names shared with existing deployments.

/// Default MongoDB database name.
pub const DEFAULT_DB_NAME: &str = "viralbox_db";

/// Default domain whose short links are accepted for conversion.
pub const DEFAULT_DOMAIN: &str = "viralbox.in";

/// Default health-check port.
pub const DEFAULT_HEALTH_PORT: u16 = 8000;

/// Default number of concurrent message handlers.
pub const DEFAULT_MAX_WORKERS: usize = 10;

/// Default worker threads for the standalone health server.
pub const DEFAULT_SERVER_WORKERS: usize = 4;

/// Default per-request timeout for the standalone health server, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Default Telegram Bot API base URL.
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Default shortener endpoint.
pub const DEFAULT_SHORTENER_API_URL: &str = "https://viralbox.in/api";

/// Default `getUpdates` long-poll timeout, in seconds.
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 50;

/// Default MongoDB connection pool size.
pub const DEFAULT_MONGO_MAX_POOL_SIZE: u32 = 50;

/// Collection holding `{longURL, shortURL}` mappings.
pub const LINKS_COLLECTION: &str = "links";

/// Collection holding `{userId, apiKey}` records.
pub const USER_APIS_COLLECTION: &str = "user_apis";

/// Support handle quoted in bot replies.
pub const SUPPORT_HANDLE: &str = "@viralbox_support";
