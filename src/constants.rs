//! Application constants
//!
//! Centralized location for storage keys, endpoints defaults and fallback texts.

/// Default API base URL (Android emulator loopback to the dev backend)
pub const DEFAULT_API_URL: &str = "http://10.0.2.2:8000/api";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Directory created under the home directory for persisted state
pub const STORAGE_DIR_NAME: &str = ".gojob";

/// Log file written by the `gojob` binary
pub const LOG_FILE_NAME: &str = "gojob.log";

/// Application name
pub const APP_NAME: &str = "gojob";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// Persisted session keys
pub const AUTH_TOKEN_KEY: &str = "auth_token";
pub const USER_DATA_KEY: &str = "user_data";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

// Document cache keys
pub const PAYSLIPS_KEY: &str = "fichepaycand";
pub const CONTRACTS_KEY: &str = "contract";

/// Business-error message the backend sends for an expired token
pub const UNAUTHENTICATED_MESSAGE: &str = "Unauthenticated.";

/// Generic fallback when nothing more specific is known
pub const GENERIC_ERROR: &str = "Une erreur est survenue";
