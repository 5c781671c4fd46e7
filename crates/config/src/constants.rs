//! Centralized constants for the voice assistant
//!
//! Defaults used by config structs and by crates that need the same values
//! without going through `Settings`.

/// Completion service defaults
pub mod llm {
    /// OpenAI-compatible API base URL
    pub const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";

    /// Default chat model
    pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

    /// Environment variable holding the bearer token
    pub const DEFAULT_API_KEY_ENV: &str = "openai_token";

    /// Maximum output tokens for dialogue replies
    pub const DEFAULT_MAX_TOKENS: u32 = 300;

    /// Sampling temperature for dialogue replies
    pub const DEFAULT_TEMPERATURE: f32 = 0.5;

    /// Per-request timeout
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

    /// Extra attempts after the first failure (3 attempts in total)
    pub const DEFAULT_MAX_RETRIES: u32 = 2;

    /// First backoff delay, doubled on every retry
    pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 1000;
}

/// Dialogue defaults
pub mod dialogue {
    /// Turns kept in the sliding window
    pub const DEFAULT_MAX_TURNS: usize = 10;

    /// Field confirmed before dispatch
    pub const CONFIRM_FIELD: &str = "email";

    /// Meta-question used by the finished check
    pub const FINISHED_QUESTION: &str =
        "Is this conversation complete? Answer with 'yes' or 'no'.";

    /// Output budget for the finished check
    pub const FINISHED_MAX_TOKENS: u32 = 10;
}

/// HTTP server defaults
pub mod server {
    pub const DEFAULT_HOST: &str = "0.0.0.0";
    pub const DEFAULT_PORT: u16 = 8080;
    pub const DEFAULT_MAX_SESSIONS: usize = 100;
    pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 3600;
    pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 300;
}
