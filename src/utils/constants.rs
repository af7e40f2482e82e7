//! Shared constants and invariants

/// Lifetime of a signed service-account assertion.
pub const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// A cached access token is refreshed once it expires within this margin.
/// Kept equal to the assertion lifetime for compatibility with the deployed job.
pub const TOKEN_SAFETY_MARGIN_SECS: i64 = 3600;
pub const TOKEN_EXCHANGE_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_IAM_TOKEN_URL: &str = "https://iam.api.cloud.yandex.net/iam/v1/tokens";
pub const DEFAULT_COMPLETION_URL: &str = "https://llm.api.cloud.yandex.net/foundationModels/v1/completion";

pub const FEEDBACK_JWT_APP: &str = "feedback_report";
pub const FEEDBACK_JWT_LIFETIME_SECS: i64 = 60;
pub const FEEDBACK_PATH: &str = "/feedbacks";

pub const COMPLETION_TEMPERATURE: f64 = 0.1;
pub const COMPLETION_MAX_TOKENS: &str = "32000";
pub const ALTERNATIVE_STATUS_CONTENT_FILTER: &str = "ALTERNATIVE_STATUS_CONTENT_FILTER";

pub const REPORT_WINDOW_DAYS: i64 = 7;
pub const FEEDBACK_SEPARATOR: &str = "\n\n";

pub const DEFAULT_FEEDBACK_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SUMMARIZER_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAIL_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SMTP_PORT: u16 = 465;
