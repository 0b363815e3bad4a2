pub const DEFAULT_QUALITY: u8 = 80;
pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 100;

pub const DEFAULT_SHRINK_ENDPOINT: &str = "https://api.tinify.com/shrink";
pub const SHRINK_AUTH_USER: &str = "api";
pub const API_KEY_ENV: &str = "TINIFY_API_KEY";

/// Directory that receives compressed output, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "compressed";
/// Any path containing this marker is treated as pipeline output and never re-processed.
pub const COMPRESSED_MARKER: &str = "compressed";

pub const DEFAULT_KINDS: &[&str] = &["jpeg", "png"];

pub const HASH_BUFFER_SIZE: usize = 64 * 1024;

pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";

// Common output message prefixes
pub const SUCCESS_PREFIX: &str = "✅";
pub const WARNING_PREFIX: &str = "⚠️";
pub const ERROR_PREFIX: &str = "❌";
pub const INFO_PREFIX: &str = "📋";
