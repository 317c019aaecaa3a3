//! Shared constants

/// Lifetime of a presigned PUT URL.
pub const PRESIGNED_URL_TTL_SECS: u64 = 300;

/// Length of the random token embedded in storage keys.
pub const STORAGE_KEY_TOKEN_LEN: usize = 11;

/// Quota reported by a limiter that fails open.
pub const FAIL_OPEN_QUOTA: u32 = 1000;

/// Default sliding window length for named limiters.
pub const RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// Cookie carrying the Supabase access token when no bearer header is sent.
pub const SESSION_COOKIE: &str = "sb-access-token";

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Video content types accepted for the `videos` bucket.
pub const VIDEO_CONTENT_TYPES: &[&str] = &[
    "video/mp4",
    "video/webm",
    "video/quicktime",
    "video/x-msvideo",
    "video/x-matroska",
];

/// Image content types accepted for the `images` bucket.
pub const IMAGE_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];
