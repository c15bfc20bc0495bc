//! Shared constants used across the application.

/// User agent string sent with page-fetch requests.
///
/// Identifies the tool to blog operators so mirrored traffic is easy to
/// recognize in their access logs.
pub const USER_AGENT: &str = "wxr-reporter/0.1 (blog participation reports)";
