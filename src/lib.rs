//! Blog participation reporter library.
//!
//! Reads a WordPress export (WXR), reports per-post content lengths, mirrors
//! each post's rendered page into an on-disk cache, extracts comment threads
//! from the cached pages, and aggregates participation statistics per author.

pub mod aggregate;
pub mod config;
pub mod constants;
pub mod export;
pub mod extract;
pub mod fetcher;
pub mod markup;
pub mod pipeline;
pub mod report;
