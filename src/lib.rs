//! litelytics - A minimal, cookie-less web analytics collector
//!
//! Tracks pageviews with:
//! - A drop-in `<script>` beacon for tracked pages
//! - Daily session fingerprints instead of cookies
//! - Aggregate stats (visitors, time series, top pages) per site

pub mod config;
pub mod db;
pub mod error;
pub mod session;
pub mod web;
