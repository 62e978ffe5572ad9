//! Snaplink - a URL shortener engine
//!
//! # Architecture
//! - `codegen`: base62 short codes from a monotonic counter
//! - `cache`: fixed-capacity LRU link cache with hit/miss stats
//! - `ratelimit`: per-client token bucket admission control
//! - `analytics`: click recording, bounded recent-click logs and aggregates
//! - `storage`: the `Store` trait with memory and JSON-file backends
//! - `services`: `LinkService`, which wires the components above together
//! - `api`: actix-web handlers under `/api`
//! - `config` / `system` / `runtime`: configuration, logging and server startup

pub mod analytics;
pub mod api;
pub mod cache;
pub mod codegen;
pub mod config;
pub mod errors;
pub mod ratelimit;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
