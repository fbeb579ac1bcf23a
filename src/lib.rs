//! Feedforge - a scheduled RSS feed builder
//!
//! This crate fetches a configured list of RSS/Atom sources and maintains one
//! merged RSS 2.0 output file per source. An output file is rewritten only
//! when its content actually changed, so the scheduler driving this binary
//! can commit the working tree without producing spurious diffs.

pub mod config;
pub mod engine;
pub mod feed;
pub mod fetcher;
pub mod store;
