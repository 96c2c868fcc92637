//! Core library for the `concprobe` CLI.
//!
//! `concprobe` measures how much request concurrency an HTTP API sustains
//! before its success rate drops below a threshold. The crate provides CLI
//! argument types, configuration loading, request execution with bounded
//! concurrency and optional rate pacing, batch summaries, and the binary and
//! linear search policies that drive the probing. The primary user-facing
//! interface is the `concprobe` command-line application.
pub mod args;
pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod search;
