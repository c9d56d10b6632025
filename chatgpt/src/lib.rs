//! Chat Completions client for outline generation.

pub mod client;

pub use client::*;
