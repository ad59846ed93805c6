//! Domain types
//!
//! Core business entities shared between the client library and the CLI.

pub mod job;
