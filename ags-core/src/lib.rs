//! AGS Core
//!
//! Core types for the ArcGIS Server geoprocessing client.
//!
//! This crate contains:
//! - Domain types: job status, job messages, task results
//! - DTOs: wire shapes for the GP REST endpoints and the defensive
//!   collectors that turn them into domain values

pub mod domain;
pub mod dto;
