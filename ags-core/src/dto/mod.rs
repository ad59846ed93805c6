//! DTOs (wire shapes) for the GP REST endpoints

pub mod job;
