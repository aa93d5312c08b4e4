//! Core types and trait definitions for the presencia check-in backend.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod event;
pub mod person;
pub mod store;
