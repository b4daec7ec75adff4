//! matka — bet slip and weekly chart client for a matka backend.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod auth;
pub mod api;
pub mod engine;
