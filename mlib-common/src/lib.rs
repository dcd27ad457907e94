//! # mlib Common Library
//!
//! Shared code for the mlib song catalog service:
//! - Configuration loading from the environment
//! - PostgreSQL pool setup and schema bootstrap
//! - Song models
//! - Release date parsing and formatting

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
