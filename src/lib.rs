//! Libris Library Circulation System
//!
//! A Rust REST backend for library circulation: it tracks which members hold
//! which books, enforces borrowing limits, computes overdue penalties, and
//! keeps book stock counts consistent with active loans.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod penalty;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
