// Madhumeh Mitra Data
// This crate owns the persisted shape of daily logs and profiles and the stores behind them

// Database connection management
#[cfg(feature = "sqlite")]
pub mod database;

// Key-value backends and the daily log store
pub mod repository;

// Data storage models
pub mod models;
