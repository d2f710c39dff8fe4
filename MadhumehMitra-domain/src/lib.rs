// Madhumeh Mitra Domain
// This crate contains the business logic: targets, daily logs, history and the AI boundary

// Domain entities
pub mod entities;

// Services that implement business logic
pub mod services;

// External text generation (AI) boundary
pub mod ai;

// Identity providers (guest or signed-in)
pub mod auth;

// Hydration and activity reminders
pub mod reminders;

// Environment-driven configuration
pub mod config;

// Re-export the data layer for the binary
pub use madhumeh_mitra_data as data;
