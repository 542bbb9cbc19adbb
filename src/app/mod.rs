//! Application layer: command orchestration on top of the domain services.

pub mod commands;
mod context;

pub use context::AppContext;
