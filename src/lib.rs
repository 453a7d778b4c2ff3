pub mod api;
pub mod auth;
pub mod config;
pub mod constants;
pub mod core;
pub mod infrastructure;

pub use crate::core::errors::BalancerError;
pub use crate::core::service::BalancerService;
pub use crate::infrastructure::kv::in_memory::InMemoryKv;
pub use crate::infrastructure::logging::in_memory::InMemoryLogging;

#[cfg(test)]
mod tests;
