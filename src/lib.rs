pub mod agent;
pub mod analysis;
pub mod config;
pub mod error;
pub mod interaction_log;
pub mod workflow;
pub mod workspace;

#[cfg(test)]
pub(crate) mod testing;
