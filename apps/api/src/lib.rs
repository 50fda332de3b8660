//! JobReady API: payment-gated resume and cover-letter generation.

pub mod checkout;
pub mod config;
pub mod errors;
pub mod generation;
pub mod identity;
pub mod llm_client;
pub mod models;
pub mod payments;
pub mod rate_limit;
pub mod render;
pub mod routes;
pub mod state;
pub mod store;

#[cfg(test)]
mod testing;
