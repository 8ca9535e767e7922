pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
mod main_lib;

pub use main_lib::{build_state, build_store, init_tracing, AppState};
