//! Salesboard API Server module
//!
//! HTTP front-end over the dashboard pipeline. Run with `salesboard-server`.

pub mod handlers;
pub mod server;

pub use server::{build_router, run_api_server};
