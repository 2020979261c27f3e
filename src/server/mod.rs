//! HTTP server and middleware

pub mod handlers;
pub mod middleware;
pub mod server;
pub mod state;

pub use server::{run_server, HttpServer};
pub use state::AppState;
