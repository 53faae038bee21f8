//! HTTP front end: OpenAI-compatible chat completions with repository context.

mod error;
mod handlers;
mod router;
mod server;

pub use error::GatewayError;
pub use server::GatewayServer;
