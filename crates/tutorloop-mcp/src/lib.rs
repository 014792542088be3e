//! Tutorloop MCP Server
//!
//! Model Context Protocol server exposing the question pipeline and the
//! knowledge base to AI assistants.

pub mod protocol;
mod server;
pub mod tools;

pub use server::{start_server, McpServer};
