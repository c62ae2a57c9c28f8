// ABOUTME: LASCSS language server library: configuration, documents, completion and the message loop
// ABOUTME: The binary wires this to stdio; tests drive it over in-memory connections

pub mod completion_engine;
pub mod config;
pub mod documents;
pub mod notices;
pub mod server;

pub use completion_engine::{ClassContext, CompletionEngine};
pub use config::LspConfig;
pub use server::{ClearCache, Server, run_server, server_capabilities};
