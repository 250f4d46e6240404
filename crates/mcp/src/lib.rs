// MCP server exposing kintone as tools for agent clients

pub mod protocol;
pub mod server;
pub mod settings;
pub mod tools;

pub use server::McpServer;
pub use settings::{Args, Settings, SettingsError};
