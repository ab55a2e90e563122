//! The four lesson tools and their registry.

pub mod base;
pub mod chat;
pub mod generate;
pub mod registry;
pub mod suggestion;
pub mod update;

#[cfg(test)]
pub(crate) mod testing;

pub use base::{Materials, Tool, ToolContent, ToolOutput};
pub use registry::ToolRegistry;
