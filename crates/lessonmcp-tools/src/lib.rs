//! lessonmcp tools — the lesson-planning tool handlers.
//!
//! This crate contains:
//! - **tools**: `Tool` trait, registry, and the four lesson tools
//! - **prompts**: Hebrew prompt builders, one per tool
//! - **normalize**: JSON extraction from free-form model text
//! - **mappings**: Hebrew → English vocabulary for enumerated lesson fields

pub mod error;
pub mod mappings;
pub mod normalize;
pub mod prompts;
pub mod tools;

pub use error::{codes, NormalizeError, ToolError};
pub use normalize::{extract_json, ObjectWrap};
pub use tools::{Tool, ToolOutput, ToolRegistry};
