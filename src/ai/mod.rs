// src/ai/mod.rs
pub mod client;
pub mod gateway;
pub mod parser;
pub mod prompts;

pub use client::{ChatMessage, CompletionClient, CompletionRequest, OpenAiClient, Role};
pub use gateway::{AiGateway, DEFAULT_MODEL};
pub use parser::parse_work_experience;
