mod openai;

pub use openai::{LlmClient, LlmConfig, LlmMessage};
