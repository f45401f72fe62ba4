//! Adapters for OpenAI-compatible chat and embedding APIs.

pub mod chat;
pub mod embeddings;

pub use chat::OpenAiChat;
pub use embeddings::{OpenAiEmbeddings, OPENAI_API_KEY_ENV};
