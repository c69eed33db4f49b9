pub mod ai;
pub mod persona;

pub use ai::{ChatMessage, ChatRequest, CompletionClient, NO_CONTENT, render_answer};
pub use persona::Persona;
