pub mod anthropic_llm;
pub mod db;
pub mod dispatch;
pub mod memory;
pub mod openai_llm;

pub use anthropic_llm::AnthropicChatAdapter;
pub use db::PgStore;
pub use dispatch::ModelDispatcher;
pub use memory::MemoryStore;
pub use openai_llm::OpenAiChatAdapter;
