pub mod domain;
pub mod models;
pub mod ports;

pub use domain::{
    ChatMessage, ChatReply, Conversation, ConversationStep, Document, DocumentPatch,
    NewDocument, Role,
};
pub use models::{ModelId, Provider, UnknownModel};
pub use ports::{ChatModelService, ConversationStore, DocumentStore, PortError, PortResult};
