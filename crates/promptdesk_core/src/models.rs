//! crates/promptdesk_core/src/models.rs
//!
//! The closed catalog of supported logical model names and the fixed mapping
//! from each one to its provider and backend model identifier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The two supported provider families. Dispatch is a pure function of the
/// logical model name; there is no runtime negotiation or fallback discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
}

impl Provider {
    pub fn name(self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::Anthropic => "Anthropic",
        }
    }
}

/// A logical model name selecting which provider/backend model answers a
/// request. Stored history and API responses always carry the logical name,
/// so observed model values stay stable even if the backend aliases change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ModelId {
    #[default]
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[serde(rename = "gpt-4.1")]
    Gpt41,
    #[serde(rename = "gpt-4.1-mini")]
    Gpt41Mini,
    #[serde(rename = "claude-3-5-sonnet-20241022")]
    Claude35Sonnet,
    #[serde(rename = "claude-sonnet-3.7")]
    ClaudeSonnet37,
    #[serde(rename = "claude-haiku-3.5")]
    ClaudeHaiku35,
    #[serde(rename = "claude-4-opus")]
    Claude4Opus,
    #[serde(rename = "claude-4-sonnet")]
    Claude4Sonnet,
}

impl ModelId {
    pub const ALL: [ModelId; 8] = [
        ModelId::Gpt4o,
        ModelId::Gpt41,
        ModelId::Gpt41Mini,
        ModelId::Claude35Sonnet,
        ModelId::ClaudeSonnet37,
        ModelId::ClaudeHaiku35,
        ModelId::Claude4Opus,
        ModelId::Claude4Sonnet,
    ];

    /// The wire/storage form of the logical name.
    pub fn as_str(self) -> &'static str {
        match self {
            ModelId::Gpt4o => "gpt-4o",
            ModelId::Gpt41 => "gpt-4.1",
            ModelId::Gpt41Mini => "gpt-4.1-mini",
            ModelId::Claude35Sonnet => "claude-3-5-sonnet-20241022",
            ModelId::ClaudeSonnet37 => "claude-sonnet-3.7",
            ModelId::ClaudeHaiku35 => "claude-haiku-3.5",
            ModelId::Claude4Opus => "claude-4-opus",
            ModelId::Claude4Sonnet => "claude-4-sonnet",
        }
    }

    /// Which provider family serves this model.
    pub fn provider(self) -> Provider {
        match self {
            ModelId::Gpt4o | ModelId::Gpt41 | ModelId::Gpt41Mini => Provider::OpenAi,
            ModelId::Claude35Sonnet
            | ModelId::ClaudeSonnet37
            | ModelId::ClaudeHaiku35
            | ModelId::Claude4Opus
            | ModelId::Claude4Sonnet => Provider::Anthropic,
        }
    }

    /// The backend model identifier actually sent to the provider. Several
    /// logical names alias to a smaller set of available backend models.
    pub fn backend_id(self) -> &'static str {
        match self {
            ModelId::Gpt4o => "gpt-4o",
            // GPT-4.1 is not generally available; gpt-4o stands in.
            ModelId::Gpt41 => "gpt-4o",
            ModelId::Gpt41Mini => "gpt-4o-mini",
            ModelId::Claude35Sonnet => "claude-3-5-sonnet-20241022",
            ModelId::ClaudeSonnet37 => "claude-3-5-sonnet-20241022",
            ModelId::ClaudeHaiku35 => "claude-3-haiku-20240307",
            ModelId::Claude4Opus => "claude-3-opus-20240229",
            ModelId::Claude4Sonnet => "claude-3-5-sonnet-20241022",
        }
    }

    /// Human-readable name for UI surfaces.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelId::Gpt4o => "GPT-4o",
            ModelId::Gpt41 => "GPT-4.1",
            ModelId::Gpt41Mini => "GPT-4.1 Mini",
            ModelId::Claude35Sonnet => "Claude 3.5 Sonnet",
            ModelId::ClaudeSonnet37 => "Claude Sonnet 3.7",
            ModelId::ClaudeHaiku35 => "Claude Haiku 3.5",
            ModelId::Claude4Opus => "Claude 4 Opus",
            ModelId::Claude4Sonnet => "Claude 4 Sonnet",
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a supported logical model name.
#[derive(Debug, thiserror::Error)]
#[error("unsupported model: {0}")]
pub struct UnknownModel(pub String);

impl FromStr for ModelId {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelId::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownModel(s.to_string()))
    }
}
