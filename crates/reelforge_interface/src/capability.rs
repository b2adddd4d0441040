//! Typed capability handles.

use crate::{ImageProvider, LlmProvider, TtsProvider};
use reelforge_core::{CapabilityKey, CapabilityType};
use std::fmt;
use std::sync::Arc;

/// A live provider instance tagged with its capability type.
#[derive(Clone)]
pub enum Capability {
    /// Language model
    Llm(Arc<dyn LlmProvider>),
    /// Text to speech
    Tts(Arc<dyn TtsProvider>),
    /// Image generation
    Image(Arc<dyn ImageProvider>),
}

impl Capability {
    /// The capability type of the wrapped provider.
    pub fn capability_type(&self) -> CapabilityType {
        match self {
            Capability::Llm(_) => CapabilityType::Llm,
            Capability::Tts(_) => CapabilityType::Tts,
            Capability::Image(_) => CapabilityType::Image,
        }
    }

    /// True when both handles point at the same provider instance.
    pub fn same_instance(&self, other: &Capability) -> bool {
        match (self, other) {
            (Capability::Llm(a), Capability::Llm(b)) => Arc::ptr_eq(a, b),
            (Capability::Tts(a), Capability::Tts(b)) => Arc::ptr_eq(a, b),
            (Capability::Image(a), Capability::Image(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Capability::{}", self.capability_type())
    }
}

/// A capability ready for registration: identity, opaque settings and provider.
///
/// # Examples
///
/// ```
/// use reelforge_interface::{LlmProvider, RegisteredCapability};
/// use reelforge_core::{CapabilityType, CompletionOptions};
/// use reelforge_error::ReelforgeResult;
/// use std::sync::Arc;
///
/// struct Echo;
///
/// #[async_trait::async_trait]
/// impl LlmProvider for Echo {
///     async fn complete(&self, prompt: &str, _: &CompletionOptions) -> ReelforgeResult<String> {
///         Ok(prompt.to_string())
///     }
/// }
///
/// let cap = RegisteredCapability::llm("echo", Arc::new(Echo)).as_default();
/// assert_eq!(*cap.key().capability_type(), CapabilityType::Llm);
/// assert!(cap.is_default());
/// ```
#[derive(Debug, Clone)]
pub struct RegisteredCapability {
    key: CapabilityKey,
    settings: serde_json::Value,
    is_default: bool,
    capability: Capability,
}

impl RegisteredCapability {
    /// Wrap a provider under `id`.
    pub fn new(id: impl Into<String>, capability: Capability) -> Self {
        Self {
            key: CapabilityKey::new(capability.capability_type(), id),
            settings: serde_json::Value::Null,
            is_default: false,
            capability,
        }
    }

    /// Register an LLM provider.
    pub fn llm(id: impl Into<String>, provider: Arc<dyn LlmProvider>) -> Self {
        Self::new(id, Capability::Llm(provider))
    }

    /// Register a TTS provider.
    pub fn tts(id: impl Into<String>, provider: Arc<dyn TtsProvider>) -> Self {
        Self::new(id, Capability::Tts(provider))
    }

    /// Register an image provider.
    pub fn image(id: impl Into<String>, provider: Arc<dyn ImageProvider>) -> Self {
        Self::new(id, Capability::Image(provider))
    }

    /// Attach opaque provider settings.
    pub fn with_settings(mut self, settings: serde_json::Value) -> Self {
        self.settings = settings;
        self
    }

    /// Flag this capability as the default for its type.
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Capability identity.
    pub fn key(&self) -> &CapabilityKey {
        &self.key
    }

    /// Opaque provider settings.
    pub fn settings(&self) -> &serde_json::Value {
        &self.settings
    }

    /// Whether this is flagged as the type default.
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// The provider handle.
    pub fn capability(&self) -> &Capability {
        &self.capability
    }
}
