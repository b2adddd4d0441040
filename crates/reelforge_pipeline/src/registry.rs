//! Capability registry: `(type, id)` to live provider.

use reelforge_core::{CapabilityKey, CapabilityType};
use reelforge_error::{CapabilityError, CapabilityErrorKind, ReelforgeResult};
use reelforge_interface::{
    Capability, ImageProvider, LlmProvider, RegisteredCapability, TtsProvider,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Maps `(type, id)` to a registered provider.
///
/// Populated during initialization, then shared read-only (usually behind an
/// `Arc`) by every run. Registering the same key twice fails instead of
/// overwriting.
///
/// # Examples
///
/// ```
/// use reelforge_core::{CapabilityType, CompletionOptions};
/// use reelforge_error::ReelforgeResult;
/// use reelforge_interface::{LlmProvider, RegisteredCapability};
/// use reelforge_pipeline::CapabilityRegistry;
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
/// let mut registry = CapabilityRegistry::new();
/// registry.register(RegisteredCapability::llm("echo", Arc::new(Echo))).unwrap();
/// assert!(registry.register(RegisteredCapability::llm("echo", Arc::new(Echo))).is_err());
/// assert_eq!(registry.list_by_type(CapabilityType::Llm), vec!["echo"]);
/// ```
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    entries: HashMap<CapabilityKey, RegisteredCapability>,
    defaults: HashMap<CapabilityType, String>,
}

impl CapabilityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateCapability` if the `(type, id)` pair is already present.
    pub fn register(&mut self, capability: RegisteredCapability) -> ReelforgeResult<()> {
        let key = capability.key().clone();
        if self.entries.contains_key(&key) {
            return Err(CapabilityError::new(CapabilityErrorKind::DuplicateCapability(
                key.to_string(),
            ))
            .into());
        }
        info!(capability = %key, is_default = capability.is_default(), "Registered capability");
        self.entries.insert(key, capability);
        Ok(())
    }

    /// Look up a capability.
    ///
    /// # Errors
    ///
    /// Returns `CapabilityNotFound` if nothing is registered under the key.
    pub fn resolve(
        &self,
        capability_type: CapabilityType,
        id: &str,
    ) -> ReelforgeResult<&RegisteredCapability> {
        let key = CapabilityKey::new(capability_type, id);
        self.entries.get(&key).ok_or_else(|| {
            CapabilityError::new(CapabilityErrorKind::CapabilityNotFound(key.to_string())).into()
        })
    }

    /// All registered ids for a type, sorted.
    pub fn list_by_type(&self, capability_type: CapabilityType) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .entries
            .keys()
            .filter(|key| *key.capability_type() == capability_type)
            .map(|key| key.id().as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Configure the default id for a type.
    ///
    /// # Errors
    ///
    /// Returns `CapabilityNotFound` if the id is not registered.
    pub fn set_default(
        &mut self,
        capability_type: CapabilityType,
        id: impl Into<String>,
    ) -> ReelforgeResult<()> {
        let id = id.into();
        self.resolve(capability_type, &id)?;
        debug!(capability_type = %capability_type, id = %id, "Configured default capability");
        self.defaults.insert(capability_type, id);
        Ok(())
    }

    /// The default id for a type.
    ///
    /// The configured default wins, then the first capability flagged
    /// `is_default`, then the first registered id in sorted order.
    ///
    /// # Errors
    ///
    /// Returns `NoCapabilityRegistered` if the type has no capabilities.
    pub fn default_id(&self, capability_type: CapabilityType) -> ReelforgeResult<&str> {
        if let Some(id) = self.defaults.get(&capability_type) {
            return Ok(id.as_str());
        }

        let ids = self.list_by_type(capability_type);
        let flagged = ids.iter().copied().find(|id| {
            self.entries
                .get(&CapabilityKey::new(capability_type, *id))
                .is_some_and(|c| c.is_default())
        });

        flagged.or_else(|| ids.first().copied()).ok_or_else(|| {
            CapabilityError::new(CapabilityErrorKind::NoCapabilityRegistered(
                capability_type.to_string(),
            ))
            .into()
        })
    }

    /// Pick the capability for a run: the override if given, else the default.
    ///
    /// An override naming an unregistered id fails rather than falling back.
    ///
    /// # Errors
    ///
    /// Returns `CapabilityNotFound` for an unknown override and
    /// `NoCapabilityRegistered` when the type is empty.
    pub fn select(
        &self,
        capability_type: CapabilityType,
        override_id: Option<&str>,
    ) -> ReelforgeResult<&RegisteredCapability> {
        match override_id {
            Some(id) => self.resolve(capability_type, id),
            None => {
                let id = self.default_id(capability_type)?;
                self.resolve(capability_type, id)
            }
        }
    }

    /// Resolve an LLM provider.
    ///
    /// # Errors
    ///
    /// Returns `CapabilityNotFound` if the id is not registered.
    pub fn llm(&self, id: &str) -> ReelforgeResult<Arc<dyn LlmProvider>> {
        match self.resolve(CapabilityType::Llm, id)?.capability() {
            Capability::Llm(provider) => Ok(provider.clone()),
            _ => Err(Self::not_found(CapabilityType::Llm, id)),
        }
    }

    /// Resolve a TTS provider.
    ///
    /// # Errors
    ///
    /// Returns `CapabilityNotFound` if the id is not registered.
    pub fn tts(&self, id: &str) -> ReelforgeResult<Arc<dyn TtsProvider>> {
        match self.resolve(CapabilityType::Tts, id)?.capability() {
            Capability::Tts(provider) => Ok(provider.clone()),
            _ => Err(Self::not_found(CapabilityType::Tts, id)),
        }
    }

    /// Resolve an image provider.
    ///
    /// # Errors
    ///
    /// Returns `CapabilityNotFound` if the id is not registered.
    pub fn image(&self, id: &str) -> ReelforgeResult<Arc<dyn ImageProvider>> {
        match self.resolve(CapabilityType::Image, id)?.capability() {
            Capability::Image(provider) => Ok(provider.clone()),
            _ => Err(Self::not_found(CapabilityType::Image, id)),
        }
    }

    /// Number of registered capabilities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn not_found(capability_type: CapabilityType, id: &str) -> reelforge_error::ReelforgeError {
        CapabilityError::new(CapabilityErrorKind::CapabilityNotFound(
            CapabilityKey::new(capability_type, id).to_string(),
        ))
        .into()
    }
}
