//! Retried, rate-limited calls to the providers selected for a run.

use crate::CapabilityRegistry;
use reelforge_core::{
    AudioClip, CapabilityKey, CapabilitySelection, CapabilityType, CompletionOptions, ImageAsset,
    ImageOptions, VoiceOptions,
};
use reelforge_error::{ProviderError, ProviderErrorKind, ReelforgeResult};
use reelforge_interface::{ImageProvider, LlmProvider, TtsProvider};
use reelforge_rate_limit::{RateLimiter, ReelforgeConfig, RetryPolicy};
use std::collections::HashMap;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::{debug, instrument};

/// One limiter per capability type, shared by every run of an engine.
#[derive(Debug, Clone, Default)]
pub struct CapabilityLimiters {
    limiters: HashMap<CapabilityType, RateLimiter>,
}

impl CapabilityLimiters {
    /// Build limiters from `[capabilities.<type>]` sections. Unconfigured types are unlimited.
    pub fn from_config(config: &ReelforgeConfig) -> Self {
        let limiters = CapabilityType::iter()
            .map(|capability_type| {
                let limiter = config
                    .capability(capability_type)
                    .map(RateLimiter::from_config)
                    .unwrap_or_else(RateLimiter::unlimited);
                (capability_type, limiter)
            })
            .collect();
        Self { limiters }
    }

    /// Limiter for a type.
    pub fn get(&self, capability_type: CapabilityType) -> RateLimiter {
        self.limiters
            .get(&capability_type)
            .cloned()
            .unwrap_or_else(RateLimiter::unlimited)
    }
}

/// Provider handles selected for one run, with retry and rate limiting.
///
/// Every call is attempted under the retry policy; transient failures are
/// retried with backoff, everything else returns immediately. Empty payloads
/// are reported as `ProviderRejected`.
#[derive(Clone)]
pub struct ProviderCaller {
    llm: (CapabilityKey, Arc<dyn LlmProvider>),
    tts: (CapabilityKey, Arc<dyn TtsProvider>),
    image: (CapabilityKey, Arc<dyn ImageProvider>),
    policy: RetryPolicy,
    limiters: CapabilityLimiters,
}

impl ProviderCaller {
    /// Resolve the capabilities for a run.
    ///
    /// # Errors
    ///
    /// Fails with `CapabilityNotFound` when an override names an unregistered
    /// id, or `NoCapabilityRegistered` when a type has no provider at all.
    #[instrument(skip_all)]
    pub fn resolve(
        registry: &CapabilityRegistry,
        selection: &CapabilitySelection,
        policy: RetryPolicy,
        limiters: CapabilityLimiters,
    ) -> ReelforgeResult<Self> {
        let llm_cap = registry.select(CapabilityType::Llm, selection.get(CapabilityType::Llm))?;
        let tts_cap = registry.select(CapabilityType::Tts, selection.get(CapabilityType::Tts))?;
        let image_cap =
            registry.select(CapabilityType::Image, selection.get(CapabilityType::Image))?;

        let llm = registry.llm(llm_cap.key().id())?;
        let tts = registry.tts(tts_cap.key().id())?;
        let image = registry.image(image_cap.key().id())?;

        debug!(
            llm = %llm_cap.key(),
            tts = %tts_cap.key(),
            image = %image_cap.key(),
            "Resolved capabilities"
        );

        Ok(Self {
            llm: (llm_cap.key().clone(), llm),
            tts: (tts_cap.key().clone(), tts),
            image: (image_cap.key().clone(), image),
            policy,
            limiters,
        })
    }

    /// Retry policy used for every call.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Key of the LLM in use.
    pub fn llm_key(&self) -> &CapabilityKey {
        &self.llm.0
    }

    /// Key of the TTS provider in use.
    pub fn tts_key(&self) -> &CapabilityKey {
        &self.tts.0
    }

    /// Key of the image provider in use.
    pub fn image_key(&self) -> &CapabilityKey {
        &self.image.0
    }

    /// Complete a prompt with the selected LLM.
    ///
    /// # Errors
    ///
    /// Returns the last provider error once retries are exhausted, or
    /// `ProviderRejected` for an empty completion.
    pub async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> ReelforgeResult<String> {
        self.complete_inner(prompt, options, true).await
    }

    /// Complete a prompt whose reply the caller validates itself.
    ///
    /// An empty completion is returned as-is instead of being rejected.
    ///
    /// # Errors
    ///
    /// Returns the last provider error once retries are exhausted.
    pub async fn complete_unchecked(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> ReelforgeResult<String> {
        self.complete_inner(prompt, options, false).await
    }

    async fn complete_inner(
        &self,
        prompt: &str,
        options: &CompletionOptions,
        reject_empty: bool,
    ) -> ReelforgeResult<String> {
        let (key, provider) = &self.llm;
        let label = key.to_string();
        let label = label.as_str();
        self.limiters
            .get(CapabilityType::Llm)
            .execute(&self.policy, label, move || async move {
                let text = provider.complete(prompt, options).await?;
                if reject_empty && text.trim().is_empty() {
                    return Err(rejected(label, "empty completion"));
                }
                Ok(text)
            })
            .await
    }

    /// Synthesize narration with the selected TTS provider.
    ///
    /// # Errors
    ///
    /// Returns the last provider error once retries are exhausted, or
    /// `ProviderRejected` for empty audio.
    pub async fn synthesize(&self, text: &str, voice: &VoiceOptions) -> ReelforgeResult<AudioClip> {
        let (key, provider) = &self.tts;
        let label = key.to_string();
        let label = label.as_str();
        self.limiters
            .get(CapabilityType::Tts)
            .execute(&self.policy, label, move || async move {
                let clip = provider.synthesize(text, voice).await?;
                if clip.is_empty() {
                    return Err(rejected(label, "empty audio"));
                }
                Ok(clip)
            })
            .await
    }

    /// Generate an image with the selected image provider.
    ///
    /// # Errors
    ///
    /// Returns the last provider error once retries are exhausted, or
    /// `ProviderRejected` for an empty image.
    pub async fn generate_image(
        &self,
        prompt: &str,
        options: &ImageOptions,
    ) -> ReelforgeResult<ImageAsset> {
        let (key, provider) = &self.image;
        let label = key.to_string();
        let label = label.as_str();
        self.limiters
            .get(CapabilityType::Image)
            .execute(&self.policy, label, move || async move {
                let image = provider.generate(prompt, options).await?;
                if image.is_empty() {
                    return Err(rejected(label, "empty image"));
                }
                Ok(image)
            })
            .await
    }
}

fn rejected(key: &str, message: &str) -> reelforge_error::ReelforgeError {
    ProviderError::new(ProviderErrorKind::Rejected {
        key: key.to_string(),
        message: message.to_string(),
    })
    .into()
}
