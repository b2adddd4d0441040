//! Capability type and identity.

use reelforge_error::{PipelineError, PipelineErrorKind, ReelforgeError, ReelforgeResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The three kinds of pluggable AI function.
///
/// # Examples
///
/// ```
/// use reelforge_core::CapabilityType;
///
/// assert_eq!(CapabilityType::Tts.to_string(), "tts");
/// assert_eq!("image".parse::<CapabilityType>().unwrap(), CapabilityType::Image);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityType {
    /// Text completion
    #[display("llm")]
    Llm,
    /// Text to speech
    #[display("tts")]
    Tts,
    /// Image generation
    #[display("image")]
    Image,
}

impl FromStr for CapabilityType {
    type Err = ReelforgeError;

    fn from_str(s: &str) -> ReelforgeResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "llm" => Ok(Self::Llm),
            "tts" => Ok(Self::Tts),
            "image" => Ok(Self::Image),
            other => Err(PipelineError::new(PipelineErrorKind::InvalidRequest(format!(
                "unknown capability type '{}'",
                other
            )))
            .into()),
        }
    }
}

/// Identity of a registered capability: `(type, id)`.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_more::Display,
)]
#[display("{}/{}", capability_type, id)]
pub struct CapabilityKey {
    capability_type: CapabilityType,
    id: String,
}

impl CapabilityKey {
    /// Create a key from a type and id.
    pub fn new(capability_type: CapabilityType, id: impl Into<String>) -> Self {
        Self {
            capability_type,
            id: id.into(),
        }
    }
}
