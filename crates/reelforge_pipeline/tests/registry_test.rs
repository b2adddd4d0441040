mod test_utils;

use reelforge_core::{CapabilitySelection, CapabilityType};
use reelforge_error::{CapabilityErrorKind, ReelforgeErrorKind};
use reelforge_interface::{Capability, RegisteredCapability};
use reelforge_pipeline::{CapabilityLimiters, CapabilityRegistry, ProviderCaller};
use reelforge_rate_limit::RetryPolicy;
use std::sync::Arc;
use test_utils::{MockImage, MockTts, ScriptedLlm, registry};

fn capability_kind(err: &reelforge_error::ReelforgeError) -> Option<&CapabilityErrorKind> {
    match err.kind() {
        ReelforgeErrorKind::Capability(e) => Some(&e.kind),
        _ => None,
    }
}

#[test]
fn resolve_returns_the_registered_instance() -> anyhow::Result<()> {
    let llm = Arc::new(ScriptedLlm::with_scenes(1));
    let mut registry = CapabilityRegistry::new();
    let registered = RegisteredCapability::llm("scripted", llm);
    let original = registered.capability().clone();
    registry.register(registered)?;

    let resolved = registry.resolve(CapabilityType::Llm, "scripted")?;
    assert!(resolved.capability().same_instance(&original));
    assert!(matches!(resolved.capability(), Capability::Llm(_)));
    Ok(())
}

#[test]
fn duplicate_registration_fails() -> anyhow::Result<()> {
    let mut registry = CapabilityRegistry::new();
    registry.register(RegisteredCapability::tts("voice", Arc::new(MockTts::new())))?;

    let err = registry
        .register(RegisteredCapability::tts("voice", Arc::new(MockTts::new())))
        .unwrap_err();
    assert!(matches!(
        capability_kind(&err),
        Some(CapabilityErrorKind::DuplicateCapability(key)) if key == "tts/voice"
    ));
    assert_eq!(registry.len(), 1);
    Ok(())
}

#[test]
fn same_id_under_different_types_is_allowed() -> anyhow::Result<()> {
    let mut registry = CapabilityRegistry::new();
    registry.register(RegisteredCapability::tts("acme", Arc::new(MockTts::new())))?;
    registry.register(RegisteredCapability::image("acme", Arc::new(MockImage::new())))?;
    assert_eq!(registry.len(), 2);
    Ok(())
}

#[test]
fn resolve_unknown_id_is_not_found() {
    let registry = CapabilityRegistry::new();
    let err = registry.resolve(CapabilityType::Image, "missing").unwrap_err();
    assert!(matches!(
        capability_kind(&err),
        Some(CapabilityErrorKind::CapabilityNotFound(key)) if key == "image/missing"
    ));
}

#[test]
fn list_by_type_is_sorted_and_filtered() -> anyhow::Result<()> {
    let mut registry = CapabilityRegistry::new();
    registry.register(RegisteredCapability::tts("zeta", Arc::new(MockTts::new())))?;
    registry.register(RegisteredCapability::tts("alpha", Arc::new(MockTts::new())))?;
    registry.register(RegisteredCapability::image("beta", Arc::new(MockImage::new())))?;

    assert_eq!(registry.list_by_type(CapabilityType::Tts), vec!["alpha", "zeta"]);
    assert_eq!(registry.list_by_type(CapabilityType::Image), vec!["beta"]);
    assert!(registry.list_by_type(CapabilityType::Llm).is_empty());
    Ok(())
}

#[test]
fn default_selection_order() -> anyhow::Result<()> {
    let mut registry = CapabilityRegistry::new();
    registry.register(RegisteredCapability::tts("alpha", Arc::new(MockTts::new())))?;
    registry.register(RegisteredCapability::tts("gamma", Arc::new(MockTts::new())))?;

    // First sorted id when nothing is flagged.
    assert_eq!(registry.default_id(CapabilityType::Tts)?, "alpha");

    registry.register(
        RegisteredCapability::tts("omega", Arc::new(MockTts::new())).as_default(),
    )?;
    assert_eq!(registry.default_id(CapabilityType::Tts)?, "omega");

    registry.set_default(CapabilityType::Tts, "gamma")?;
    assert_eq!(registry.default_id(CapabilityType::Tts)?, "gamma");

    assert!(registry.set_default(CapabilityType::Tts, "nobody").is_err());
    Ok(())
}

#[test]
fn empty_type_has_no_default() {
    let registry = CapabilityRegistry::new();
    let err = registry.default_id(CapabilityType::Llm).unwrap_err();
    assert!(matches!(
        capability_kind(&err),
        Some(CapabilityErrorKind::NoCapabilityRegistered(_))
    ));
}

#[test]
fn unknown_override_does_not_fall_back() {
    let registry = registry(
        Arc::new(ScriptedLlm::with_scenes(1)),
        Arc::new(MockTts::new()),
        Arc::new(MockImage::new()),
    );

    let selection = CapabilitySelection {
        image: Some("dall-e".to_string()),
        ..CapabilitySelection::default()
    };
    let err = ProviderCaller::resolve(
        &registry,
        &selection,
        RetryPolicy::no_retry(),
        CapabilityLimiters::default(),
    )
    .err()
    .expect("override must fail");
    assert!(matches!(
        capability_kind(&err),
        Some(CapabilityErrorKind::CapabilityNotFound(key)) if key == "image/dall-e"
    ));
}

#[test]
fn caller_uses_defaults_without_overrides() -> anyhow::Result<()> {
    let registry = registry(
        Arc::new(ScriptedLlm::with_scenes(1)),
        Arc::new(MockTts::new()),
        Arc::new(MockImage::new()),
    );
    let caller = ProviderCaller::resolve(
        &registry,
        &CapabilitySelection::default(),
        RetryPolicy::no_retry(),
        CapabilityLimiters::default(),
    )?;
    assert_eq!(caller.llm_key().to_string(), "llm/mock");
    assert_eq!(caller.tts_key().to_string(), "tts/mock");
    assert_eq!(caller.image_key().to_string(), "image/mock");
    Ok(())
}
