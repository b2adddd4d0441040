use reelforge_core::CapabilityType;
use reelforge_rate_limit::ReelforgeConfig;
use std::io::Write;

fn write_config(contents: &str) -> anyhow::Result<tempfile::NamedTempFile> {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
    file.write_all(contents.as_bytes())?;
    Ok(file)
}

#[test]
fn partial_file_keeps_defaults() -> anyhow::Result<()> {
    let file = write_config(
        r#"
[pipeline]
max_concurrent_scenes = 6

[capabilities.llm]
default = "local"
rpm = 10

[capabilities.llm.settings.local]
model = "llama3"
"#,
    )?;

    let config = ReelforgeConfig::from_file(file.path())?;
    assert_eq!(config.pipeline.max_concurrent_scenes, 6);
    assert_eq!(config.pipeline.storyboard_attempts, 3);
    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(config.video.height, 1920);
    assert_eq!(config.default_capability(CapabilityType::Llm), Some("local"));
    assert_eq!(
        config.capability_settings(CapabilityType::Llm, "local"),
        Some(&serde_json::json!({"model": "llama3"}))
    );
    assert!(config.capability(CapabilityType::Tts).is_none());
    Ok(())
}

#[test]
fn zero_concurrency_is_rejected() -> anyhow::Result<()> {
    let file = write_config("[pipeline]\nmax_concurrent_scenes = 0\n")?;
    assert!(ReelforgeConfig::from_file(file.path()).is_err());
    Ok(())
}

#[test]
fn concurrency_beyond_semaphore_capacity_is_rejected() {
    let mut config = ReelforgeConfig::default();
    config.pipeline.max_concurrent_scenes = tokio::sync::Semaphore::MAX_PERMITS + 1;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("must not exceed"));

    config.pipeline.max_concurrent_scenes = tokio::sync::Semaphore::MAX_PERMITS;
    assert!(config.validate().is_ok());
}

#[test]
fn zero_attempts_is_rejected() -> anyhow::Result<()> {
    let file = write_config("[retry]\nmax_attempts = 0\n")?;
    assert!(ReelforgeConfig::from_file(file.path()).is_err());
    Ok(())
}

#[test]
fn zero_scene_duration_is_rejected() -> anyhow::Result<()> {
    let file = write_config("[pipeline]\ndefault_scene_seconds = 0.0\n")?;
    assert!(ReelforgeConfig::from_file(file.path()).is_err());
    Ok(())
}

#[test]
fn unknown_capability_type_is_rejected() -> anyhow::Result<()> {
    let file = write_config("[capabilities.video]\nrpm = 5\n")?;
    assert!(ReelforgeConfig::from_file(file.path()).is_err());
    Ok(())
}

#[test]
fn missing_file_is_an_error() {
    assert!(ReelforgeConfig::from_file("/definitely/not/here/reelforge.toml").is_err());
}

#[test]
fn bundled_defaults_validate() -> anyhow::Result<()> {
    let config = ReelforgeConfig::default();
    config.validate()?;
    assert_eq!(config.video_settings().fps(), &30);
    assert_eq!(config.image_options().width(), &1024);
    Ok(())
}
