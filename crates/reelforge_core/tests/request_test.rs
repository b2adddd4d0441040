use reelforge_core::{
    BackgroundMusic, BgmMode, CapabilityType, ContentSource, GenerationRequest, ImageStyle,
    StylePreset,
};

#[test]
fn builder_applies_defaults() -> anyhow::Result<()> {
    let request = GenerationRequest::builder()
        .source(ContentSource::Topic("Tides".to_string()))
        .frame_template("default")
        .build()?;

    assert_eq!(*request.n_storyboard(), 5);
    assert!(request.title().is_none());
    assert!(request.capability_selection().get(CapabilityType::Llm).is_none());
    assert!(request.ext().is_empty());
    Ok(())
}

#[test]
fn zero_scenes_is_rejected() {
    let result = GenerationRequest::builder()
        .source(ContentSource::Topic("Tides".to_string()))
        .frame_template("default")
        .n_storyboard(0usize)
        .build();
    assert!(result.is_err());
}

#[test]
fn blank_source_is_rejected() {
    let result = GenerationRequest::builder()
        .source(ContentSource::Content("   ".to_string()))
        .frame_template("default")
        .build();
    assert!(result.is_err());
}

#[test]
fn missing_template_is_rejected() {
    let result = GenerationRequest::builder()
        .source(ContentSource::Topic("Tides".to_string()))
        .build();
    assert!(result.is_err());
}

#[test]
fn style_is_prefixed_before_prompt() {
    let style = ImageStyle::Preset(StylePreset::StickFigure);
    let styled = style.apply("a cat reading");
    assert!(styled.starts_with("Pure white background"));
    assert!(styled.ends_with(", a cat reading"));
}

#[test]
fn bgm_volume_is_clamped() {
    let loud = BackgroundMusic::new("music.mp3", 3.0, BgmMode::Loop);
    assert_eq!(*loud.volume(), 1.0);

    let default = BackgroundMusic::with_defaults("music.mp3");
    assert_eq!(*default.volume(), 0.2);
    assert_eq!(*default.mode(), BgmMode::Once);
}

#[test]
fn request_round_trips_through_json() -> anyhow::Result<()> {
    let request = GenerationRequest::builder()
        .source(ContentSource::Book {
            title: "Walden".to_string(),
            author: Some("Thoreau".to_string()),
        })
        .frame_template("book")
        .n_storyboard(2usize)
        .build()?;

    let json = serde_json::to_string(&request)?;
    let back: GenerationRequest = serde_json::from_str(&json)?;
    assert_eq!(back, request);
    Ok(())
}
