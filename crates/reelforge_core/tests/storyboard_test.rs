use reelforge_core::{ArtifactKind, ArtifactRef, Scene, SceneBeat, SceneStatus, Storyboard};

fn artifact(kind: ArtifactKind) -> ArtifactRef {
    ArtifactRef::new(kind, "application/octet-stream", "abc", 3, "memory", "abc")
}

#[test]
fn from_beats_assigns_contiguous_indices() {
    let beats = (0..7).map(|i| SceneBeat::new(format!("beat {}", i))).collect();
    let board = Storyboard::from_beats("Title", beats);

    assert_eq!(board.len(), 7);
    for (expected, scene) in board.scenes().iter().enumerate() {
        assert_eq!(*scene.index(), expected);
        assert_eq!(scene.narrative_text(), &format!("beat {}", expected));
        assert_eq!(*scene.status(), SceneStatus::Pending);
    }
}

#[test]
fn blank_visual_hint_is_dropped() {
    let beats = vec![
        SceneBeat {
            narration: "one".to_string(),
            visual: Some("  ".to_string()),
        },
        SceneBeat {
            narration: "two".to_string(),
            visual: Some("a lighthouse".to_string()),
        },
    ];
    let board = Storyboard::from_beats("t", beats);

    assert_eq!(board.scenes()[0].visual_hint(), &None);
    assert_eq!(board.scenes()[1].visual_hint().as_deref(), Some("a lighthouse"));
}

#[test]
fn settle_derives_status_from_artifacts() {
    let mut complete = Scene::new(0, "x");
    complete.attach_frame(artifact(ArtifactKind::Frame));
    complete.attach_audio(artifact(ArtifactKind::Audio), 2.5);
    assert_eq!(complete.settle(), SceneStatus::Complete);

    let mut silent = Scene::new(1, "x");
    silent.attach_frame(artifact(ArtifactKind::Frame));
    assert_eq!(silent.settle(), SceneStatus::Silent);
    assert!(silent.status().is_usable());

    let mut missing_frame = Scene::new(2, "x");
    missing_frame.attach_audio(artifact(ArtifactKind::Audio), 1.0);
    assert_eq!(missing_frame.settle(), SceneStatus::Failed);
}

#[test]
fn failed_scene_stays_failed() {
    let mut scene = Scene::new(0, "x");
    scene.attach_frame(artifact(ArtifactKind::Frame));
    scene.mark_failed();
    assert_eq!(scene.settle(), SceneStatus::Failed);
    assert!(!scene.status().is_usable());
}

#[test]
fn spoken_text_prefers_refined_narration() {
    let mut scene = Scene::new(0, "raw text");
    assert_eq!(scene.spoken_text(), "raw text");
    scene.set_narration("polished text");
    assert_eq!(scene.spoken_text(), "polished text");
}

#[test]
fn clear_artifacts_drops_everything() {
    let mut scene = Scene::new(0, "x");
    scene.attach_frame(artifact(ArtifactKind::Frame));
    scene.attach_illustration(artifact(ArtifactKind::Image));
    scene.attach_audio(artifact(ArtifactKind::Audio), 1.0);
    assert_eq!(scene.artifacts().len(), 3);

    scene.clear_artifacts();
    assert!(scene.artifacts().is_empty());
    assert_eq!(scene.audio_duration(), &None);
}
