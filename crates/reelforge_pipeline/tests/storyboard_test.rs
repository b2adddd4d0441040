mod test_utils;

use reelforge_core::{BookInfo, CapabilitySelection, ContentSource, FailureKind, GenerationRequest};
use reelforge_error::ProviderErrorKind;
use reelforge_pipeline::prompts::WordLimits;
use reelforge_pipeline::{
    CapabilityLimiters, ProviderCaller, StoryboardProcessor, fetch_book_info, resolve_title,
};
use reelforge_rate_limit::RetryPolicy;
use std::sync::Arc;
use std::time::Duration;
use test_utils::{MockImage, MockTts, ScriptedLlm, registry, storyboard_json};

fn caller_for(llm: Arc<ScriptedLlm>) -> anyhow::Result<ProviderCaller> {
    let registry = registry(llm, Arc::new(MockTts::new()), Arc::new(MockImage::new()));
    let policy = RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(2), false);
    Ok(ProviderCaller::resolve(
        &registry,
        &CapabilitySelection::default(),
        policy,
        CapabilityLimiters::default(),
    )?)
}

fn topic() -> ContentSource {
    ContentSource::Topic("How bees dance".to_string())
}

fn processor(attempts: usize) -> StoryboardProcessor {
    StoryboardProcessor::new(attempts, WordLimits::new(20, 40))
}

#[tokio::test]
async fn produces_exactly_k_scenes_with_sequential_indices() -> anyhow::Result<()> {
    for k in [1usize, 4, 7] {
        let llm = Arc::new(ScriptedLlm::with_scenes(k));
        let caller = caller_for(Arc::clone(&llm))?;

        let board = processor(3).generate(&caller, &topic(), k, "Bees", None).await?;

        assert_eq!(board.len(), k);
        let indices: Vec<usize> = board.scenes().iter().map(|s| *s.index()).collect();
        assert_eq!(indices, (0..k).collect::<Vec<_>>());
        assert_eq!(board.title(), "Bees");
        assert_eq!(llm.storyboard_calls(), 1);
    }
    Ok(())
}

#[tokio::test]
async fn wrong_count_and_bad_json_are_retried_with_reformat() -> anyhow::Result<()> {
    let llm = Arc::new(ScriptedLlm::new(vec![
        storyboard_json(2),
        "I would love to help with that!".to_string(),
        storyboard_json(3),
    ]));
    let caller = caller_for(Arc::clone(&llm))?;

    let board = processor(3).generate(&caller, &topic(), 3, "Bees", None).await?;

    assert_eq!(board.len(), 3);
    assert_eq!(llm.storyboard_calls(), 3);
    Ok(())
}

#[tokio::test]
async fn empty_reply_is_retried_with_reformat() -> anyhow::Result<()> {
    let llm = Arc::new(ScriptedLlm::new(vec![String::new(), storyboard_json(3)]));
    let caller = caller_for(Arc::clone(&llm))?;

    let board = processor(3)
        .generate(&caller, &topic(), 3, "Bees", None)
        .await?;

    assert_eq!(board.len(), 3);
    assert_eq!(llm.storyboard_calls(), 2);
    let prompts = llm.storyboard_prompts();
    assert!(prompts[1].contains("the response was empty"));
    Ok(())
}

#[tokio::test]
async fn only_empty_replies_fail_as_parse_error() -> anyhow::Result<()> {
    let llm = Arc::new(ScriptedLlm::new(vec![String::new()]));
    let caller = caller_for(Arc::clone(&llm))?;

    let err = processor(2)
        .generate(&caller, &topic(), 3, "Bees", None)
        .await
        .unwrap_err();

    assert_eq!(FailureKind::classify(&err), FailureKind::StoryboardParse);
    assert_eq!(llm.storyboard_calls(), 2);
    Ok(())
}

#[tokio::test]
async fn fails_with_parse_error_after_attempts() -> anyhow::Result<()> {
    let llm = Arc::new(ScriptedLlm::new(vec![storyboard_json(2)]));
    let caller = caller_for(Arc::clone(&llm))?;

    let err = processor(2)
        .generate(&caller, &topic(), 5, "Bees", None)
        .await
        .unwrap_err();

    assert_eq!(FailureKind::classify(&err), FailureKind::StoryboardParse);
    assert!(err.to_string().contains("expected 5 scenes, got 2"));
    assert_eq!(llm.storyboard_calls(), 2);
    Ok(())
}

#[tokio::test]
async fn rejected_llm_call_is_not_reformatted() -> anyhow::Result<()> {
    let llm = Arc::new(ScriptedLlm::failing(ProviderErrorKind::Rejected {
        key: "llm/mock".to_string(),
        message: "quota".to_string(),
    }));
    let caller = caller_for(Arc::clone(&llm))?;

    let err = processor(3)
        .generate(&caller, &topic(), 3, "Bees", None)
        .await
        .unwrap_err();

    assert_eq!(FailureKind::classify(&err), FailureKind::ProviderRejected);
    assert_eq!(llm.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn timing_out_llm_is_attempted_max_attempts_times() -> anyhow::Result<()> {
    let llm = Arc::new(ScriptedLlm::failing(ProviderErrorKind::Timeout {
        key: "llm/mock".to_string(),
    }));
    let caller = caller_for(Arc::clone(&llm))?;

    let err = processor(3)
        .generate(&caller, &topic(), 3, "Bees", None)
        .await
        .unwrap_err();

    assert_eq!(FailureKind::classify(&err), FailureKind::ProviderTimeout);
    assert_eq!(llm.calls(), 3);
    Ok(())
}

fn request(source: ContentSource, title: Option<&str>) -> anyhow::Result<GenerationRequest> {
    Ok(GenerationRequest::builder()
        .source(source)
        .title(title.map(str::to_string))
        .frame_template("default")
        .build()?)
}

#[tokio::test]
async fn titles_resolve_per_source() -> anyhow::Result<()> {
    let llm = Arc::new(ScriptedLlm::with_scenes(1));
    let caller = caller_for(Arc::clone(&llm))?;

    let book = ContentSource::Book {
        title: "Deep Work".to_string(),
        author: Some("Cal Newport".to_string()),
    };
    assert_eq!(
        resolve_title(&caller, &request(book, None)?).await,
        "Deep Work - Cal Newport"
    );

    let anonymous = ContentSource::Book {
        title: "Beowulf".to_string(),
        author: None,
    };
    assert_eq!(resolve_title(&caller, &request(anonymous, None)?).await, "Beowulf");

    assert_eq!(
        resolve_title(&caller, &request(topic(), None)?).await,
        "How bees dance"
    );

    let content = ContentSource::Content("Honeybees communicate with a waggle dance.".to_string());
    assert_eq!(
        resolve_title(&caller, &request(content.clone(), None)?).await,
        "Waggle Dance Secrets"
    );

    assert_eq!(
        resolve_title(&caller, &request(content, Some("My Title"))?).await,
        "My Title"
    );
    Ok(())
}

#[tokio::test]
async fn content_title_falls_back_to_prefix() -> anyhow::Result<()> {
    let llm = Arc::new(ScriptedLlm::failing(ProviderErrorKind::Rejected {
        key: "llm/mock".to_string(),
        message: "down".to_string(),
    }));
    let caller = caller_for(llm)?;

    let content = ContentSource::Content("Honeybees communicate with a waggle dance.".to_string());
    assert_eq!(
        resolve_title(&caller, &request(content, None)?).await,
        "Honeybees communicat"
    );
    Ok(())
}

fn habits() -> ContentSource {
    ContentSource::Book {
        title: "Atomic Habits".to_string(),
        author: Some("James Clear".to_string()),
    }
}

const HABITS_INFO: &str = r#"Here is what I know:
```json
{
  "title": "Atomic Habits",
  "author": "someone else",
  "summary": "Small habits compound into remarkable results.",
  "genre": "self-improvement",
  "publication_year": 2018,
  "key_points": ["Make it obvious", "Make it easy", "  "]
}
```"#;

#[tokio::test]
async fn book_info_is_parsed_from_llm_reply() -> anyhow::Result<()> {
    let llm = Arc::new(ScriptedLlm::with_scenes(3).with_book_info(HABITS_INFO));
    let caller = caller_for(Arc::clone(&llm))?;

    let info = fetch_book_info(&caller, "Atomic Habits", Some("James Clear")).await;

    assert_eq!(info.title, "Atomic Habits");
    assert_eq!(info.author.as_deref(), Some("James Clear"));
    assert_eq!(info.genre, "self-improvement");
    assert_eq!(info.publication_year, "2018");
    assert_eq!(info.key_points, vec!["Make it obvious", "Make it easy"]);
    assert!(info.cover_url.is_none());
    assert_eq!(llm.book_info_calls(), 1);
    Ok(())
}

#[tokio::test]
async fn book_info_falls_back_to_request() -> anyhow::Result<()> {
    let llm = Arc::new(ScriptedLlm::with_scenes(3));
    let caller = caller_for(Arc::clone(&llm))?;
    let info = fetch_book_info(&caller, " Atomic Habits ", Some("James Clear")).await;
    assert_eq!(
        info,
        BookInfo::from_request("Atomic Habits", Some("James Clear".to_string()))
    );
    assert!(info.is_bare());

    let failing = Arc::new(ScriptedLlm::failing(ProviderErrorKind::Rejected {
        key: "llm/mock".to_string(),
        message: "down".to_string(),
    }));
    let caller = caller_for(failing)?;
    let info = fetch_book_info(&caller, "Atomic Habits", None).await;
    assert_eq!(info, BookInfo::from_request("Atomic Habits", None));
    Ok(())
}

#[tokio::test]
async fn book_storyboard_prompt_carries_book_info() -> anyhow::Result<()> {
    let llm = Arc::new(ScriptedLlm::with_scenes(2).with_book_info(HABITS_INFO));
    let caller = caller_for(Arc::clone(&llm))?;
    let info = fetch_book_info(&caller, "Atomic Habits", Some("James Clear")).await;

    let board = processor(3)
        .generate(&caller, &habits(), 2, "Atomic Habits", Some(&info))
        .await?;
    assert_eq!(board.len(), 2);

    let prompt = &llm.storyboard_prompts()[0];
    assert!(prompt.contains("\"Atomic Habits\" by James Clear"));
    assert!(prompt.contains("Genre: self-improvement"));
    assert!(prompt.contains("Summary: Small habits compound into remarkable results."));
    assert!(prompt.contains("- Make it easy"));
    Ok(())
}
