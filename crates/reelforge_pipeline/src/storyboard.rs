//! Storyboard stage: one LLM call per attempt, validated into exactly `n` scenes.

use crate::prompts::{
    WordLimits, book_info_prompt, reformat_prompt, storyboard_prompt, title_prompt,
};
use crate::{ProviderCaller, clean_text, parse_beats, parse_book_info};
use reelforge_core::{BookInfo, CompletionOptions, ContentSource, GenerationRequest, Storyboard};
use reelforge_error::{
    PipelineError, PipelineErrorKind, ReelforgeError, ReelforgeErrorKind, ReelforgeResult,
};
use reelforge_rate_limit::ReelforgeConfig;
use tracing::{debug, info, instrument, warn};

/// Longest title derived by the LLM or from content.
const MAX_TITLE_CHARS: usize = 20;

/// Turns a content source into a storyboard of exactly `n` scene stubs.
///
/// Structural failures (unparseable JSON, wrong scene count) are retried with
/// a stricter reformat instruction up to `attempts` LLM calls in total.
/// Provider failures are already retried by the caller and end the stage.
#[derive(Debug, Clone)]
pub struct StoryboardProcessor {
    attempts: usize,
    words: WordLimits,
}

impl StoryboardProcessor {
    /// Create a processor. `attempts` is clamped to at least one.
    pub fn new(attempts: usize, words: WordLimits) -> Self {
        Self {
            attempts: attempts.max(1),
            words,
        }
    }

    /// Build from `[pipeline]` configuration.
    pub fn from_config(config: &ReelforgeConfig) -> Self {
        Self::new(
            config.pipeline.storyboard_attempts,
            WordLimits::new(
                config.pipeline.min_narration_words,
                config.pipeline.max_narration_words,
            ),
        )
    }

    /// Generate the storyboard. `book` enriches the prompt of book sources.
    ///
    /// An empty or unparseable reply counts as a structural failure and is
    /// retried with the reformat instruction.
    ///
    /// # Errors
    ///
    /// Returns the provider error when the LLM call fails after retries, or
    /// `StoryboardParse` when no attempt produced exactly `n_scenes` scenes.
    #[instrument(skip(self, caller, source), fields(llm = %caller.llm_key()))]
    pub async fn generate(
        &self,
        caller: &ProviderCaller,
        source: &ContentSource,
        n_scenes: usize,
        title: &str,
        book: Option<&BookInfo>,
    ) -> ReelforgeResult<Storyboard> {
        let original = storyboard_prompt(source, n_scenes, self.words, book);
        let options = CompletionOptions::json();
        let mut prompt = original.clone();
        let mut problem = String::new();

        for attempt in 1..=self.attempts {
            debug!(attempt, prompt_len = prompt.len(), "Requesting storyboard");
            let response = caller.complete_unchecked(&prompt, &options).await?;

            let parsed = if response.trim().is_empty() {
                Err(PipelineError::new(PipelineErrorKind::StoryboardParse(
                    "the response was empty".to_string(),
                ))
                .into())
            } else {
                parse_beats(&response)
            };

            match parsed {
                Ok(beats) if beats.len() == n_scenes => {
                    info!(attempt, scenes = n_scenes, "Storyboard parsed");
                    return Ok(Storyboard::from_beats(title, beats));
                }
                Ok(beats) => {
                    problem = format!("expected {} scenes, got {}", n_scenes, beats.len());
                }
                Err(e) => {
                    problem = parse_problem(&e);
                }
            }

            warn!(
                attempt,
                max_attempts = self.attempts,
                problem = %problem,
                "Storyboard output rejected"
            );
            prompt = reformat_prompt(&original, n_scenes, &problem);
        }

        Err(PipelineError::new(PipelineErrorKind::StoryboardParse(format!(
            "no valid storyboard after {} attempts: {}",
            self.attempts, problem
        )))
        .into())
    }
}

/// The parse detail of a storyboard error, without the location suffix.
fn parse_problem(error: &ReelforgeError) -> String {
    match error.kind() {
        ReelforgeErrorKind::Pipeline(e) => match &e.kind {
            PipelineErrorKind::StoryboardParse(detail) => detail.clone(),
            other => other.to_string(),
        },
        _ => error.to_string(),
    }
}

/// Ask the LLM for a book's summary, genre, year and key points.
///
/// Falls back to the requested title and author when the call fails or the
/// reply cannot be parsed.
#[instrument(skip(caller), fields(llm = %caller.llm_key()))]
pub async fn fetch_book_info(
    caller: &ProviderCaller,
    title: &str,
    author: Option<&str>,
) -> BookInfo {
    let requested = BookInfo::from_request(title.trim(), author.map(|a| a.trim().to_string()));
    let prompt = book_info_prompt(&requested.title, requested.author.as_deref());

    let fetched = caller
        .complete(&prompt, &CompletionOptions::json())
        .await
        .and_then(|response| parse_book_info(&response, &requested));
    match fetched {
        Ok(info) => {
            info!(
                title = %info.title,
                genre = %info.genre,
                key_points = info.key_points.len(),
                "Fetched book info"
            );
            info
        }
        Err(e) => {
            warn!(error = %e, "Book info unavailable, using title and author only");
            requested
        }
    }
}

/// Resolve the video title for a request.
///
/// An explicit title wins. Books use `"Title - Author"`, topics use the topic
/// itself and free-form content asks the LLM for a short title, falling back
/// to the first characters of the content when that call fails.
#[instrument(skip_all, fields(request_id = %request.request_id()))]
pub async fn resolve_title(caller: &ProviderCaller, request: &GenerationRequest) -> String {
    if let Some(title) = request
        .title()
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        return title.to_string();
    }

    match request.source() {
        ContentSource::Book { title, author } => match author.as_deref().map(str::trim) {
            Some(author) if !author.is_empty() => format!("{} - {}", title.trim(), author),
            _ => title.trim().to_string(),
        },
        ContentSource::Topic(topic) => topic.trim().to_string(),
        ContentSource::Content(content) => {
            match caller
                .complete(&title_prompt(content), &CompletionOptions::text())
                .await
            {
                Ok(response) => {
                    let title = truncate_chars(&clean_text(&response), MAX_TITLE_CHARS);
                    if title.is_empty() {
                        truncate_chars(content.trim(), MAX_TITLE_CHARS)
                    } else {
                        title
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Title generation failed, using content prefix");
                    truncate_chars(content.trim(), MAX_TITLE_CHARS)
                }
            }
        }
    }
}

/// First `max` characters of `text`, trimmed.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect::<String>().trim().to_string()
}
