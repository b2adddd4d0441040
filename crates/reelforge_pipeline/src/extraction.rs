//! Utilities for extracting structured data from LLM responses.
//!
//! LLM responses often wrap JSON in markdown code blocks or surround it with
//! explanatory text. Callers never trust the shape; every parse is validated.

use reelforge_core::{BookInfo, SceneBeat};
use reelforge_error::{JsonError, JsonErrorKind, PipelineError, PipelineErrorKind, ReelforgeResult};
use serde::Deserialize;

/// Extract JSON from a response that may contain markdown or extra text.
///
/// Strategies, in order: a fenced code block, then the first balanced
/// `[...]` or `{...}`, whichever opens first.
///
/// # Errors
///
/// Returns `StoryboardParse` if no JSON is found.
///
/// # Examples
///
/// ```
/// use reelforge_pipeline::extract_json;
///
/// let response = "Sure!\n```json\n{\"scenes\": []}\n```\n";
/// assert_eq!(extract_json(response).unwrap(), "{\"scenes\": []}");
/// ```
pub fn extract_json(response: &str) -> ReelforgeResult<String> {
    locate_json(response).ok_or_else(|| {
        tracing::debug!(response_length = response.len(), "No JSON found in LLM response");
        PipelineError::new(PipelineErrorKind::StoryboardParse(format!(
            "no JSON found in response (length: {})",
            response.len()
        )))
        .into()
    })
}

fn locate_json(response: &str) -> Option<String> {
    if let Some(json) = extract_from_code_block(response, "json") {
        return Some(json);
    }

    let bracket_pos = response.find('[');
    let brace_pos = response.find('{');

    let order = match (bracket_pos, brace_pos) {
        (Some(b), Some(c)) if b < c => [('[', ']'), ('{', '}')],
        (Some(_), None) => [('[', ']'), ('{', '}')],
        _ => [('{', '}'), ('[', ']')],
    };

    order
        .into_iter()
        .find_map(|(open, close)| extract_balanced(response, open, close))
}

fn extract_from_code_block(response: &str, language: &str) -> Option<String> {
    let pattern = format!("```{}", language);

    if let Some(start) = response.find(&pattern) {
        let content_start = start + pattern.len();
        let content = match response[content_start..].find("```") {
            Some(end) => &response[content_start..content_start + end],
            // Truncated response without closing fence
            None => &response[content_start..],
        };
        return Some(content.trim().to_string());
    }

    fenced_content(response)
}

/// Content of the first fenced block, skipping any language tag.
fn fenced_content(response: &str) -> Option<String> {
    let start = response.find("```")?;
    let content_start = start + 3;
    let skip_to = response[content_start..]
        .find('\n')
        .map(|n| content_start + n + 1)
        .unwrap_or(content_start);

    let content = match response[skip_to..].find("```") {
        Some(end) => &response[skip_to..skip_to + end],
        None => &response[skip_to..],
    };
    Some(content.trim().to_string())
}

fn extract_balanced(response: &str, open: char, close: char) -> Option<String> {
    let start = response.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(response[start..start + i + ch.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BeatEntry {
    Text(String),
    Object {
        #[serde(alias = "text", alias = "narrative")]
        narration: String,
        #[serde(default, alias = "image", alias = "image_prompt")]
        visual: Option<String>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoryboardPayload {
    Scenes { scenes: Vec<BeatEntry> },
    Narrations { narrations: Vec<BeatEntry> },
    List(Vec<BeatEntry>),
}

/// Parse storyboard beats out of an LLM response.
///
/// Accepts `{"scenes": [...]}`, `{"narrations": [...]}` or a bare array,
/// where each entry is a string or an object with `narration` and an
/// optional `visual`.
///
/// # Errors
///
/// Returns `StoryboardParse` when no JSON is found, the shape is not
/// recognized or an entry has empty narration.
pub fn parse_beats(response: &str) -> ReelforgeResult<Vec<SceneBeat>> {
    let json = extract_json(response)?;
    let payload: StoryboardPayload = serde_json::from_str(&json).map_err(|e| {
        let preview: String = json.chars().take(100).collect();
        tracing::debug!(error = %e, json_preview = %preview, "Storyboard JSON did not match");
        PipelineError::new(PipelineErrorKind::StoryboardParse(format!(
            "unrecognized storyboard structure: {}",
            e
        )))
    })?;

    let entries = match payload {
        StoryboardPayload::Scenes { scenes } => scenes,
        StoryboardPayload::Narrations { narrations } => narrations,
        StoryboardPayload::List(list) => list,
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            let beat = match entry {
                BeatEntry::Text(text) => SceneBeat::new(text),
                BeatEntry::Object { narration, visual } => SceneBeat { narration, visual },
            };
            if beat.narration.trim().is_empty() {
                return Err(PipelineError::new(PipelineErrorKind::StoryboardParse(format!(
                    "scene {} has empty narration",
                    i
                )))
                .into());
            }
            Ok(beat)
        })
        .collect()
}

#[derive(Deserialize)]
struct BookPayload {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default, alias = "description")]
    summary: Option<String>,
    #[serde(default, alias = "category")]
    genre: Option<String>,
    #[serde(default, alias = "year")]
    publication_year: Option<serde_json::Value>,
    #[serde(default)]
    cover_url: Option<String>,
    #[serde(default)]
    key_points: Vec<String>,
}

/// Parse a book description, filling gaps from what the request named.
///
/// # Errors
///
/// Returns a `JsonError` when the reply holds no JSON, or its fields have
/// the wrong types.
///
/// # Examples
///
/// ```
/// use reelforge_core::BookInfo;
/// use reelforge_pipeline::parse_book_info;
///
/// let requested = BookInfo::from_request("Deep Work", None);
/// let reply = r#"{"author": "Cal Newport", "genre": "productivity", "publication_year": 2016}"#;
/// let info = parse_book_info(reply, &requested).unwrap();
/// assert_eq!(info.title, "Deep Work");
/// assert_eq!(info.publication_year, "2016");
/// ```
pub fn parse_book_info(response: &str, requested: &BookInfo) -> ReelforgeResult<BookInfo> {
    let json = locate_json(response)
        .ok_or_else(|| JsonError::new(JsonErrorKind::Missing("book info".to_string())))?;
    let payload: BookPayload =
        serde_json::from_str(&json).map_err(|e| JsonError::malformed("book info", e))?;

    let known = |value: Option<String>| value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let publication_year = match payload.publication_year {
        Some(serde_json::Value::String(year)) => year.trim().to_string(),
        Some(serde_json::Value::Number(year)) => year.to_string(),
        _ => String::new(),
    };

    Ok(BookInfo {
        title: known(payload.title).unwrap_or_else(|| requested.title.clone()),
        author: requested.author.clone().or_else(|| known(payload.author)),
        summary: known(payload.summary).unwrap_or_default(),
        genre: known(payload.genre).unwrap_or_default(),
        publication_year,
        cover_url: known(payload.cover_url).or_else(|| requested.cover_url.clone()),
        key_points: payload
            .key_points
            .into_iter()
            .map(|point| point.trim().to_string())
            .filter(|point| !point.is_empty())
            .collect(),
    })
}

/// Clean a free-text LLM answer: drop code fences, surrounding quotes and whitespace.
///
/// # Examples
///
/// ```
/// use reelforge_pipeline::clean_text;
///
/// assert_eq!(clean_text("  \"Deep Work\"\n"), "Deep Work");
/// ```
pub fn clean_text(response: &str) -> String {
    let text = fenced_content(response).unwrap_or_else(|| response.to_string());
    let text = text.trim();
    let text = strip_pair(text, '"', '"');
    let text = strip_pair(text, '\'', '\'');
    let text = strip_pair(text, '“', '”');
    text.trim().to_string()
}

fn strip_pair(text: &str, open: char, close: char) -> &str {
    text.strip_prefix(open)
        .and_then(|t| t.strip_suffix(close))
        .unwrap_or(text)
}
