//! Prompt templates for storyboard, narration, image prompt and title calls.

use reelforge_core::{BookInfo, ContentSource};

/// Word bounds passed into prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordLimits {
    /// Minimum words
    pub min: usize,
    /// Maximum words
    pub max: usize,
}

impl WordLimits {
    /// Create limits.
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }
}

const OUTPUT_FORMAT: &str = r#"Output ONLY valid JSON in exactly this shape, with no commentary:

{"scenes": [{"narration": "...", "visual": "..."}]}

"narration" is the spoken text of the scene. "visual" is a short description of what the viewer should see."#;

/// Storyboard prompt for a content source.
///
/// For books, `book` adds whatever summary, genre and key points are known.
pub fn storyboard_prompt(
    source: &ContentSource,
    n_scenes: usize,
    words: WordLimits,
    book: Option<&BookInfo>,
) -> String {
    let task = match source {
        ContentSource::Book { title, author } => {
            let book_name = match author {
                Some(author) => format!("\"{}\" by {}", title, author),
                None => format!("\"{}\"", title),
            };
            format!(
                "You explain books in short videos the way a well-read friend would: plain words, \
                 real insight, no filler.\n\nCreate {n} storyboard scenes summarizing the book {book}. \
                 Open with a question or situation the viewer recognizes, build through the book's \
                 key ideas with everyday examples, and close with a takeaway the viewer can act on.{about}",
                n = n_scenes,
                book = book_name,
                about = book.map(book_background).unwrap_or_default(),
            )
        }
        ContentSource::Topic(topic) => format!(
            "You turn topics into engaging short-video scripts.\n\nTopic: {topic}\n\nCreate {n} \
             storyboard scenes about this topic. Hook the viewer first, develop one clear idea per \
             scene with everyday examples, and finish with an insight or suggestion.",
            n = n_scenes,
            topic = topic,
        ),
        ContentSource::Content(content) => format!(
            "You distill user supplied text into short-video scripts.\n\nContent:\n{content}\n\n\
             Extract {n} storyboard scenes from this content. Keep the author's meaning; condense \
             long content to its key points and expand short content with examples.",
            n = n_scenes,
            content = content,
        ),
    };

    format!(
        "{task}\n\nRules:\n\
         - Exactly {n} scenes, in viewing order.\n\
         - Each narration is {min} to {max} words, conversational, suitable for text-to-speech.\n\
         - No URLs, emoji or numbering.\n\n{format}",
        task = task,
        n = n_scenes,
        min = words.min,
        max = words.max,
        format = OUTPUT_FORMAT,
    )
}

fn book_background(info: &BookInfo) -> String {
    let mut lines = Vec::new();
    if !info.genre.trim().is_empty() {
        lines.push(format!("Genre: {}", info.genre.trim()));
    }
    if !info.publication_year.trim().is_empty() {
        lines.push(format!("Published: {}", info.publication_year.trim()));
    }
    if !info.summary.trim().is_empty() {
        lines.push(format!("Summary: {}", info.summary.trim()));
    }
    if !info.key_points.is_empty() {
        lines.push("Key points:".to_string());
        lines.extend(info.key_points.iter().map(|point| format!("- {}", point)));
    }
    if lines.is_empty() {
        return String::new();
    }
    format!("\n\nAbout the book:\n{}", lines.join("\n"))
}

/// Ask the LLM what it knows about a book.
pub fn book_info_prompt(title: &str, author: Option<&str>) -> String {
    let by = author.map(|a| format!(" by {}", a)).unwrap_or_default();
    format!(
        "Describe the book \"{title}\"{by}. If you know it, give accurate facts; if not, infer \
         plausible details from the title and author.\n\n\
         Output ONLY a JSON object with these keys, no commentary:\n\
         {{\"title\": \"...\", \"author\": \"...\", \"summary\": \"60 to 120 words on the core ideas\", \
         \"genre\": \"...\", \"publication_year\": \"...\", \"key_points\": [\"...\", \"...\", \"...\"]}}",
        title = title,
        by = by,
    )
}

/// Stricter retry prompt after unparseable or miscounted storyboard output.
pub fn reformat_prompt(original: &str, n_scenes: usize, problem: &str) -> String {
    format!(
        "{original}\n\nYour previous answer could not be used: {problem}.\n\
         Respond again with EXACTLY {n} scenes. Output ONLY the JSON object, no code fences, \
         no text before or after it.",
        original = original,
        problem = problem,
        n = n_scenes,
    )
}

/// Turn scene text into a TTS-ready narration.
pub fn refine_narration_prompt(text: &str, words: WordLimits) -> String {
    format!(
        "Rewrite the following narration so it reads naturally aloud. Keep its meaning, use \
         {min} to {max} words, avoid symbols, URLs and numbering. Output only the narration \
         text.\n\nNarration:\n{text}",
        min = words.min,
        max = words.max,
        text = text,
    )
}

/// Derive an English image generation prompt for one scene.
pub fn image_prompt_prompt(
    title: &str,
    narration: &str,
    visual_hint: Option<&str>,
    words: WordLimits,
) -> String {
    let hint = visual_hint
        .map(|v| format!("\nSuggested visual: {}", v))
        .unwrap_or_default();
    format!(
        "Write an English prompt for an image generation model illustrating one scene of a \
         short video titled \"{title}\". Describe the subject, setting, composition and mood in \
         {min} to {max} words. Do not include any text, captions or letters in the image. \
         Output only the prompt.\n\nScene narration:\n{narration}{hint}",
        title = title,
        min = words.min,
        max = words.max,
        narration = narration,
        hint = hint,
    )
}

/// Ask for a short title for free-form content.
pub fn title_prompt(content: &str) -> String {
    format!(
        "Give the following content a short, catchy video title of at most 20 characters. \
         Output only the title, without quotes.\n\nContent:\n{}",
        content
    )
}
