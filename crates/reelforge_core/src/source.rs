//! What a video is about.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The subject of a generation request. Exactly one source per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    /// A book summary video
    Book {
        /// Book title
        title: String,
        /// Optional author
        author: Option<String>,
    },
    /// A short explainer on a topic
    Topic(String),
    /// Free-form user content to be split into scenes
    Content(String),
}

impl ContentSource {
    /// Text substituted for the `{{topic}}` template placeholder.
    pub fn topic_text(&self) -> &str {
        match self {
            ContentSource::Book { title, .. } => title,
            ContentSource::Topic(topic) => topic,
            ContentSource::Content(content) => content,
        }
    }

    /// True when the source carries no usable text.
    pub fn is_blank(&self) -> bool {
        self.topic_text().trim().is_empty()
    }
}

/// What is known about a book before its storyboard is written.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BookInfo {
    /// Book title
    pub title: String,
    /// Author, when known
    #[serde(default)]
    pub author: Option<String>,
    /// Short summary of the book
    #[serde(default)]
    pub summary: String,
    /// Category such as "self-help" or "psychology"
    #[serde(default)]
    pub genre: String,
    /// Publication year, as reported
    #[serde(default)]
    pub publication_year: String,
    /// Cover image location
    #[serde(default)]
    pub cover_url: Option<String>,
    /// Central ideas of the book
    #[serde(default)]
    pub key_points: Vec<String>,
}

impl BookInfo {
    /// Info carrying only what the request named.
    pub fn from_request(title: impl Into<String>, author: Option<String>) -> Self {
        Self {
            title: title.into(),
            author: author.filter(|a| !a.trim().is_empty()),
            ..Self::default()
        }
    }

    /// True when nothing beyond title and author is known.
    pub fn is_bare(&self) -> bool {
        self.summary.is_empty()
            && self.genre.is_empty()
            && self.publication_year.is_empty()
            && self.cover_url.is_none()
            && self.key_points.is_empty()
    }

    /// Frame template fields: `book_title`, `book_author`, `book_summary`,
    /// `book_genre`, `book_year` and `cover_url`. Unknown values are empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use reelforge_core::BookInfo;
    ///
    /// let info = BookInfo::from_request("Deep Work", Some("Cal Newport".to_string()));
    /// let fields = info.frame_fields();
    /// assert_eq!(fields["book_author"], "Cal Newport");
    /// assert_eq!(fields["cover_url"], "");
    /// ```
    pub fn frame_fields(&self) -> BTreeMap<String, serde_json::Value> {
        let text = |value: &str| serde_json::Value::String(value.to_string());
        BTreeMap::from([
            ("book_title".to_string(), text(&self.title)),
            (
                "book_author".to_string(),
                text(self.author.as_deref().unwrap_or_default()),
            ),
            ("book_summary".to_string(), text(&self.summary)),
            ("book_genre".to_string(), text(&self.genre)),
            ("book_year".to_string(), text(&self.publication_year)),
            (
                "cover_url".to_string(),
                text(self.cover_url.as_deref().unwrap_or_default()),
            ),
        ])
    }
}
