//! Data models for Quill
//!
//! Defines the note record and the payloads used to create and update it.
//! Derived fields (preview, relative date, counts) are computed here so the
//! store and the views agree on them.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Title given to notes created without one
pub const DEFAULT_TITLE: &str = "Untitled Note";

/// Color tag given to notes created without one
pub const DEFAULT_COLOR: &str = "bg-green-50 dark:bg-green-950/30";

/// Number of content characters kept in the preview
pub const PREVIEW_LEN: usize = 100;

/// Notes modified within this many days count as recent
pub const RECENT_DAYS: i64 = 7;

/// Time-based note identifier (milliseconds since the Unix epoch)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub i64);

impl NoteId {
    /// The storage key for this id
    pub fn key(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NoteId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(NoteId)
    }
}

impl From<i64> for NoteId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A text note
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier
    pub id: NoteId,
    /// Note title
    pub title: String,
    /// Note body content
    pub content: String,
    /// First characters of the content on a single line
    pub preview: String,
    /// Color tag (a list of style classes)
    pub color: String,
    /// When this note was created
    pub created_at: DateTime<Utc>,
    /// When this note was last updated
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Build a note from a draft
    ///
    /// Empty titles and missing colors fall back to the defaults.
    pub fn from_draft(id: NoteId, draft: NoteDraft, now: DateTime<Utc>) -> Self {
        let title = if draft.title.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            draft.title
        };
        let color = draft
            .color
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_COLOR.to_string());

        Self {
            id,
            title,
            preview: make_preview(&draft.content),
            content: draft.content,
            color,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an update
    ///
    /// The preview follows the resulting content and the modified timestamp
    /// is always refreshed, even when no field changed.
    pub fn apply(&mut self, update: NoteUpdate, now: DateTime<Utc>) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
        if let Some(color) = update.color {
            self.color = color;
        }
        self.preview = make_preview(&self.content);
        self.updated_at = now;
    }

    /// Human-friendly age of the last modification
    pub fn relative_date(&self, now: DateTime<Utc>) -> String {
        relative_date(self.updated_at, now)
    }

    /// Number of characters in the content
    pub fn char_count(&self) -> usize {
        char_count(&self.content)
    }

    /// Number of whitespace-separated words in the content
    pub fn word_count(&self) -> usize {
        word_count(&self.content)
    }

    /// Case-insensitive match on title or content
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&query) || self.content.to_lowercase().contains(&query)
    }
}

/// Fields supplied when creating a note
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl NoteDraft {
    /// Create a draft with the default color
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            color: None,
        }
    }

    /// Set the color tag
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// True when neither a title nor any content was given
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.content.trim().is_empty()
    }
}

/// Partial update of a note; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// Aggregate numbers shown on the home screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NoteStats {
    /// Number of notes
    pub total: usize,
    /// Notes modified within the last week
    pub recent: usize,
    /// Distinct color tags in use
    pub categories: usize,
}

impl NoteStats {
    /// Compute stats over a set of notes
    pub fn compute(notes: &[Note], now: DateTime<Utc>) -> Self {
        let cutoff = now - Duration::days(RECENT_DAYS);
        let mut colors: Vec<&str> = notes.iter().map(|n| n.color.as_str()).collect();
        colors.sort_unstable();
        colors.dedup();

        Self {
            total: notes.len(),
            recent: notes.iter().filter(|n| n.updated_at >= cutoff).count(),
            categories: colors.len(),
        }
    }
}

/// First `PREVIEW_LEN` characters of `content`, newlines collapsed to spaces
pub fn make_preview(content: &str) -> String {
    content
        .chars()
        .take(PREVIEW_LEN)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect()
}

/// Number of characters (not bytes)
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Number of whitespace-separated words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Format the age of `timestamp` relative to `now`
pub fn relative_date(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(timestamp);
    let minutes = diff.num_minutes();
    let hours = diff.num_hours();
    let days = diff.num_days();

    if minutes < 1 {
        return "Just now".to_string();
    }
    if minutes < 60 {
        return format!("{} minute{} ago", minutes, plural(minutes));
    }
    if hours < 24 {
        return format!("{} hour{} ago", hours, plural(hours));
    }
    if days < 2 {
        return "Yesterday".to_string();
    }
    if days < 7 {
        return format!("{} days ago", days);
    }
    if days < 30 {
        let weeks = days / 7;
        return format!("{} week{} ago", weeks, plural(weeks));
    }
    timestamp.format("%Y-%m-%d").to_string()
}

fn plural(n: i64) -> &'static str {
    if n > 1 {
        "s"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn test_from_draft_defaults() {
        let note = Note::from_draft(NoteId(1), NoteDraft::new("", "body"), at(0));
        assert_eq!(note.title, DEFAULT_TITLE);
        assert_eq!(note.color, DEFAULT_COLOR);
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn test_from_draft_keeps_values() {
        let draft = NoteDraft::new("Title", "Body").with_color("bg-red-50");
        let note = Note::from_draft(NoteId(7), draft, at(0));
        assert_eq!(note.id, NoteId(7));
        assert_eq!(note.title, "Title");
        assert_eq!(note.color, "bg-red-50");
    }

    #[test]
    fn test_preview_truncates_and_collapses_newlines() {
        let content = format!("line one\nline two\n{}", "x".repeat(200));
        let preview = make_preview(&content);
        assert_eq!(preview.chars().count(), PREVIEW_LEN);
        assert!(preview.starts_with("line one line two "));
        assert!(!preview.contains('\n'));
    }

    #[test]
    fn test_preview_counts_characters_not_bytes() {
        let content = "é".repeat(150);
        assert_eq!(make_preview(&content), "é".repeat(100));
    }

    #[test]
    fn test_apply_refreshes_preview_and_timestamp() {
        let mut note = Note::from_draft(NoteId(1), NoteDraft::new("T", "old"), at(0));
        note.apply(
            NoteUpdate {
                content: Some("new\ncontent".into()),
                ..Default::default()
            },
            at(5_000),
        );
        assert_eq!(note.content, "new\ncontent");
        assert_eq!(note.preview, "new content");
        assert_eq!(note.title, "T");
        assert_eq!(note.updated_at, at(5_000));
        assert_eq!(note.created_at, at(0));
    }

    #[test]
    fn test_apply_empty_update_still_touches() {
        let mut note = Note::from_draft(NoteId(1), NoteDraft::new("T", "c"), at(0));
        note.apply(NoteUpdate::default(), at(10));
        assert_eq!(note.updated_at, at(10));
    }

    #[test]
    fn test_relative_date() {
        let now = at(100 * 86_400_000);
        let ago = |ms: i64| relative_date(at(100 * 86_400_000 - ms), now);

        assert_eq!(ago(10_000), "Just now");
        assert_eq!(ago(60_000), "1 minute ago");
        assert_eq!(ago(5 * 60_000), "5 minutes ago");
        assert_eq!(ago(3_600_000), "1 hour ago");
        assert_eq!(ago(86_400_000), "Yesterday");
        assert_eq!(ago(3 * 86_400_000), "3 days ago");
        assert_eq!(ago(14 * 86_400_000), "2 weeks ago");
        assert_eq!(ago(40 * 86_400_000), "1970-03-02");
    }

    #[test]
    fn test_note_id_parse() {
        assert_eq!("42".parse::<NoteId>().unwrap(), NoteId(42));
        assert!("abc".parse::<NoteId>().is_err());
        assert_eq!(NoteId(42).key(), "42");
    }

    #[test]
    fn test_counts() {
        assert_eq!(word_count("  hello   world\nagain "), 3);
        assert_eq!(word_count(""), 0);
        assert_eq!(char_count("héllo"), 5);
    }

    #[test]
    fn test_matches() {
        let note = Note::from_draft(NoteId(1), NoteDraft::new("Shopping", "Milk and EGGS"), at(0));
        assert!(note.matches("shop"));
        assert!(note.matches("eggs"));
        assert!(note.matches("  "));
        assert!(!note.matches("bread"));
    }

    #[test]
    fn test_stats() {
        let now = at(30 * 86_400_000);
        let fresh = Note::from_draft(NoteId(1), NoteDraft::new("a", "").with_color("x"), now);
        let old = Note::from_draft(NoteId(2), NoteDraft::new("b", "").with_color("y"), at(0));
        let same_color = Note::from_draft(NoteId(3), NoteDraft::new("c", "").with_color("x"), now);

        let stats = NoteStats::compute(&[fresh, old, same_color], now);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.recent, 2);
        assert_eq!(stats.categories, 2);
    }

    #[test]
    fn test_note_serialization_shape() {
        let note = Note::from_draft(NoteId(9), NoteDraft::new("T", "C"), at(0));
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["id"], 9);
        assert!(json.get("createdAt").is_some());
        let back: Note = serde_json::from_value(json).unwrap();
        assert_eq!(back, note);
    }

    #[test]
    fn test_draft_is_blank() {
        assert!(NoteDraft::new("  ", "\n").is_blank());
        assert!(!NoteDraft::new("", "x").is_blank());
    }
}
