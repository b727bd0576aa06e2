use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use time::macros::format_description;
use time::{Date, PrimitiveDateTime};

pub const NO_TITLE: &str = "## [no title]";
pub const EMPTY_BODY: &str = "[empty memo]";
pub const NO_TAG: &str = "#no_tag";

const TITLE_PREFIX: &str = "## ";

#[derive(Debug, Clone, thiserror::Error, Eq, PartialEq)]
pub enum MemoError {
    #[error("storage fault: {0}")]
    StorageFault(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("memo store not found at {}", .0.display())]
    StoreMissing(PathBuf),
    #[error("terminal i/o failed: {0}")]
    Io(String),
}

/// Store-assigned row identifier. Always positive once a memo exists.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MemoId(pub i64);

impl MemoId {
    #[must_use]
    pub fn get(self) -> i64 {
        self.0
    }
}

impl Display for MemoId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse a user-entered identifier.
///
/// # Errors
/// Returns `InvalidInput` for non-numeric, zero, or negative input.
pub fn parse_memo_id(raw: &str) -> Result<MemoId, MemoError> {
    let trimmed = raw.trim();
    match trimmed.parse::<i64>() {
        Ok(value) if value > 0 => Ok(MemoId(value)),
        Ok(_) => Err(MemoError::InvalidInput(format!("identifier must be positive: {trimmed}"))),
        Err(_) => Err(MemoError::InvalidInput(format!("identifier is not a number: {trimmed}"))),
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum MemoField {
    Title,
    Body,
    Tags,
}

impl MemoField {
    /// Column name in the `memos` table.
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Body => "body",
            Self::Tags => "tags",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Body => "text",
            Self::Tags => "tag",
        }
    }

    /// Apply the storage defaults and normalization for this field.
    #[must_use]
    pub fn normalize(self, raw: &str) -> String {
        match self {
            Self::Title => normalize_title(raw),
            Self::Body => normalize_body(raw),
            Self::Tags => normalize_tags(raw),
        }
    }

    /// The stored value with storage decoration removed, as a user would retype it.
    #[must_use]
    pub fn editable(self, stored: &str) -> String {
        match self {
            Self::Title => stored.strip_prefix(TITLE_PREFIX).unwrap_or(stored).to_string(),
            Self::Body => stored.to_string(),
            Self::Tags => stored
                .split_whitespace()
                .map(|tag| tag.trim_start_matches('#'))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

#[must_use]
pub fn normalize_title(raw: &str) -> String {
    let trimmed = raw.trim();
    let bare = trimmed.strip_prefix(TITLE_PREFIX).unwrap_or(trimmed).trim();
    if bare.is_empty() {
        NO_TITLE.to_string()
    } else {
        format!("{TITLE_PREFIX}{bare}")
    }
}

#[must_use]
pub fn normalize_body(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        EMPTY_BODY.to_string()
    } else {
        trimmed.to_string()
    }
}

#[must_use]
pub fn normalize_tags(raw: &str) -> String {
    let tags = raw
        .split_whitespace()
        .map(|token| token.trim_start_matches('#'))
        .filter(|token| !token.is_empty())
        .map(|token| format!("#{token}"))
        .collect::<Vec<_>>();

    if tags.is_empty() {
        NO_TAG.to_string()
    } else {
        tags.join(" ")
    }
}

/// A memo that has not been stored yet. Constructing one applies every field default,
/// so a draft can never carry an empty field.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MemoDraft {
    title: String,
    body: String,
    tags: String,
}

impl MemoDraft {
    #[must_use]
    pub fn new(title: &str, body: &str, tags: &str) -> Self {
        Self { title: normalize_title(title), body: normalize_body(body), tags: normalize_tags(tags) }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    #[must_use]
    pub fn tags(&self) -> &str {
        &self.tags
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Memo {
    pub id: MemoId,
    pub timestamp: PrimitiveDateTime,
    pub title: String,
    pub body: String,
    pub tags: String,
}

impl Memo {
    #[must_use]
    pub fn field(&self, field: MemoField) -> &str {
        match field {
            MemoField::Title => &self.title,
            MemoField::Body => &self.body,
            MemoField::Tags => &self.tags,
        }
    }
}

/// Format a timestamp the way it is stored: `YYYY-MM-DD HH:MM:SS`.
///
/// # Errors
/// Returns `InvalidInput` when the value cannot be formatted.
pub fn format_timestamp(value: PrimitiveDateTime) -> Result<String, MemoError> {
    value
        .format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
        .map_err(|err| MemoError::InvalidInput(format!("cannot format timestamp: {err}")))
}

/// # Errors
/// Returns `InvalidInput` when the text is not a `YYYY-MM-DD HH:MM:SS` timestamp.
pub fn parse_timestamp(raw: &str) -> Result<PrimitiveDateTime, MemoError> {
    PrimitiveDateTime::parse(
        raw.trim(),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    )
    .map_err(|err| MemoError::InvalidInput(format!("invalid timestamp {raw}: {err}")))
}

/// Format a calendar date as `YYYY-MM-DD`.
///
/// # Errors
/// Returns `InvalidInput` when the value cannot be formatted.
pub fn format_date(value: Date) -> Result<String, MemoError> {
    value
        .format(format_description!("[year]-[month]-[day]"))
        .map_err(|err| MemoError::InvalidInput(format!("cannot format date: {err}")))
}

/// Parse a search date and reject dates after `today`.
///
/// # Errors
/// Returns `InvalidInput` for empty, malformed, impossible, or future dates.
pub fn parse_search_date(raw: &str, today: Date) -> Result<Date, MemoError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(MemoError::InvalidInput("date is empty".to_string()));
    }

    let date = Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
        .map_err(|err| MemoError::InvalidInput(format!("invalid date {trimmed}: {err}")))?;

    if date > today {
        return Err(MemoError::InvalidInput(format!("{trimmed} has not happened yet")));
    }

    Ok(date)
}

/// Case-insensitive substring query. An empty query cannot be built, so it can never
/// match anything.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TextQuery {
    raw: String,
    folded: String,
}

impl TextQuery {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self { raw: trimmed.to_string(), folded: trimmed.to_lowercase() })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn matches(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.folded)
    }
}

/// Answer to a destructive-action prompt.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Confirmation {
    Affirm,
    Decline,
}

impl Confirmation {
    pub const CHOICES: [&'static str; 4] = ["yes", "-y", "no", "-n"];

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "yes" | "-y" => Some(Self::Affirm),
            "no" | "-n" => Some(Self::Decline),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_affirm(self) -> bool {
        matches!(self, Self::Affirm)
    }
}
