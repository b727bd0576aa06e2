use memopad_core::{format_timestamp, Memo};

/// Plain-text rendering: a header line with identifier and timestamp, then the title,
/// the body and the tags.
#[must_use]
pub fn memo(memo: &Memo) -> String {
    let stamp = format_timestamp(memo.timestamp).unwrap_or_else(|_| memo.timestamp.to_string());
    format!("[{}] {stamp}\n{}\n{}\n{}\n", memo.id, memo.title, memo.body, memo.tags)
}
