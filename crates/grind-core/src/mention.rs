//! Mention extraction
//!
//! A mention is `<@` followed by exactly eleven characters and `>`.

use crate::types::UserId;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Length of a platform user identifier inside a mention marker
pub const MENTION_ID_LEN: usize = 11;

static MENTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<@(.{11})>").expect("mention pattern is a valid regex")
});

/// Distinct identifiers mentioned in `text`
///
/// Repeated mentions of the same person collapse to one entry. Markers
/// that don't match the fixed-length pattern are ignored.
#[must_use]
pub fn extract(text: &str) -> BTreeSet<UserId> {
    MENTION
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| UserId::new(m.as_str()))
        .collect()
}
