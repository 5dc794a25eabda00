/// Pro-eligibility predicate gating every attribution write path
use crate::constants::{BLACKLISTED_TAGS, MIN_PRO_TAG_LEN, PRO_TAG_PREFIX};

/// Whether a customer-tag string qualifies as a "Pro business" designation.
///
/// True iff the tag is non-empty, case-insensitively starts with "pro",
/// is not a reserved membership-tier tag, and is longer than "pro" itself.
pub fn is_pro_tag(tag: &str) -> bool {
    let t = tag.trim();
    if t.len() <= MIN_PRO_TAG_LEN {
        return false;
    }
    if !t.to_lowercase().starts_with(PRO_TAG_PREFIX) {
        return false;
    }
    !BLACKLISTED_TAGS.contains(&t)
}

/// Extracts the first eligible Pro tag from a tag collection.
///
/// The tracking endpoint receives tags either as a delimited string
/// ("a, b, c") or as a list; both shapes funnel through here.
pub fn first_pro_tag<'a, I>(tags: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    tags.into_iter()
        .map(str::trim)
        .find(|t| is_pro_tag(t))
        .map(str::to_string)
}

/// Splits a comma- or semicolon-delimited tag string into candidates
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split([',', ';'])
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
