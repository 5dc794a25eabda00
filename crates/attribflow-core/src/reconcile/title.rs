/// Title reconciliation: company prefix and marking-count annotation
use crate::constants::TWO_MARKINGS_TITLE_SUFFIX;
use crate::models::MarkingDirective;

/// Derives a display company label from a Pro customer tag.
///
/// "proAcme" -> "Acme", "projean-dupont" -> "Jean Dupont",
/// "proMenuiserieDurand" -> "Menuiserie Durand".
pub fn company_label(tag: &str) -> String {
    let t = tag.trim();
    let stripped = match t.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("pro") && t.len() > 3 => &t[3..],
        _ => t,
    };

    // Separators become spaces, then camel-case boundaries split
    let spaced = stripped.replace(['-', '_'], " ");
    let mut split = String::with_capacity(spaced.len() + 4);
    let mut prev: Option<char> = None;
    for c in spaced.chars() {
        if c.is_uppercase()
            && prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit())
        {
            split.push(' ');
        }
        split.push(c);
        prev = Some(c);
    }

    split
        .split_whitespace()
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Computes the desired title.
///
/// The canonical "<Company> - " prefix appears exactly once; a stale prefix
/// left by a previously attributed customer is stripped first. The
/// " - 2 marquages" annotation is present iff the directive is 2. Re-running
/// on an already-correct title is a no-op.
pub fn plan_title(
    current: &str,
    company: &str,
    directive: MarkingDirective,
    stale_companies: &[String],
) -> String {
    let mut title = current.trim().to_string();

    if let Some(stripped) = title.strip_suffix(TWO_MARKINGS_TITLE_SUFFIX) {
        title = stripped.trim_end().to_string();
    }

    if !company.is_empty() {
        let prefix = format!("{} - ", company);
        if !title.starts_with(&prefix) {
            for stale in stale_companies {
                if stale.is_empty() || stale == company {
                    continue;
                }
                let stale_prefix = format!("{} - ", stale);
                if let Some(rest) = title.strip_prefix(&stale_prefix) {
                    title = rest.to_string();
                    break;
                }
            }
            title = format!("{}{}", prefix, title);
        }
    }

    if directive == MarkingDirective::Two {
        title.push_str(TWO_MARKINGS_TITLE_SUFFIX);
    }
    title
}
