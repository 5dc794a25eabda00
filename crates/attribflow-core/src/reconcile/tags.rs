/// Marking-tag reconciliation
///
/// Products carry at most one marking family: "-1M" (one marking location)
/// or "-2M" (two). Reconciliation never invents marking state for a product
/// that was never marking-tagged, but explicitly seeded or directed state
/// converges to exactly one family.
use crate::constants::{MARK_ONE_SUFFIX, MARK_TWO_SUFFIX, PENDING_ATTRIBUTION_TAG};
use crate::eligibility::is_pro_tag;
use crate::models::MarkingDirective;

/// Computes the desired tag list for a product.
///
/// Transient workflow markers are stripped, competing pro tags dropped so
/// the customer tag is the only one left, and the marking families resolved
/// per the directive. Insertion order is kept stable but carries no meaning;
/// callers compare results as sets.
pub fn plan_tags(
    current: &[String],
    customer_tag: &str,
    directive: MarkingDirective,
    seed_tags: &[String],
) -> Vec<String> {
    let mut one_m: Vec<String> = Vec::new();
    let mut two_m: Vec<String> = Vec::new();
    let mut others: Vec<String> = Vec::new();

    for tag in current {
        let t = tag.trim();
        if t.is_empty() || t == PENDING_ATTRIBUTION_TAG {
            continue;
        }
        if is_pro_tag(t) && t != customer_tag {
            // at most one pro customer tag survives reconciliation
            continue;
        }
        if t.ends_with(MARK_ONE_SUFFIX) {
            push_unique(&mut one_m, t);
        } else if t.ends_with(MARK_TWO_SUFFIX) {
            push_unique(&mut two_m, t);
        } else {
            push_unique(&mut others, t);
        }
    }

    // No family present: adopt exactly one seed (if any) as the baseline
    if one_m.is_empty() && two_m.is_empty()
        && let Some(seed) = pick_seed(seed_tags)
    {
        if seed.ends_with(MARK_ONE_SUFFIX) {
            one_m.push(seed);
        } else {
            two_m.push(seed);
        }
    }

    let mut result = others;
    for tag in resolve_marking_family(one_m, two_m, directive) {
        push_unique(&mut result, &tag);
    }
    push_unique(&mut result, customer_tag);
    result
}

/// Seed preference: a "-1M" seed wins when both suffixes are offered
fn pick_seed(seed_tags: &[String]) -> Option<String> {
    let candidates: Vec<&str> = seed_tags.iter().map(|s| s.trim()).collect();
    candidates
        .iter()
        .find(|s| s.ends_with(MARK_ONE_SUFFIX))
        .or_else(|| candidates.iter().find(|s| s.ends_with(MARK_TWO_SUFFIX)))
        .map(|s| s.to_string())
}

fn resolve_marking_family(
    one_m: Vec<String>,
    two_m: Vec<String>,
    directive: MarkingDirective,
) -> Vec<String> {
    if one_m.is_empty() && two_m.is_empty() {
        // nothing existed and nothing was seeded; do not fabricate state
        return Vec::new();
    }

    // Directive 2 keeps the 2M family; directive 1 and
    // unspecified-with-existing-tags both normalize to the 1M family.
    if directive == MarkingDirective::Two {
        if !two_m.is_empty() {
            two_m
        } else {
            convert_family(one_m, MARK_ONE_SUFFIX, MARK_TWO_SUFFIX)
        }
    } else if !one_m.is_empty() {
        one_m
    } else {
        convert_family(two_m, MARK_TWO_SUFFIX, MARK_ONE_SUFFIX)
    }
}

/// Substitutes the suffix on every tag of a family, preserving prefixes
fn convert_family(family: Vec<String>, from: &str, to: &str) -> Vec<String> {
    family
        .into_iter()
        .map(|tag| match tag.strip_suffix(from) {
            Some(prefix) => format!("{}{}", prefix, to),
            None => tag,
        })
        .collect()
}

fn push_unique(tags: &mut Vec<String>, tag: &str) {
    if !tags.iter().any(|t| t == tag) {
        tags.push(tag.to_string());
    }
}

/// Set equality over tag lists; the storefront treats tags as unordered
pub fn same_tag_set(a: &[String], b: &[String]) -> bool {
    use std::collections::HashSet;
    let left: HashSet<&str> = a.iter().map(String::as_str).collect();
    let right: HashSet<&str> = b.iter().map(String::as_str).collect();
    left == right
}
