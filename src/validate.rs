//! Input validation and normalization for CLI ergonomics.
//!
//! Provides O(1) validation sets and synonym maps so statuses and
//! priorities can be typed loosely. Three-tier resolution: exact match →
//! synonym lookup → error with a closest-match suggestion.

use crate::model::{ListPriority, Priority, ProjectStatus, TaskStatus};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

// ── Valid value sets (O(1) lookups) ──────────────────────────

pub static VALID_TASK_STATUSES: LazyLock<HashSet<&str>> =
    LazyLock::new(|| ["todo", "in_progress", "done", "blocked"].into_iter().collect());

pub static VALID_PROJECT_STATUSES: LazyLock<HashSet<&str>> = LazyLock::new(|| {
    ["active", "blocked", "completed", "planning"]
        .into_iter()
        .collect()
});

pub static VALID_PRIORITIES: LazyLock<HashSet<&str>> =
    LazyLock::new(|| ["high", "medium", "low"].into_iter().collect());

// ── Synonym maps (typo and shorthand recovery) ───────────────

pub static TASK_STATUS_SYNONYMS: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {
    [
        ("open", "todo"),
        ("new", "todo"),
        ("pending", "todo"),
        ("backlog", "todo"),
        ("undo", "todo"),
        ("wip", "in_progress"),
        ("working", "in_progress"),
        ("started", "in_progress"),
        ("start", "in_progress"),
        ("active", "in_progress"),
        ("complete", "done"),
        ("completed", "done"),
        ("finished", "done"),
        ("closed", "done"),
        ("waiting", "blocked"),
        ("stuck", "blocked"),
        ("hold", "blocked"),
    ]
    .into_iter()
    .collect()
});

pub static PROJECT_STATUS_SYNONYMS: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {
    [
        ("done", "completed"),
        ("complete", "completed"),
        ("finished", "completed"),
        ("shipped", "completed"),
        ("wip", "active"),
        ("in_progress", "active"),
        ("working", "active"),
        ("waiting", "blocked"),
        ("stuck", "blocked"),
        ("plan", "planning"),
        ("idea", "planning"),
        ("draft", "planning"),
    ]
    .into_iter()
    .collect()
});

pub static PRIORITY_SYNONYMS: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {
    [
        ("critical", "high"),
        ("urgent", "high"),
        ("important", "high"),
        ("top", "high"),
        ("normal", "medium"),
        ("default", "medium"),
        ("med", "medium"),
        ("minor", "low"),
        ("later", "low"),
    ]
    .into_iter()
    .collect()
});

/// Normalize a task status via exact match or synonym lookup.
///
/// # Errors
///
/// Returns the original input and an optional suggestion when nothing
/// matches.
pub fn normalize_task_status(input: &str) -> Result<TaskStatus, (String, Option<String>)> {
    let lower = input.to_lowercase().replace('-', "_");

    if VALID_TASK_STATUSES.contains(lower.as_str()) {
        return Ok(TaskStatus::parse(&lower).expect("validated"));
    }

    if let Some(&canonical) = TASK_STATUS_SYNONYMS.get(lower.as_str()) {
        return Ok(TaskStatus::parse(canonical).expect("synonym maps to canonical"));
    }

    let suggestion = find_closest_match(&lower, &VALID_TASK_STATUSES, &TASK_STATUS_SYNONYMS);
    Err((input.to_string(), suggestion))
}

/// Normalize a project status via exact match or synonym lookup.
///
/// # Errors
///
/// Returns the original input and an optional suggestion when nothing
/// matches.
pub fn normalize_project_status(input: &str) -> Result<ProjectStatus, (String, Option<String>)> {
    let lower = input.to_lowercase().replace('-', "_");

    if VALID_PROJECT_STATUSES.contains(lower.as_str()) {
        return Ok(ProjectStatus::parse(&lower).expect("validated"));
    }

    if let Some(&canonical) = PROJECT_STATUS_SYNONYMS.get(lower.as_str()) {
        return Ok(ProjectStatus::parse(canonical).expect("synonym maps to canonical"));
    }

    let suggestion = find_closest_match(&lower, &VALID_PROJECT_STATUSES, &PROJECT_STATUS_SYNONYMS);
    Err((input.to_string(), suggestion))
}

/// Normalize a project priority via exact match or synonym lookup.
///
/// # Errors
///
/// Returns the original input and an optional suggestion when nothing
/// matches.
pub fn normalize_priority(input: &str) -> Result<Priority, (String, Option<String>)> {
    let lower = input.to_lowercase();

    if VALID_PRIORITIES.contains(lower.as_str()) {
        return Ok(Priority::parse(&lower).expect("validated"));
    }

    if let Some(&canonical) = PRIORITY_SYNONYMS.get(lower.as_str()) {
        return Ok(Priority::parse(canonical).expect("synonym maps to canonical"));
    }

    let suggestion = find_closest_match(&lower, &VALID_PRIORITIES, &PRIORITY_SYNONYMS);
    Err((input.to_string(), suggestion))
}

/// Normalize a focus-list argument. `Ok(None)` means backlog.
///
/// Accepts: today, this_week/week, backlog/none/clear.
///
/// # Errors
///
/// Returns the original input when nothing matches.
pub fn normalize_list_priority(
    input: &str,
) -> Result<Option<ListPriority>, (String, Option<String>)> {
    let lower = input.to_lowercase().replace('-', "_");
    match lower.as_str() {
        "today" | "now" => Ok(Some(ListPriority::Today)),
        "this_week" | "week" => Ok(Some(ListPriority::ThisWeek)),
        "backlog" | "none" | "clear" => Ok(None),
        _ => {
            let valid: HashSet<&str> = ["today", "this_week", "backlog"].into_iter().collect();
            let synonyms: HashMap<&str, &str> =
                [("week", "this_week"), ("none", "backlog"), ("now", "today")]
                    .into_iter()
                    .collect();
            Err((input.to_string(), find_closest_match(&lower, &valid, &synonyms)))
        }
    }
}

/// Find the closest matching value across valid set and synonyms.
fn find_closest_match(
    input: &str,
    valid: &HashSet<&str>,
    synonyms: &HashMap<&str, &str>,
) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;

    for &v in valid.iter().chain(synonyms.keys()) {
        let dist = levenshtein_distance(input, v);
        if dist <= 3 && best.is_none_or(|(_, d)| dist < d) {
            // For synonyms, show what it maps to
            if let Some(&canonical) = synonyms.get(v) {
                best = Some((canonical, dist));
            } else {
                best = Some((v, dist));
            }
        }
    }

    best.map(|(v, _)| v.to_string())
}

// ── Levenshtein distance ─────────────────────────────────────

/// Compute the Levenshtein edit distance between two strings.
#[must_use]
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let a_len = a.len();
    let b_len = b.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    // Single-row optimization (O(min(m,n)) space)
    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for i in 1..=a_len {
        curr[0] = i;
        for j in 1..=b_len {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Find existing slugs similar to the searched one.
///
/// Returns up to `max` suggestions with edit distance ≤ 3,
/// sorted by distance then alphabetically.
#[must_use]
pub fn find_similar_slugs(searched: &str, existing: &[String], max: usize) -> Vec<String> {
    let mut candidates: Vec<(usize, &str)> = existing
        .iter()
        .map(|slug| (levenshtein_distance(searched, slug), slug.as_str()))
        .filter(|(dist, _)| *dist <= 3)
        .collect();

    candidates.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));

    candidates
        .into_iter()
        .take(max)
        .map(|(_, slug)| slug.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_task_status() {
        assert_eq!(normalize_task_status("todo"), Ok(TaskStatus::Todo));
        assert_eq!(normalize_task_status("wip"), Ok(TaskStatus::InProgress));
        assert_eq!(normalize_task_status("in-progress"), Ok(TaskStatus::InProgress));
        assert_eq!(normalize_task_status("finished"), Ok(TaskStatus::Done));
        assert_eq!(normalize_task_status("DONE"), Ok(TaskStatus::Done));
        assert!(normalize_task_status("nonsense").is_err());
    }

    #[test]
    fn test_normalize_project_status() {
        assert_eq!(normalize_project_status("active"), Ok(ProjectStatus::Active));
        assert_eq!(normalize_project_status("shipped"), Ok(ProjectStatus::Completed));
        assert_eq!(normalize_project_status("idea"), Ok(ProjectStatus::Planning));
        assert!(normalize_project_status("nonsense").is_err());
    }

    #[test]
    fn test_normalize_priority() {
        assert_eq!(normalize_priority("high"), Ok(Priority::High));
        assert_eq!(normalize_priority("urgent"), Ok(Priority::High));
        assert_eq!(normalize_priority("normal"), Ok(Priority::Medium));
        assert!(normalize_priority("nonsense").is_err());
    }

    #[test]
    fn test_normalize_list_priority() {
        assert_eq!(normalize_list_priority("today"), Ok(Some(ListPriority::Today)));
        assert_eq!(normalize_list_priority("week"), Ok(Some(ListPriority::ThisWeek)));
        assert_eq!(normalize_list_priority("this-week"), Ok(Some(ListPriority::ThisWeek)));
        assert_eq!(normalize_list_priority("backlog"), Ok(None));
        assert_eq!(normalize_list_priority("none"), Ok(None));
        assert!(normalize_list_priority("someday").is_err());
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("abc", "abc"), 0);
        assert_eq!(levenshtein_distance("abc", "abd"), 1);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn test_suggestion_for_typo() {
        let err = normalize_task_status("dnoe").unwrap_err();
        assert_eq!(err.1, Some("done".to_string()));
    }

    #[test]
    fn test_find_similar_slugs() {
        let slugs = vec![
            "jocril-e-commerce".to_string(),
            "take-it-down".to_string(),
            "flow-stach".to_string(),
        ];
        let result = find_similar_slugs("take-it-dwn", &slugs, 3);
        assert_eq!(result, vec!["take-it-down".to_string()]);
    }
}
