//! Header canonicalization.
//!
//! Report vendors disagree on capitalization and punctuation ("DATE ",
//! "EMPLOYEE CODE", "Governorate"), so every raw header cell is reduced to an
//! alphanumeric candidate and run through [`HEADER_RULES`] top to bottom.
//! The first matching rule names the canonical key; unmatched headers keep
//! their cleaned form.

use std::collections::HashSet;

/// How a rule tests the cleaned candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMatch {
    /// Case-insensitive substring.
    Contains(&'static str),
    /// Case-insensitive equality (the short form, e.g. plain "Code").
    Is(&'static str),
    /// Case-sensitive equality.
    Exact(&'static str),
}

impl HeaderMatch {
    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            Self::Contains(needle) => candidate.to_lowercase().contains(needle),
            Self::Is(word) => candidate.eq_ignore_ascii_case(word),
            Self::Exact(word) => candidate == *word,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HeaderRule {
    pub matcher: HeaderMatch,
    pub key: &'static str,
}

/// Explicit long forms are listed before their short forms so that
/// "Employee Code" never degrades to "Code".
pub const HEADER_RULES: &[HeaderRule] = &[
    HeaderRule { matcher: HeaderMatch::Contains("date"), key: "date" },
    HeaderRule { matcher: HeaderMatch::Contains("employeecode"), key: "EMPLOYEECODE" },
    HeaderRule { matcher: HeaderMatch::Is("code"), key: "Code" },
    HeaderRule { matcher: HeaderMatch::Contains("employeename"), key: "EMPLOYEENAME" },
    HeaderRule { matcher: HeaderMatch::Is("name"), key: "Name" },
    HeaderRule { matcher: HeaderMatch::Contains("governoratename"), key: "GOVERNORATENAME" },
    HeaderRule { matcher: HeaderMatch::Is("governorate"), key: "Governorate" },
    HeaderRule { matcher: HeaderMatch::Exact("Check"), key: "checked" },
];

/// Trim a cell and strip the double quotes wrapping it.
pub fn clean_cell(raw: &str) -> String {
    raw.trim().trim_matches('"').trim().to_string()
}

/// Reduce a header cell to letters and digits only.
pub fn clean_header(raw: &str) -> String {
    clean_cell(raw)
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Map one raw header cell to its canonical key (before duplicate resolution).
pub fn canonical_key(raw: &str) -> String {
    let candidate = clean_header(raw);
    match HEADER_RULES.iter().find(|rule| rule.matcher.matches(&candidate)) {
        Some(rule) => {
            log::debug!("header '{}' -> {}", raw.trim(), rule.key);
            rule.key.to_string()
        }
        None => candidate,
    }
}

/// Canonicalize a full header row. Colliding keys get `2`, `3`, ... suffixes
/// in order of appearance, so every column survives.
pub fn canonical_headers<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut keys = Vec::with_capacity(raw.len());

    for cell in raw {
        let base = canonical_key(cell.as_ref());
        let mut key = base.clone();
        let mut n = 2;
        while used.contains(&key) {
            key = format!("{base}{n}");
            n += 1;
        }
        used.insert(key.clone());
        keys.push(key);
    }

    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleans_punctuation_and_whitespace() {
        assert_eq!(clean_header(" Sub Div. "), "SubDiv");
        assert_eq!(clean_header("\"Shop Name\""), "ShopName");
        assert_eq!(clean_header("&&&"), "");
    }

    #[test]
    fn date_rule_wins_first() {
        assert_eq!(canonical_key("DATE "), "date");
        assert_eq!(canonical_key("Visit Date"), "date");
    }

    #[test]
    fn explicit_forms_beat_short_forms() {
        assert_eq!(canonical_key("EMPLOYEE CODE"), "EMPLOYEECODE");
        assert_eq!(canonical_key("Employee Name"), "EMPLOYEENAME");
        assert_eq!(canonical_key("GOVERNORATE NAME"), "GOVERNORATENAME");
        assert_eq!(canonical_key("Code"), "Code");
        assert_eq!(canonical_key("name"), "Name");
        assert_eq!(canonical_key("Governorate"), "Governorate");
    }

    #[test]
    fn compound_headers_keep_cleaned_form() {
        assert_eq!(canonical_key("Shop Code"), "ShopCode");
        assert_eq!(canonical_key("Shop Name"), "ShopName");
        assert_eq!(canonical_key("Comment "), "Comment");
    }

    #[test]
    fn check_rule_is_case_sensitive() {
        assert_eq!(canonical_key("Check"), "checked");
        assert_eq!(canonical_key("CHECK"), "CHECK");
    }

    #[test]
    fn mixed_header_is_deterministic() {
        let raw = [" Employee Code ", "Employee Name", " Date ", "Check"];
        let first = canonical_headers(&raw);
        assert_eq!(first, vec!["EMPLOYEECODE", "EMPLOYEENAME", "date", "checked"]);
        assert_eq!(canonical_headers(&raw), first);
    }

    #[test]
    fn duplicates_get_numeric_suffixes() {
        let raw = ["Shop Code", "Shop Name", "Shop Code", "Shop Name", "Shop Name"];
        assert_eq!(
            canonical_headers(&raw),
            vec!["ShopCode", "ShopName", "ShopCode2", "ShopName2", "ShopName3"]
        );
    }

    #[test]
    fn suffix_skips_literal_collision() {
        let raw = ["Shop Name", "ShopName2", "Shop Name"];
        assert_eq!(canonical_headers(&raw), vec!["ShopName", "ShopName2", "ShopName3"]);
    }
}
