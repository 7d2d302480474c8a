//! Article form validation.
//!
//! Lengths are counted in Unicode scalar values, not bytes: a three-character
//! Chinese title is as valid as `"abc"`.

use std::collections::BTreeMap;

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 40;
pub const BODY_MIN_CHARS: usize = 10;

/// Field name → message for every field that failed. Empty means valid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, &'static str>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn len(&self) -> usize { self.0.len() }

    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.0.get(field).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

/// Checks a submitted title/body pair. Each field is judged on its own, so
/// both may be reported at once.
pub fn validate(title: &str, body: &str) -> FieldErrors {
    let mut errors = BTreeMap::new();

    let title_chars = title.chars().count();
    if title.is_empty() {
        errors.insert("title", "title required");
    } else if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&title_chars) {
        errors.insert("title", "title length out of range");
    }

    if body.is_empty() {
        errors.insert("body", "body required");
    } else if body.chars().count() < BODY_MIN_CHARS {
        errors.insert("body", "body too short");
    }

    FieldErrors(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_well_formed_submission() {
        assert!(validate("Hello", "Hello, world!").is_empty());
    }

    #[test]
    fn reports_both_required_fields() {
        let errors = validate("", "");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("title"), Some("title required"));
        assert_eq!(errors.get("body"), Some("body required"));
    }

    #[test]
    fn title_bounds_are_inclusive() {
        assert_eq!(validate("ab", "0123456789").get("title"), Some("title length out of range"));
        assert!(validate("abc", "0123456789").is_empty());
        assert!(validate(&"a".repeat(40), "0123456789").is_empty());
        assert_eq!(validate(&"a".repeat(41), "0123456789").get("title"), Some("title length out of range"));
    }

    #[test]
    fn counts_characters_not_bytes() {
        // 3 characters, 9 bytes
        assert!(validate("你好吗", "一二三四五六七八九十").is_empty());
        assert!(validate(&"é".repeat(40), "0123456789").is_empty());
        assert_eq!(validate("一二三四五六七八九", "短").get("body"), Some("body too short"));
    }

    #[test]
    fn short_title_and_short_body_together() {
        let errors = validate("ab", "short");
        assert_eq!(errors.get("title"), Some("title length out of range"));
        assert_eq!(errors.get("body"), Some("body too short"));
    }

    proptest! {
        #[test]
        fn in_range_submissions_validate_clean(
            title in "\\PC{3,40}",
            body in "\\PC{10,200}",
        ) {
            prop_assert!(validate(&title, &body).is_empty());
        }

        #[test]
        fn empty_title_always_reported(body in "\\PC{0,50}") {
            prop_assert_eq!(validate("", &body).get("title"), Some("title required"));
        }

        #[test]
        fn empty_body_always_reported(title in "\\PC{0,50}") {
            prop_assert_eq!(validate(&title, "").get("body"), Some("body required"));
        }

        #[test]
        fn fields_are_judged_independently(title in "\\PC{0,60}", body in "\\PC{0,60}") {
            let both = validate(&title, &body);
            prop_assert_eq!(both.get("title"), validate(&title, "0123456789").get("title"));
            prop_assert_eq!(both.get("body"), validate("abc", &body).get("body"));
        }
    }
}
