//! Verification-code extraction — first standalone 4–8 digit run.

use std::sync::LazyLock;

use regex::Regex;

/// A run of 4 to 8 decimal digits bounded by non-digits or string edges.
static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4,8}\b").expect("code regex is valid"));

/// Find a plausible numeric verification code in message content.
///
/// First match wins; there is no ranking among candidates. Returns `None`
/// when nothing matches — never an error, malformed input degrades to
/// "no code found".
pub fn extract_code(content: &str) -> Option<&str> {
    CODE_RE.find(content).map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_code_in_sentence() {
        assert_eq!(
            extract_code("Your code is 482913, expires soon"),
            Some("482913")
        );
    }

    #[test]
    fn no_digits_no_match() {
        assert_eq!(extract_code("no digits here"), None);
    }

    #[test]
    fn runs_below_four_digits_do_not_match() {
        // "12" and "9" are under the floor; the first standalone run wins.
        assert_eq!(extract_code("12 345678 9"), Some("345678"));
    }

    #[test]
    fn nine_digit_run_is_not_a_code() {
        assert_eq!(extract_code("ref 123456789 end"), None);
    }

    #[test]
    fn first_of_several_candidates_wins() {
        assert_eq!(extract_code("pin 1111 or 2222"), Some("1111"));
    }

    #[test]
    fn code_at_string_edges() {
        assert_eq!(extract_code("4321"), Some("4321"));
        assert_eq!(extract_code("code: 87654321"), Some("87654321"));
    }

    #[test]
    fn digits_embedded_in_word_do_not_match() {
        assert_eq!(extract_code("order ab12345cd"), None);
    }

    #[test]
    fn finds_code_across_subject_and_bodies() {
        let content = "Verify your account\nHello!\n<p>Use 9021 to continue</p>";
        assert_eq!(extract_code(content), Some("9021"));
    }
}
