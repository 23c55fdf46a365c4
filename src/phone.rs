// src/phone.rs — Sri Lankan mobile number helpers

use regex::Regex;
use std::sync::OnceLock;

/// Operator prefix (70, 71, 75, 76, 77, 78) followed by exactly seven digits.
pub const MOBILE_PATTERN: &str = r"^(77|71|70|75|76|78)[0-9]{7}$";

pub const COUNTRY_CODE: &str = "+94";

fn mobile_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(MOBILE_PATTERN).expect("mobile pattern is a valid regex"))
}

/// Strip every whitespace character, as typed into a masked input.
pub fn clean_phone(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Whether `raw` (after whitespace stripping) is a local mobile number.
pub fn validate_phone_number(raw: &str) -> bool {
    mobile_regex().is_match(&clean_phone(raw))
}

/// Display form stored on the user record: `+94 771234567`.
pub fn international(clean: &str) -> String {
    format!("{COUNTRY_CODE} {clean}")
}
