use std::sync::LazyLock;

use regex::Regex;

pub mod analytics;
pub mod auth;
pub mod diet_plans;
pub mod members;
pub mod root;
pub mod transformations;

// Loose E.164: optional leading +, 10-15 digits, no leading zero.
pub(crate) static MOBILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?[1-9]\d{9,14}$").expect("mobile pattern is valid")
});
