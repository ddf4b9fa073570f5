//! USE-flag recognition.
//!
//! Two shapes appear in ebuild metadata: plain flag declarations in `IUSE`
//! (optionally prefixed `+` for default-on or `-` for default-off) and
//! conditional dependency guards of the form `flag? ( ... )`. Conditionals
//! are recognized flat: the guard text is carried on the constraint, never
//! expanded into a dependency subtree.

use basalt_resolver::package::Constraint;
use regex::Regex;
use std::sync::LazyLock;

static CONDITIONAL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_+-]+)\?\s*\(\s*(.*?)\s*\)$").expect("valid regex")
});

/// Split an `IUSE` token into flag name and default state.
///
/// `+flag` declares the flag default-on, `-flag` default-off, and a bare
/// `flag` default-off.
#[must_use]
pub fn parse_iuse_flag(token: &str) -> (String, bool) {
    if let Some(flag) = token.strip_prefix('+') {
        (flag.to_string(), true)
    } else if let Some(flag) = token.strip_prefix('-') {
        (flag.to_string(), false)
    } else {
        (token.to_string(), false)
    }
}

/// Recognize a `flag? ( ... )` conditional dependency guard.
///
/// The inner text is carried verbatim as the constraint's condition; nothing
/// inside the parentheses is parsed.
///
/// # Examples
///
/// ```
/// use basalt_repository::useflag::parse_use_conditional;
/// use basalt_resolver::package::Constraint;
///
/// let c = parse_use_conditional("ssl? ( >=dev-libs/openssl-1.1.0 )").unwrap();
/// match c {
///     Constraint::Use { flag, condition, .. } => {
///         assert_eq!(flag, "ssl");
///         assert_eq!(condition.as_deref(), Some(">=dev-libs/openssl-1.1.0"));
///     }
///     _ => unreachable!(),
/// }
/// ```
#[must_use]
pub fn parse_use_conditional(input: &str) -> Option<Constraint> {
    let caps = CONDITIONAL_REGEX.captures(input.trim())?;
    Some(Constraint::Use {
        flag: caps.get(1)?.as_str().to_string(),
        required: false,
        condition: Some(caps.get(2)?.as_str().to_string()),
    })
}
