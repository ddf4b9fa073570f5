//! Dependency-atom parsing.
//!
//! The accepted token grammar is `[!]category/name[(>=|<=|>|<|=)version]`:
//! an optional leading conflict marker, a mandatory atom, and an optional
//! trailing version bound. Grouped conditionals (`use? ( ... )`) and `||`
//! alternatives are outside the grammar.

use basalt_resolver::package::{Atom, Constraint};
use basalt_resolver::version::VersionConstraint;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static DEPEND_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(!)?([A-Za-z0-9+_.-]+/[A-Za-z0-9+_.-]+)(?:(>=|<=|>|<|=)(\S+))?$")
        .expect("valid regex")
});

/// Parse a single dependency token.
///
/// Returns `None` when the token does not fit the grammar.
///
/// # Examples
///
/// ```
/// use basalt_repository::depend::parse_depend;
/// use basalt_resolver::package::Constraint;
///
/// let dep = parse_depend("sys-libs/zlib>=1.2.13").unwrap();
/// assert!(matches!(dep, Constraint::Version { constraint: Some(_), .. }));
///
/// assert!(parse_depend("not-an-atom").is_none());
/// ```
#[must_use]
pub fn parse_depend(token: &str) -> Option<Constraint> {
    let caps = DEPEND_REGEX.captures(token)?;
    let blocker = caps.get(1).is_some();
    let name = Atom::parse(caps.get(2)?.as_str())?;

    let constraint = match (caps.get(3), caps.get(4)) {
        (Some(op), Some(version)) => {
            VersionConstraint::parse(&format!("{}{}", op.as_str(), version.as_str()))
        }
        _ => None,
    };

    Some(Constraint::Version {
        name,
        constraint,
        blocker,
    })
}

/// Parse a whitespace-separated dependency list.
///
/// Tokens outside the grammar are skipped with a debug log, mirroring the
/// lenient treatment of metadata this parser does not understand.
#[must_use]
pub fn parse_depend_list(input: &str) -> Vec<Constraint> {
    input
        .split_whitespace()
        .filter_map(|token| {
            let parsed = parse_depend(token);
            if parsed.is_none() {
                debug!(token, "skipping unparseable dependency token");
            }
            parsed
        })
        .collect()
}
