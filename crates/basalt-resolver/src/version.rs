//! Gentoo-style version handling.
//!
//! Versions are opaque strings compared structurally: `1.2.3_alpha4-r5`
//! tokenizes to `[1, 2, 3, "alpha", 4, "r", 5]` and ordering is lexicographic
//! over the token list. Every string tokenizes and the order is total, so there is
//! no parse failure mode anywhere in this module.
//!
//! Constraints supported:
//! - Exact: `1.2.13` or `=1.2.13`
//! - Bounds: `>1.0`, `>=1.2.13`, `<2.0`, `<=1.9`
//! - Any: the empty string parses to no constraint at all

use ahash::AHashMap;
use parking_lot::RwLock;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Cache of tokenized versions; comparison re-runs once per distinct string.
static TOKEN_CACHE: LazyLock<RwLock<AHashMap<Arc<str>, Arc<[Segment]>>>> =
    LazyLock::new(|| RwLock::new(AHashMap::with_capacity(1024)));

/// Maximum cache size before eviction.
const MAX_CACHE_SIZE: usize = 16384;

/// One token of a version string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Maximal run of ASCII digits, compared numerically.
    Num(u64),
    /// Maximal run of ASCII letters, compared lexicographically.
    Text(Arc<str>),
}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Num(a), Self::Num(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            // Numeric segments outrank text: alphabetic pre-release tags
            // (`alpha`, `beta`) sort below numeric revisions.
            (Self::Num(_), Self::Text(_)) => Ordering::Greater,
            (Self::Text(_), Self::Num(_)) => Ordering::Less,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Tokenize a version string into ordered segments.
///
/// Maximal digit runs and maximal ASCII-letter runs are extracted in order;
/// separators and any other bytes are discarded. A digit run too large for
/// `u64` degrades to a text segment.
///
/// # Examples
///
/// ```
/// use basalt_resolver::version::{Segment, tokenize};
///
/// let segments = tokenize("1.2.3_alpha4-r5");
/// assert_eq!(segments.len(), 7);
/// assert_eq!(segments[0], Segment::Num(1));
/// assert_eq!(segments[3], Segment::Text("alpha".into()));
/// assert_eq!(segments[5], Segment::Text("r".into()));
/// ```
#[must_use]
pub fn tokenize(version: &str) -> Arc<[Segment]> {
    {
        let cache = TOKEN_CACHE.read();
        if let Some(cached) = cache.get(version) {
            return Arc::clone(cached);
        }
    }

    static SEGMENT_REGEX: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[0-9]+|[A-Za-z]+").expect("valid regex"));

    let segments: Arc<[Segment]> = SEGMENT_REGEX
        .find_iter(version)
        .map(|m| {
            let part = m.as_str();
            part.parse::<u64>()
                .map_or_else(|_| Segment::Text(Arc::from(part)), Segment::Num)
        })
        .collect();

    {
        let mut cache = TOKEN_CACHE.write();
        if cache.len() >= MAX_CACHE_SIZE {
            // Coarse eviction: drop half the cache.
            let keys: Vec<_> = cache.keys().take(MAX_CACHE_SIZE / 2).cloned().collect();
            for key in keys {
                cache.remove(&key);
            }
        }
        cache.insert(Arc::from(version), Arc::clone(&segments));
    }

    segments
}

/// Total order over version strings.
///
/// Segments are compared pairwise; on a common-prefix tie the longer version
/// wins, so `1.0.0 > 1.0` and `1.0_alpha1 > 1.0`.
#[must_use]
pub fn compare(a: &str, b: &str) -> Ordering {
    tokenize(a).as_ref().cmp(tokenize(b).as_ref())
}

/// Comparison operator of a [`VersionConstraint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionOperator {
    /// Exact match against the raw version string.
    Equal,
    /// Strictly newer.
    Greater,
    /// At least as new.
    GreaterEqual,
    /// Strictly older.
    Less,
    /// At most as new.
    LessEqual,
}

impl fmt::Display for VersionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => write!(f, "="),
            Self::Greater => write!(f, ">"),
            Self::GreaterEqual => write!(f, ">="),
            Self::Less => write!(f, "<"),
            Self::LessEqual => write!(f, "<="),
        }
    }
}

/// A bound on the acceptable versions of one package.
///
/// The absence of a constraint ("any version") is expressed as
/// `Option::<VersionConstraint>::None` by callers; [`VersionConstraint::parse`]
/// returns `None` for empty input accordingly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionConstraint {
    /// How the candidate is compared against [`Self::version`].
    pub op: VersionOperator,
    /// The boundary version.
    pub version: String,
}

impl VersionConstraint {
    /// Create a constraint from operator and boundary.
    #[must_use]
    pub fn new(op: VersionOperator, version: impl Into<String>) -> Self {
        Self {
            op,
            version: version.into(),
        }
    }

    /// Exact-version constraint.
    #[must_use]
    pub fn exact(version: impl Into<String>) -> Self {
        Self::new(VersionOperator::Equal, version)
    }

    /// Minimum-version constraint (`>=`).
    #[must_use]
    pub fn at_least(version: impl Into<String>) -> Self {
        Self::new(VersionOperator::GreaterEqual, version)
    }

    /// Maximum-version constraint (`<=`).
    #[must_use]
    pub fn at_most(version: impl Into<String>) -> Self {
        Self::new(VersionOperator::LessEqual, version)
    }

    /// Parse a constraint string.
    ///
    /// Recognizes a leading `>=`, `<=`, `>`, `<`, or `=`; anything else is an
    /// equality constraint on the whole string. Empty input means "any
    /// version" and yields `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use basalt_resolver::version::{VersionConstraint, VersionOperator};
    ///
    /// let c = VersionConstraint::parse(">=1.2.13").unwrap();
    /// assert_eq!(c.op, VersionOperator::GreaterEqual);
    /// assert_eq!(c.version, "1.2.13");
    ///
    /// assert!(VersionConstraint::parse("").is_none());
    /// ```
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        // Two-character operators must win over their one-character prefixes.
        const OPERATORS: [(&str, VersionOperator); 5] = [
            (">=", VersionOperator::GreaterEqual),
            ("<=", VersionOperator::LessEqual),
            (">", VersionOperator::Greater),
            ("<", VersionOperator::Less),
            ("=", VersionOperator::Equal),
        ];

        for (prefix, op) in OPERATORS {
            if let Some(rest) = input.strip_prefix(prefix) {
                return Some(Self::new(op, rest.trim()));
            }
        }

        Some(Self::exact(input))
    }

    /// Check whether a version satisfies this constraint.
    ///
    /// Equality compares the raw strings; the four bounds go through the
    /// structural order of [`compare`].
    #[must_use]
    pub fn satisfies(&self, version: &str) -> bool {
        match self.op {
            VersionOperator::Equal => version == self.version,
            VersionOperator::Greater => compare(version, &self.version) == Ordering::Greater,
            VersionOperator::GreaterEqual => compare(version, &self.version) != Ordering::Less,
            VersionOperator::Less => compare(version, &self.version) == Ordering::Less,
            VersionOperator::LessEqual => compare(version, &self.version) != Ordering::Greater,
        }
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            // An exact constraint renders bare, and a bare string parses back
            // to an exact constraint.
            VersionOperator::Equal => write!(f, "{}", self.version),
            op => write!(f, "{op}{}", self.version),
        }
    }
}
