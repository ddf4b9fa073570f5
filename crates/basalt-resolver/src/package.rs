//! Package identity and metadata.
//!
//! - [`Atom`]: a validated `category/name` package identifier
//! - [`Slot`]: the coexistence bucket a package installs into
//! - [`Constraint`]: one declared requirement (version, slot, or USE flag)
//! - [`Package`]: the metadata record the resolver operates on

use crate::version::VersionConstraint;
use ahash::AHashMap;
use smallvec::SmallVec;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

/// A fully-qualified package identifier in `category/name` format.
///
/// Atoms must contain exactly one `/` with non-empty parts on both sides.
/// Cloning is cheap; ordering and hashing go by the full string.
#[derive(Clone)]
pub struct Atom {
    /// The full identifier (`category/name`).
    full: Arc<str>,
    /// Index of the `/` separator.
    separator_idx: usize,
}

impl Atom {
    /// Create an atom from its two parts.
    ///
    /// # Panics
    ///
    /// Panics if either part is empty.
    #[must_use]
    pub fn new(category: &str, name: &str) -> Self {
        assert!(!category.is_empty(), "category cannot be empty");
        assert!(!name.is_empty(), "name cannot be empty");

        Self {
            full: Arc::from(format!("{category}/{name}")),
            separator_idx: category.len(),
        }
    }

    /// Parse an atom from a string, returning `None` if it is malformed.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let separator_idx = s.find('/')?;

        if separator_idx == 0 || separator_idx == s.len() - 1 {
            return None;
        }
        if s[separator_idx + 1..].contains('/') {
            return None;
        }

        Some(Self {
            full: Arc::from(s),
            separator_idx,
        })
    }

    /// Get the category part.
    #[must_use]
    #[inline]
    pub fn category(&self) -> &str {
        &self.full[..self.separator_idx]
    }

    /// Get the name part.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.full[self.separator_idx + 1..]
    }

    /// Get the full identifier.
    #[must_use]
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.full
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Atom").field(&self.full).finish()
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full)
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        self.full == other.full
    }
}

impl Eq for Atom {}

impl Hash for Atom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.full.hash(state);
    }
}

impl PartialOrd for Atom {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Atom {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.full.cmp(&other.full)
    }
}

impl FromStr for Atom {
    type Err = AtomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| AtomError(s.to_string()))
    }
}

/// Error when parsing an invalid atom.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid package atom: {0}")]
pub struct AtomError(pub String);

/// The slot a package occupies, with an optional subslot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Slot {
    /// Slot name; `0` by convention for unslotted packages.
    pub name: String,
    /// Subslot; empty when the slot declaration carries none.
    pub subslot: String,
}

impl Slot {
    /// Parse a `name` or `name/subslot` slot declaration.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.split_once('/') {
            Some((name, subslot)) => Self {
                name: name.to_string(),
                subslot: subslot.to_string(),
            },
            None => Self {
                name: s.to_string(),
                subslot: String::new(),
            },
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.subslot.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}/{}", self.name, self.subslot)
        }
    }
}

/// One requirement declared by a package (or by the resolver itself).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Require some version of a package, optionally bounded.
    Version {
        /// The required package.
        name: Atom,
        /// Version bound; `None` accepts any version.
        constraint: Option<VersionConstraint>,
        /// Leading `!` conflict marker. Recognized syntactically, never
        /// enforced.
        blocker: bool,
    },
    /// Require that some package occupying the named slot is installed.
    Slot {
        /// The slot name.
        slot: String,
    },
    /// Demand a USE flag.
    Use {
        /// Flag name.
        flag: String,
        /// Whether the flag must be asserted on.
        required: bool,
        /// Raw guard of a `flag? ( ... )` conditional, carried but not yet
        /// interpreted.
        condition: Option<String>,
    },
}

impl Constraint {
    /// Unversioned requirement on a package.
    #[must_use]
    pub const fn simple(name: Atom) -> Self {
        Self::Version {
            name,
            constraint: None,
            blocker: false,
        }
    }

    /// Versioned requirement on a package.
    #[must_use]
    pub const fn versioned(name: Atom, constraint: VersionConstraint) -> Self {
        Self::Version {
            name,
            constraint: Some(constraint),
            blocker: false,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Version {
                name,
                constraint,
                blocker,
            } => {
                if *blocker {
                    write!(f, "!")?;
                }
                match constraint {
                    Some(vc) => write!(f, "{name} {vc}"),
                    None => write!(f, "{name}"),
                }
            }
            Self::Slot { slot } => write!(f, "slot:{slot}"),
            Self::Use { flag, .. } => write!(f, "use:{flag}"),
        }
    }
}

/// A single version of a package and everything the resolver knows about it.
#[derive(Debug, Clone)]
pub struct Package {
    /// Fully-qualified identifier.
    pub name: Atom,
    /// Version string; compared through the version algebra.
    pub version: String,
    /// Slot this version occupies.
    pub slot: Slot,
    /// Declared USE flags and their defaults.
    pub use_flags: AHashMap<String, bool>,
    /// Declared runtime dependencies.
    pub deps: SmallVec<[Constraint; 8]>,
    /// Virtual packages this version provides.
    pub provides: SmallVec<[Constraint; 2]>,
}

impl Package {
    /// Create a package with no flags, deps, or provides.
    #[must_use]
    pub fn new(name: Atom, version: impl Into<String>, slot: &str) -> Self {
        Self {
            name,
            version: version.into(),
            slot: Slot::parse(slot),
            use_flags: AHashMap::new(),
            deps: SmallVec::new(),
            provides: SmallVec::new(),
        }
    }

    /// Append a declared dependency.
    pub fn add_dependency(&mut self, constraint: Constraint) {
        self.deps.push(constraint);
    }

    /// Slot-conflict check against another package.
    ///
    /// Two packages with *different* names conflict iff their slot names are
    /// equal but their subslots differ. Versions of the same package never
    /// conflict here; the exactly-one encoding covers them.
    #[must_use]
    pub fn conflicts_with(&self, other: &Self) -> bool {
        if self.name == other.name {
            return false;
        }
        self.slot.name == other.slot.name && self.slot.subslot != other.slot.subslot
    }
}
