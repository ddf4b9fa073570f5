//! On-disk ebuild repository.
//!
//! Reads the conventional `<root>/<category>/<name>/<name>-<version>.ebuild`
//! tree layout and parses the handful of metadata keys the resolver consumes:
//! `VERSION`, `SLOT`, `RDEPEND`, `IUSE`, `PROVIDE`. Each `load_package` call
//! picks the highest available version of the atom and returns a fresh
//! [`Package`].

use crate::depend::parse_depend_list;
use crate::useflag::{parse_iuse_flag, parse_use_conditional};
use basalt_resolver::package::{Atom, Constraint, Package, Slot};
use basalt_resolver::version::compare;
use basalt_resolver::{Repository, ResolveError};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, trace};

static VERSION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^VERSION="([^"]*)""#).expect("valid regex"));
static SLOT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^SLOT="([^"]*)""#).expect("valid regex"));
static RDEPEND_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^RDEPEND="([^"]*)""#).expect("valid regex"));
static IUSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^IUSE="([^"]*)""#).expect("valid regex"));
static PROVIDE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^PROVIDE="([^"]*)""#).expect("valid regex"));

/// Repository adapter over an ebuild directory tree.
#[derive(Debug, Clone)]
pub struct EbuildRepository {
    root: PathBuf,
}

impl EbuildRepository {
    /// Open an existing repository directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ResolveError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(ResolveError::Repository {
                message: format!("repository directory does not exist: {}", root.display()),
            });
        }
        Ok(Self { root })
    }

    /// The repository root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List the versions available for an atom, unordered.
    fn available_versions(&self, atom: &Atom) -> Result<Vec<String>, ResolveError> {
        let dir = self.root.join(atom.category()).join(atom.name());
        if !dir.is_dir() {
            return Err(ResolveError::PackageNotFound {
                name: atom.as_str().to_string(),
            });
        }

        let entries = fs::read_dir(&dir).map_err(|err| ResolveError::Repository {
            message: format!("cannot read {}: {err}", dir.display()),
        })?;

        let prefix = format!("{}-", atom.name());
        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| ResolveError::Repository {
                message: format!("cannot read {}: {err}", dir.display()),
            })?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some(version) = file_name
                .strip_suffix(".ebuild")
                .and_then(|stem| stem.strip_prefix(&prefix))
            {
                versions.push(version.to_string());
            }
        }
        Ok(versions)
    }
}

impl Repository for EbuildRepository {
    fn load_package(&self, atom: &str) -> Result<Package, ResolveError> {
        let atom = Atom::parse(atom).ok_or_else(|| ResolveError::InvalidAtom {
            atom: atom.to_string(),
        })?;

        let versions = self.available_versions(&atom)?;
        let Some(best) = versions
            .iter()
            .max_by(|a, b| compare(a, b))
            .map(String::as_str)
        else {
            return Err(ResolveError::PackageNotFound {
                name: atom.as_str().to_string(),
            });
        };

        let path = self
            .root
            .join(atom.category())
            .join(atom.name())
            .join(format!("{}-{best}.ebuild", atom.name()));
        debug!(atom = %atom, version = best, path = %path.display(), "parsing ebuild");

        parse_ebuild(&atom, best, &path)
    }
}

/// Parse one ebuild file into a [`Package`].
///
/// The version from the filename is the fallback; an explicit `VERSION` key
/// overrides it.
fn parse_ebuild(atom: &Atom, file_version: &str, path: &Path) -> Result<Package, ResolveError> {
    let content = fs::read_to_string(path).map_err(|err| ResolveError::Repository {
        message: format!("cannot read {}: {err}", path.display()),
    })?;

    let mut package = Package::new(atom.clone(), file_version, "0");

    if let Some(caps) = VERSION_REGEX.captures(&content) {
        package.version = caps[1].to_string();
    }

    if let Some(caps) = SLOT_REGEX.captures(&content) {
        package.slot = Slot::parse(&caps[1]);
    }

    if let Some(caps) = RDEPEND_REGEX.captures(&content) {
        let rdepend = caps[1].trim();
        // A dependency list that is one conditional group is recognized flat;
        // the guarded atoms stay unexpanded inside the condition text.
        if let Some(conditional) = parse_use_conditional(rdepend) {
            package.deps.push(conditional);
        } else {
            package.deps.extend(parse_depend_list(rdepend));
        }
        trace!(atom = %atom, deps = package.deps.len(), "parsed runtime dependencies");
    }

    if let Some(caps) = IUSE_REGEX.captures(&content) {
        for token in caps[1].split_whitespace() {
            let (flag, default) = parse_iuse_flag(token);
            package.use_flags.insert(flag, default);
        }
    }

    if let Some(caps) = PROVIDE_REGEX.captures(&content) {
        for token in caps[1].split_whitespace() {
            if let Some(virtual_atom) = Atom::parse(token) {
                package.provides.push(Constraint::simple(virtual_atom));
            }
        }
    }

    Ok(package)
}
