//! Test fixtures for basalt integration tests.
//!
//! [`EbuildTree`] builds a throwaway on-disk repository in the conventional
//! `<category>/<name>/<name>-<version>.ebuild` layout. The directory is
//! removed when the tree is dropped.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A temporary ebuild repository directory.
#[derive(Debug)]
pub struct EbuildTree {
    dir: TempDir,
}

impl EbuildTree {
    /// Create an empty tree.
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir().context("creating fixture repository")?,
        })
    }

    /// The repository root.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write one ebuild with the given body, creating parents as needed.
    pub fn add_ebuild(&self, atom: &str, version: &str, body: &str) -> Result<&Self> {
        let (category, name) = atom
            .split_once('/')
            .with_context(|| format!("malformed atom: {atom}"))?;
        let dir = self.dir.path().join(category).join(name);
        fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

        let path = dir.join(format!("{name}-{version}.ebuild"));
        fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
        Ok(self)
    }

    /// Write an ebuild assembled from the standard metadata keys.
    ///
    /// Empty values are omitted from the file entirely.
    pub fn add_package(
        &self,
        atom: &str,
        version: &str,
        slot: &str,
        rdepend: &str,
        iuse: &str,
    ) -> Result<&Self> {
        let mut body = String::new();
        if !slot.is_empty() {
            body.push_str(&format!("SLOT=\"{slot}\"\n"));
        }
        if !rdepend.is_empty() {
            body.push_str(&format!("RDEPEND=\"{rdepend}\"\n"));
        }
        if !iuse.is_empty() {
            body.push_str(&format!("IUSE=\"{iuse}\"\n"));
        }
        self.add_ebuild(atom, version, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_conventional_layout() {
        let tree = EbuildTree::new().unwrap();
        tree.add_package("app-misc/hello", "2.10", "0", "sys-libs/zlib>=1.2.13", "")
            .unwrap();

        let path = tree
            .root()
            .join("app-misc")
            .join("hello")
            .join("hello-2.10.ebuild");
        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("RDEPEND=\"sys-libs/zlib>=1.2.13\""));
        assert!(content.contains("SLOT=\"0\""));
    }

    #[test]
    fn rejects_malformed_atoms() {
        let tree = EbuildTree::new().unwrap();
        assert!(tree.add_ebuild("hello", "1.0", "").is_err());
    }
}
