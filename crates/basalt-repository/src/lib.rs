//! Repository adapters for basalt.
//!
//! Two implementations of the resolver's `Repository` capability:
//! - [`EbuildRepository`]: the real adapter over an on-disk ebuild tree
//! - [`MockRepository`]: an in-memory adapter for tests and offline runs
//!
//! plus the metadata parsers they share: the dependency-atom grammar in
//! [`depend`] and USE-flag recognition in [`useflag`].

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod depend;
pub mod ebuild;
pub mod mock;
pub mod useflag;

pub use ebuild::EbuildRepository;
pub use mock::MockRepository;
