//! The repository capability the resolver consumes.

use crate::errors::ResolveError;
use crate::package::Package;

/// Source of package metadata.
///
/// Implementations must return fully populated, independently owned
/// [`Package`] values; the resolver copies them into its own graph and may
/// mutate them freely. A missing package is reported as
/// [`ResolveError::PackageNotFound`] carrying the requested name.
pub trait Repository {
    /// Load the package definition for one `category/name` atom.
    fn load_package(&self, atom: &str) -> Result<Package, ResolveError>;

    /// Load several packages at once.
    ///
    /// Atomic: any missing atom fails the whole call.
    fn load_packages(&self, atoms: &[String]) -> Result<Vec<Package>, ResolveError> {
        atoms.iter().map(|atom| self.load_package(atom)).collect()
    }
}
