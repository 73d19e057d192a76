//! # Package repositories
//!
//! The planner only ever reads packages through [`PackageRepository`]. [`MetaDB`] is an in-memory
//! implementation that can be saved to and loaded from a JSON file, anything slower (remote feeds, disk
//! caches) is expected to be warmed into one before planning.

use std::collections::BTreeMap;
use std::path::Path;

pub mod package;
use package::*;

mod iterator;
pub use iterator::VersionMatches;
pub use iterator::VersionMatchesExt;

mod constraint;
pub use constraint::ConstraintProvider;
pub use constraint::NullConstraintProvider;
pub use constraint::DefaultConstraintProvider;

mod resolve;
pub use resolve::DependencyVersion;
pub use resolve::resolve_dependency;
pub use resolve::select_dependency;

/// Read access to a collection of packages.
///
/// Implementors only need [`get_packages()`](PackageRepository::get_packages()), the lookups have
/// default implementations that can be overridden with something faster.
/// No ordering or uniqueness is assumed beyond one package per [`PackageIdentifier`].
pub trait PackageRepository {
	fn get_packages(&self) -> Vec<&Package>;

	/// All versions of `id`, compared case-insensitively.
	fn find_packages_by_id(&self, id: &str) -> Vec<&Package> {
		self.get_packages().into_iter().filter(|p| ids_match(p.id(), id)).collect()
	}

	fn find_package(&self, id: &str, version: &PackageVersion) -> Option<&Package> {
		self.find_packages_by_id(id).into_iter().find(|p| p.version() == version)
	}

	fn exists(&self, identifier: &PackageIdentifier) -> bool {
		self.find_package(&identifier.id, &identifier.version).is_some()
	}
}

/// An in-memory package repository.
///
/// Packages are kept grouped by id so lookups don't scan the whole collection.
#[derive(Debug, Default, Clone, serde::Serialize, serde::Deserialize)]
#[serde(from = "Vec<Package>", into = "Vec<Package>")]
pub struct MetaDB {
	packages: BTreeMap<String, Vec<Package>>,
}

impl MetaDB {
	pub fn new() -> Self {
		Default::default()
	}

	/// Adds `package`, replacing any package with the same identifier.
	pub fn add_package(&mut self, package: Package) {
		let versions = self.packages.entry(package.identifier.id_key()).or_default();
		if let Some(existing) = versions.iter_mut().find(|p| p.identifier == package.identifier) {
			*existing = package;
		} else {
			versions.push(package);
		}
	}

	/// Removes the package with `identifier`, returning it if present.
	pub fn remove_package(&mut self, identifier: &PackageIdentifier) -> Option<Package> {
		let key = identifier.id_key();
		let versions = self.packages.get_mut(&key)?;
		let index = versions.iter().position(|p| &p.identifier == identifier)?;
		let removed = versions.remove(index);
		if versions.is_empty() {
			self.packages.remove(&key);
		}
		Some(removed)
	}

	pub fn len(&self) -> usize {
		self.packages.values().map(Vec::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.packages.is_empty()
	}

	/// Loads a repository from a JSON file containing a list of packages.
	///
	/// # Errors
	/// - [`IO`](crate::error::Error::IO) when opening or reading from the file.
	/// - [`SerdeJSON`](crate::error::Error::SerdeJSON) when deserializing the file.
	pub fn load_from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
		let path = path.as_ref();
		log::debug!("Loading repository from {}", path.display());
		let file = std::fs::File::open(path)?;
		Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
	}

	/// Saves the repository to a JSON file.
	///
	/// # Errors
	/// - [`IO`](crate::error::Error::IO) when creating the file or it's parent directories.
	/// - [`SerdeJSON`](crate::error::Error::SerdeJSON) when serializing.
	pub fn save_to_file(&self, path: impl AsRef<Path>) -> crate::Result<()> {
		let path = path.as_ref();
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		let file = std::fs::File::create(path)?;
		serde_json::to_writer_pretty(file, self)?;
		Ok(())
	}
}

impl PackageRepository for MetaDB {
	fn get_packages(&self) -> Vec<&Package> {
		self.packages.values().flatten().collect()
	}

	fn find_packages_by_id(&self, id: &str) -> Vec<&Package> {
		self.packages.get(&id_key(id)).map(|v| v.iter().collect()).unwrap_or_default()
	}
}

impl From<Vec<Package>> for MetaDB {
	fn from(value: Vec<Package>) -> Self {
		value.into_iter().collect()
	}
}

impl From<MetaDB> for Vec<Package> {
	fn from(value: MetaDB) -> Self {
		value.packages.into_values().flatten().collect()
	}
}

impl FromIterator<Package> for MetaDB {
	fn from_iter<T: IntoIterator<Item = Package>>(iter: T) -> Self {
		let mut db = MetaDB::new();
		for package in iter {
			db.add_package(package);
		}
		db
	}
}
