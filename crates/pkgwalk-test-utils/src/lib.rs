//! Various helper functions for testing
//!
//! Fixtures are written as literals, invalid versions and ranges panic straight away.

use pkgwalk::MetaDB;
use pkgwalk::Operation;
use pkgwalk::metadb::package::*;

/// Enables log output for the running test, safe to call more than once.
pub fn init_logger() {
	let _ = env_logger::builder().is_test(true).try_init();
}

pub fn version(version: &str) -> PackageVersion {
	PackageVersion::new(version).expect("invalid test version")
}

pub fn range(range: &str) -> VersionRange {
	VersionRange::parse(range).expect("invalid test range")
}

pub fn identifier(id: &str, version: &str) -> PackageIdentifier {
	PackageIdentifier::new(id, self::version(version))
}

/// Starts building a package, see [`PackageBuilder`].
pub fn package(id: &str, version: &str) -> PackageBuilder {
	PackageBuilder { package: Package::new(identifier(id, version)) }
}

pub struct PackageBuilder {
	package: Package,
}

impl PackageBuilder {
	/// Adds a dependency that applies on every platform.
	pub fn depends(self, id: &str, range: Option<&str>) -> Self {
		self.add_dependency(None, id, range)
	}

	/// Adds a dependency that only applies to `platform`.
	pub fn depends_for(self, platform: &str, id: &str, range: Option<&str>) -> Self {
		self.add_dependency(Some(TargetPlatform::new(platform)), id, range)
	}

	fn add_dependency(mut self, platform: Option<TargetPlatform>, id: &str, range: Option<&str>) -> Self {
		let dependency = PackageDependency::new(id, range.map(self::range));
		match self.package.dependency_sets.iter_mut().find(|s| s.target_platform == platform) {
			Some(set) => set.dependencies.push(dependency),
			None => self.package.dependency_sets.push(DependencySet::new(platform, vec![dependency])),
		}
		self
	}

	pub fn kind(mut self, kind: Kind) -> Self {
		self.package.kind = kind;
		self
	}

	pub fn language(mut self, language: &str) -> Self {
		self.package.language = Some(language.to_string());
		self
	}

	pub fn delisted(mut self) -> Self {
		self.package.listed = false;
		self
	}

	pub fn build(self) -> Package {
		self.package
	}
}

impl From<PackageBuilder> for Package {
	fn from(value: PackageBuilder) -> Self {
		value.build()
	}
}

pub fn repository(packages: impl IntoIterator<Item = impl Into<Package>>) -> MetaDB {
	packages.into_iter().map(Into::into).collect()
}

/// Gets a package that must exist in `repository`.
pub fn get(repository: &MetaDB, id: &str, version: &str) -> Package {
	use pkgwalk::PackageRepository;
	repository.find_package(id, &self::version(version)).expect("test package missing").clone()
}

/// Operations as `"Install A 1.0.0"` strings for easy comparison.
pub fn operation_names(operations: &[Operation]) -> Vec<String> {
	operations.iter().map(|o| o.to_string()).collect()
}
