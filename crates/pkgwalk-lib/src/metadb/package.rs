//! Various types associated with packages.

use serde::*;

/// A single version of a package along with the metadata the planner needs.
///
/// Equality, ordering and hashing only consider the [`PackageIdentifier`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
	#[serde(flatten)]
	pub identifier: PackageIdentifier,
	/// Delisted packages are still installable but are only picked when nothing listed fits.
	#[serde(default = "listed_default")]
	pub listed: bool,
	#[serde(default)]
	pub kind: Kind,
	/// Culture name for localized resource packages, e.g. `fr` or `zh-Hans`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub language: Option<String>,
	#[serde(default)]
	pub dependency_sets: Vec<DependencySet>,
}

fn listed_default() -> bool { true }

impl std::hash::Hash for Package {
	fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
		self.identifier.hash(state);
	}
}

impl std::cmp::Ord for Package {
	fn cmp(&self, other: &Self) -> std::cmp::Ordering {
		self.identifier.cmp(&other.identifier)
	}
}

impl std::cmp::PartialOrd for Package {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}

impl std::cmp::PartialEq for Package {
	fn eq(&self, other: &Self) -> bool {
		self.identifier == other.identifier
	}
}

impl std::cmp::Eq for Package {}

impl AsRef<PackageIdentifier> for Package {
	fn as_ref(&self) -> &PackageIdentifier {
		&self.identifier
	}
}

impl std::fmt::Display for Package {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.identifier.fmt(f)
	}
}

impl Package {
	pub fn new(identifier: PackageIdentifier) -> Self {
		Self {
			identifier,
			listed: true,
			kind: Default::default(),
			language: None,
			dependency_sets: Default::default(),
		}
	}

	pub fn id(&self) -> &str {
		&self.identifier.id
	}

	pub fn version(&self) -> &PackageVersion {
		&self.identifier.version
	}

	pub fn is_release_version(&self) -> bool {
		!self.identifier.version.is_prerelease()
	}

	/// Gets the dependencies that apply when installing for `target`.
	///
	/// - Without a target every set applies.
	/// - Otherwise the sets for platforms compatible with `target` are used, or the
	/// platform-agnostic sets when no specific set is compatible.
	pub fn compatible_dependencies(&self, target: Option<&TargetPlatform>, compatibility: &dyn PlatformCompatibility) -> Vec<&PackageDependency> {
		let target = match target {
			Some(t) => t,
			None => return self.dependency_sets.iter().flat_map(|s| &s.dependencies).collect(),
		};

		let specific = self.dependency_sets.iter()
			.filter(|s| s.target_platform.as_ref().is_some_and(|p| compatibility.is_compatible(target, p)))
			.collect::<Vec<_>>();

		if specific.is_empty() {
			self.dependency_sets.iter()
				.filter(|s| s.target_platform.is_none())
				.flat_map(|s| &s.dependencies)
				.collect()
		} else {
			specific.into_iter().flat_map(|s| &s.dependencies).collect()
		}
	}

	/// Finds the dependency this package declares on `id` for `target`, if any.
	pub fn find_dependency(&self, id: &str, target: Option<&TargetPlatform>, compatibility: &dyn PlatformCompatibility) -> Option<&PackageDependency> {
		self.compatible_dependencies(target, compatibility)
			.into_iter()
			.find(|d| ids_match(&d.id, id))
	}

	/// Checks if this package is a localized resource package for a runtime package.
	///
	/// A satellite package:
	/// 1. Has a `language`.
	/// 1. Has an id of the form `<runtime id>.<language>`.
	/// 1. Depends on exactly one version of the runtime package, e.g. `[1.0]`.
	pub fn is_satellite_package(&self) -> bool {
		let language = match &self.language {
			Some(l) if !l.is_empty() => l,
			_ => return false,
		};

		let id = id_key(&self.identifier.id);
		let suffix = format!(".{}", id_key(language));
		let runtime_id = match id.strip_suffix(&suffix) {
			Some(r) if !r.is_empty() => r,
			_ => return false,
		};

		self.dependency_sets.iter()
			.flat_map(|s| &s.dependencies)
			.any(|d| id_key(&d.id) == runtime_id && d.version.as_ref().is_some_and(|r| r.is_exact()))
	}
}

/* Package Types */

mod package_version;
pub use package_version::PackageVersion;

mod version_range;
pub use version_range::VersionRange;

mod target_platform;
pub use target_platform::TargetPlatform;
pub use target_platform::PlatformCompatibility;
pub use target_platform::ExactPlatformMatch;

mod relationship;
pub use relationship::PackageIdentifier;
pub use relationship::PackageDependency;
pub use relationship::DependencySet;
pub use relationship::ids_match;
pub(crate) use relationship::id_key;

mod kind;
pub use kind::Kind;
