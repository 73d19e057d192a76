use serde::*;
use super::*;

/// A unique identifier for packages.
///
/// The `id` is case-insensitive, `Newtonsoft.Json 1.0` and `newtonsoft.json 1.0` are the same package.
/// Use [`PackageIdentifier::same_id()`] where only the identifier matters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageIdentifier {
	pub id: String,
	pub version: PackageVersion,
}

impl PackageIdentifier {
	pub fn new(id: impl Into<String>, version: PackageVersion) -> Self {
		Self { id: id.into(), version }
	}

	/// Id-only equality, ignores the version.
	pub fn same_id(&self, other: &PackageIdentifier) -> bool {
		ids_match(&self.id, &other.id)
	}

	/// The identifier in the form used as a key by indices.
	pub(crate) fn id_key(&self) -> String {
		id_key(&self.id)
	}
}

/// Case-insensitive identifier comparison.
pub fn ids_match(lhs: &str, rhs: &str) -> bool {
	id_key(lhs) == id_key(rhs)
}

pub(crate) fn id_key(id: &str) -> String {
	id.to_lowercase()
}

impl PartialEq for PackageIdentifier {
	fn eq(&self, other: &Self) -> bool {
		self.same_id(other) && self.version == other.version
	}
}

impl Eq for PackageIdentifier {}

impl std::hash::Hash for PackageIdentifier {
	fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
		self.id_key().hash(state);
		self.version.hash(state);
	}
}

impl std::cmp::Ord for PackageIdentifier {
	fn cmp(&self, other: &Self) -> std::cmp::Ordering {
		match self.id_key().cmp(&other.id_key()) {
			core::cmp::Ordering::Equal => {}
			ord => return ord,
		}
		self.version.cmp(&other.version)
	}
}

impl std::cmp::PartialOrd for PackageIdentifier {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}

impl std::fmt::Display for PackageIdentifier {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{} {}", self.id, self.version)
	}
}

impl AsRef<PackageIdentifier> for PackageIdentifier {
	fn as_ref(&self) -> &PackageIdentifier {
		self
	}
}

/// A requirement placed on another package by its identifier and an optional version range.
///
/// Differs from [`PackageIdentifier`] in that it represents a range of packages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDependency {
	pub id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub version: Option<VersionRange>,
}

impl PackageDependency {
	pub fn new(id: impl Into<String>, version: Option<VersionRange>) -> Self {
		Self { id: id.into(), version }
	}

	/// Checks if `identifier` fulfills this dependency, an absent range allows any version.
	pub fn is_satisfied_by(&self, identifier: &PackageIdentifier) -> bool {
		ids_match(&self.id, &identifier.id)
			&& self.version.as_ref().map_or(true, |range| range.satisfies(&identifier.version))
	}
}

impl std::fmt::Display for PackageDependency {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.version {
			Some(range) => write!(f, "{} {}", self.id, range),
			None => write!(f, "{}", self.id),
		}
	}
}

/// A list of dependencies that only applies when installing for `target_platform`.
///
/// Sets without a platform apply everywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySet {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub target_platform: Option<TargetPlatform>,
	#[serde(default)]
	pub dependencies: Vec<PackageDependency>,
}

impl DependencySet {
	pub fn new(target_platform: Option<TargetPlatform>, dependencies: Vec<PackageDependency>) -> Self {
		Self { target_platform, dependencies }
	}
}
