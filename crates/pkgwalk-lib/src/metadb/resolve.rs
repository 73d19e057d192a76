//! Picks a single package to satisfy a dependency.
//!
//! Resolution is greedy: one version is chosen per call and never revisited.

use serde::{Serialize, Deserialize};

use super::*;

/// Which version to choose when several satisfy a dependency's range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyVersion {
	/// The lowest satisfying version.
	#[default] Lowest,
	/// The highest version sharing major and minor with the lowest satisfying version.
	HighestPatch,
	/// The highest version sharing major with the lowest satisfying version.
	HighestMinor,
	/// The highest satisfying version.
	Highest,
}

impl std::str::FromStr for DependencyVersion {
	type Err = crate::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"lowest" => Ok(Self::Lowest),
			"highestpatch" => Ok(Self::HighestPatch),
			"highestminor" => Ok(Self::HighestMinor),
			"highest" => Ok(Self::Highest),
			_ => Err(crate::Error::Parse(format!("unknown dependency version \"{}\"", s))),
		}
	}
}

/// Resolves `dependency` to a single package from `repository`.
///
/// # Process
/// 1. Every version of the dependency's id is a candidate.
/// 1. A range pinned by `constraints` is applied before anything else.
/// 1. Prereleases are dropped unless `allow_prerelease`.
/// 1. With `prefer_listed` the remaining steps are tried on listed candidates first,
/// falling back to every candidate when that finds nothing.
/// 1. Without a range on the dependency the highest version wins, otherwise the candidates inside
/// the range are ordered and picked from according to `dependency_version`.
///
/// Returns `None` when nothing is left, it is up to the caller to decide if that is an error.
pub fn resolve_dependency<'r, R>(
	dependency: &PackageDependency,
	repository: &'r R,
	constraints: &dyn ConstraintProvider,
	allow_prerelease: bool,
	prefer_listed: bool,
	dependency_version: DependencyVersion,
) -> Option<&'r Package>
where R: PackageRepository + ?Sized,
{
	let mut candidates = repository.find_packages_by_id(&dependency.id);

	if let Some(constraint) = constraints.get_constraint(&dependency.id) {
		candidates = candidates.into_iter().version_matches(&constraint).collect();
	}

	if !allow_prerelease {
		candidates.retain(|p| p.is_release_version());
	}

	if prefer_listed {
		let listed = candidates.iter().copied().filter(|p| p.listed).collect::<Vec<_>>();
		if let Some(package) = select_candidate(listed, dependency, dependency_version) {
			return Some(package)
		}
	}

	select_candidate(candidates, dependency, dependency_version)
}

fn select_candidate<'r>(mut candidates: Vec<&'r Package>, dependency: &PackageDependency, dependency_version: DependencyVersion) -> Option<&'r Package> {
	match &dependency.version {
		None => candidates.into_iter().max_by(|a, b| a.version().cmp(b.version())),
		Some(range) => {
			candidates.retain(|p| range.satisfies(p.version()));
			candidates.sort_by(|a, b| a.version().cmp(b.version()));
			select_dependency(&candidates, dependency_version)
		},
	}
}

/// Picks from `packages` according to `dependency_version`.
///
/// `packages` must be sorted by ascending version.
pub fn select_dependency<'r>(packages: &[&'r Package], dependency_version: DependencyVersion) -> Option<&'r Package> {
	let floor = packages.first()?.version();

	match dependency_version {
		DependencyVersion::Lowest => packages.first().copied(),
		DependencyVersion::Highest => packages.last().copied(),
		DependencyVersion::HighestPatch => packages.iter()
			.take_while(|p| (p.version().major(), p.version().minor()) == (floor.major(), floor.minor()))
			.last()
			.copied(),
		DependencyVersion::HighestMinor => packages.iter()
			.take_while(|p| p.version().major() == floor.major())
			.last()
			.copied(),
	}
}
