use crate::metadb::*;
use crate::metadb::package::*;
use super::*;

/// Orders every package of a repository so dependencies come before the packages depending on them.
pub struct PackageSorter<'a> {
	repository: &'a dyn PackageRepository,
	settings: WalkSettings<'a>,
	marker: Marker,
	sorted: Vec<Package>,
}

impl<'a> PackageSorter<'a> {
	pub fn new(repository: &'a dyn PackageRepository, target_platform: Option<TargetPlatform>) -> Self {
		Self {
			repository,
			settings: WalkSettings {
				target_platform,
				skip_on_error: true,
				allow_prerelease: true,
				cycle_check: CycleCheck::Exact,
				..Default::default()
			},
			marker: Default::default(),
			sorted: Default::default(),
		}
	}

	pub fn platform_compatibility(mut self, compatibility: &'a dyn PlatformCompatibility) -> Self {
		self.settings.platform_compatibility = compatibility;
		self
	}

	pub fn raise_error_on_cycle(mut self, raise: bool) -> Self {
		self.settings.raise_error_on_cycle = raise;
		self
	}

	/// Every package in the repository exactly once, dependencies first.
	///
	/// Packages are walked in id then version order so the result is deterministic.
	///
	/// # Errors
	/// - [`CircularDependency`](crate::Error::CircularDependency) only when raising cycles is enabled.
	pub fn get_packages_by_dependency_order(&mut self) -> crate::Result<Vec<Package>> {
		self.marker.clear();
		self.sorted.clear();

		let repository = self.repository;
		let mut packages = repository.get_packages();
		packages.sort();
		for package in packages {
			walk(self, package)?;
		}

		log::debug!("Sorted {} packages", self.sorted.len());
		Ok(std::mem::take(&mut self.sorted))
	}

	/// Dependency cycles found by the last sort.
	pub fn cycles(&self) -> Vec<Vec<PackageIdentifier>> {
		DependencyGraph::from_marker(&self.marker).cycles()
	}
}

impl PackageWalker for PackageSorter<'_> {
	fn settings(&self) -> &WalkSettings<'_> { &self.settings }
	fn marker(&self) -> &Marker { &self.marker }
	fn marker_mut(&mut self) -> &mut Marker { &mut self.marker }

	fn resolve_dependency(&self, dependency: &PackageDependency) -> Option<Package> {
		resolve_dependency(dependency, self.repository, &NullConstraintProvider, true, false, DependencyVersion::Lowest).cloned()
	}

	fn on_dependency_resolve_error(&mut self, package: &Package, dependency: &PackageDependency) -> crate::Result<()> {
		log::warn!("Unable to resolve dependency '{}' of '{}' while sorting", dependency, package);
		Ok(())
	}

	fn on_cycle(&mut self, chain: String) {
		log::warn!("Skipping circular dependency {} while sorting", chain);
	}

	fn on_after_package_walk(&mut self, package: &Package) -> crate::Result<()> {
		self.sorted.push(package.clone());
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn package(id: &str, dependencies: &[&str]) -> Package {
		let mut p = Package::new(PackageIdentifier::new(id, PackageVersion::new("1.0").unwrap()));
		p.dependency_sets.push(DependencySet::new(None, dependencies.iter().map(|d| PackageDependency::new(*d, None)).collect()));
		p
	}

	fn ids(packages: &[Package]) -> Vec<&str> {
		packages.iter().map(|p| p.id()).collect()
	}

	#[test]
	fn sort_puts_dependencies_first() {
		let repository: MetaDB = vec![package("A", &["C"]), package("B", &[]), package("C", &["B"])].into();
		let sorted = PackageSorter::new(&repository, None).get_packages_by_dependency_order().unwrap();
		assert_eq!(ids(&sorted), vec!["B", "C", "A"]);
	}

	#[test]
	fn sort_cycle_returns_each_package_once() {
		let repository: MetaDB = vec![package("A", &["B"]), package("B", &["A"])].into();
		let mut sorter = PackageSorter::new(&repository, None);
		let sorted = sorter.get_packages_by_dependency_order().unwrap();
		assert_eq!(ids(&sorted), vec!["B", "A"]);
		assert_eq!(sorter.cycles().len(), 1);
	}

	#[test]
	fn sort_skips_missing_dependencies() {
		let repository: MetaDB = vec![package("A", &["Missing", "B"]), package("B", &[])].into();
		let sorted = PackageSorter::new(&repository, None).get_packages_by_dependency_order().unwrap();
		assert_eq!(ids(&sorted), vec!["B", "A"]);
	}
}
