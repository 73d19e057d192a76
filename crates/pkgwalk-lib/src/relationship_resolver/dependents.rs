use crate::metadb::*;
use crate::metadb::package::*;
use super::*;

/// Looks up the packages that depend on a package.
pub trait DependentsResolver {
	fn get_dependents(&self, identifier: &PackageIdentifier) -> Vec<&Package>;
}

/// Builds a [`DependentsIndex`] by walking every package of a repository.
pub struct DependentsWalker<'a> {
	repository: &'a dyn PackageRepository,
	settings: WalkSettings<'a>,
	marker: Marker,
}

impl<'a> DependentsWalker<'a> {
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
		}
	}

	pub fn platform_compatibility(mut self, compatibility: &'a dyn PlatformCompatibility) -> Self {
		self.settings.platform_compatibility = compatibility;
		self
	}

	pub fn build(mut self) -> crate::Result<DependentsIndex> {
		let repository = self.repository;
		for package in repository.get_packages() {
			walk(&mut self, package)?;
		}
		Ok(DependentsIndex { marker: self.marker })
	}
}

impl PackageWalker for DependentsWalker<'_> {
	fn settings(&self) -> &WalkSettings<'_> { &self.settings }
	fn marker(&self) -> &Marker { &self.marker }
	fn marker_mut(&mut self) -> &mut Marker { &mut self.marker }

	fn resolve_dependency(&self, dependency: &PackageDependency) -> Option<Package> {
		resolve_dependency(dependency, self.repository, &NullConstraintProvider, true, false, DependencyVersion::Lowest).cloned()
	}

	fn on_dependency_resolve_error(&mut self, package: &Package, dependency: &PackageDependency) -> crate::Result<()> {
		log::warn!("Unable to resolve dependency '{}' of '{}' while indexing dependents", dependency, package);
		Ok(())
	}

	fn on_cycle(&mut self, chain: String) {
		log::warn!("Skipping circular dependency {} while indexing dependents", chain);
	}
}

/// The reverse dependencies of a repository.
#[derive(Debug, Default, Clone)]
pub struct DependentsIndex {
	marker: Marker,
}

impl DependentsIndex {
	pub fn dependency_graph(&self) -> DependencyGraph {
		DependencyGraph::from_marker(&self.marker)
	}
}

impl DependentsResolver for DependentsIndex {
	fn get_dependents(&self, identifier: &PackageIdentifier) -> Vec<&Package> {
		self.marker.get_dependents(identifier)
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

	#[test]
	fn dependents_index() {
		let repository: MetaDB = vec![package("A", &["C"]), package("B", &["C"]), package("C", &["Missing"])].into();
		let index = DependentsWalker::new(&repository, None).build().unwrap();
		let c = package("C", &[]).identifier;
		let mut dependents = index.get_dependents(&c).into_iter().map(|p| p.id()).collect::<Vec<_>>();
		dependents.sort();
		assert_eq!(dependents, vec!["A", "B"]);
		assert!(index.get_dependents(&package("A", &[]).identifier).is_empty());
	}

	#[test]
	fn dependents_index_tolerates_cycles() {
		let repository: MetaDB = vec![package("A", &["B"]), package("B", &["A"])].into();
		let index = DependentsWalker::new(&repository, None).build().unwrap();
		assert_eq!(index.get_dependents(&package("A", &[]).identifier).len(), 1);
		assert_eq!(index.dependency_graph().cycles().len(), 1);
	}
}
