//! Works out whether each walked package belongs to the project or the solution.
//!
//! Packages with project content go to the project and tool packages to the solution.
//! Meta packages have no content of their own and take the targets of their dependencies,
//! mixing the two is an error.

use std::collections::BTreeMap;

use crate::metadb::package::*;
use crate::operation::OperationTarget;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Targets {
	project: bool,
	solution: bool,
}

impl Targets {
	fn initial(kind: Kind) -> Option<Self> {
		match kind {
			Kind::Project => Some(Targets { project: true, solution: false }),
			Kind::Tools => Some(Targets { project: false, solution: true }),
			Kind::MetaPackage => None,
		}
	}
}

#[derive(Debug, Clone)]
struct PackageWalkInfo {
	/// Set when the package decides its own target.
	initial: Option<Targets>,
	targets: Targets,
}

#[derive(Debug, Default, Clone)]
pub struct WalkInfo {
	packages: BTreeMap<PackageIdentifier, PackageWalkInfo>,
	parents: BTreeMap<PackageIdentifier, PackageIdentifier>,
}

impl WalkInfo {
	pub fn new() -> Self {
		Default::default()
	}

	pub fn clear(&mut self) {
		self.packages.clear();
		self.parents.clear();
	}

	fn get_or_insert(&mut self, package: &Package) -> &mut PackageWalkInfo {
		self.packages.entry(package.identifier.clone()).or_insert_with(|| {
			let initial = Targets::initial(package.kind);
			PackageWalkInfo { initial, targets: initial.unwrap_or_default() }
		})
	}

	/// Records that `dependency` is about to be walked on behalf of `parent`.
	pub fn set_parent(&mut self, dependency: &PackageIdentifier, parent: &Package) {
		self.get_or_insert(parent);
		self.parents.insert(dependency.clone(), parent.identifier.clone());
	}

	/// Adds `package`'s targets to its parent when the parent takes its target from its dependencies.
	///
	/// # Errors
	/// - [`MixedDependencyTargets`](crate::Error::MixedDependencyTargets) when the parent ends up
	/// with both project and solution dependencies.
	pub fn process(&mut self, package: &Package) -> crate::Result<()> {
		let targets = self.get_or_insert(package).targets;

		let Some(parent) = self.parents.get(&package.identifier).cloned() else {
			return Ok(())
		};
		let Some(parent_info) = self.packages.get_mut(&parent) else {
			return Ok(())
		};
		if parent_info.initial.is_some() {
			return Ok(())
		}

		parent_info.targets.project |= targets.project;
		parent_info.targets.solution |= targets.solution;
		if parent_info.targets.project && parent_info.targets.solution {
			return Err(crate::Error::MixedDependencyTargets(parent))
		}
		Ok(())
	}

	/// The target of a processed package. Packages without any target go to the project.
	pub fn target_of(&self, identifier: &PackageIdentifier) -> OperationTarget {
		match self.packages.get(identifier).map(|i| i.targets) {
			Some(Targets { project: false, solution: true }) => OperationTarget::Solution,
			_ => OperationTarget::Project,
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn package(id: &str, kind: Kind) -> Package {
		let mut p = Package::new(PackageIdentifier::new(id, PackageVersion::new("1.0").unwrap()));
		p.kind = kind;
		p
	}

	#[test]
	fn walk_info_meta_package_takes_dependency_target() {
		let mut info = WalkInfo::new();
		let (meta, tool) = (package("Meta", Kind::MetaPackage), package("Tool", Kind::Tools));
		info.set_parent(&tool.identifier, &meta);
		info.process(&tool).unwrap();
		info.process(&meta).unwrap();
		assert_eq!(info.target_of(&meta.identifier), OperationTarget::Solution);
		assert_eq!(info.target_of(&tool.identifier), OperationTarget::Solution);
	}

	#[test]
	fn walk_info_project_parent_keeps_its_target() {
		let mut info = WalkInfo::new();
		let (lib, tool) = (package("Lib", Kind::Project), package("Tool", Kind::Tools));
		info.set_parent(&tool.identifier, &lib);
		info.process(&tool).unwrap();
		assert_eq!(info.target_of(&lib.identifier), OperationTarget::Project);
	}

	#[test]
	fn walk_info_mixed_targets_are_an_error() {
		let mut info = WalkInfo::new();
		let meta = package("Meta", Kind::MetaPackage);
		let (lib, tool) = (package("Lib", Kind::Project), package("Tool", Kind::Tools));
		info.set_parent(&lib.identifier, &meta);
		info.process(&lib).unwrap();
		info.set_parent(&tool.identifier, &meta);
		assert!(matches!(info.process(&tool), Err(crate::Error::MixedDependencyTargets(_))));
	}

	#[test]
	fn walk_info_empty_meta_package_goes_to_project() {
		let mut info = WalkInfo::new();
		let meta = package("Meta", Kind::MetaPackage);
		info.process(&meta).unwrap();
		assert_eq!(info.target_of(&meta.identifier), OperationTarget::Project);
	}
}
