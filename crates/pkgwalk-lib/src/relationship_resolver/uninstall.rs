use std::collections::BTreeSet;

use crate::metadb::*;
use crate::metadb::package::*;
use crate::operation::{self, Operation};
use super::*;

/// Plans the removal of an installed package and, optionally, the dependencies nothing else needs.
///
/// Packages are removed before the packages they depend on.
pub struct UninstallWalker<'a> {
	repository: &'a dyn PackageRepository,
	dependents_resolver: &'a dyn DependentsResolver,
	settings: WalkSettings<'a>,
	marker: Marker,
	/// Used as a stack, popped into the final order.
	operations: Vec<Operation>,
	force_remove: bool,
	throw_on_conflicts: bool,
	warnings: Vec<PlanWarning>,
}

impl<'a> UninstallWalker<'a> {
	/// - `repository` holds the installed packages.
	/// - `dependents_resolver` answers what depends on each installed package.
	pub fn new(
		repository: &'a dyn PackageRepository,
		dependents_resolver: &'a dyn DependentsResolver,
		target_platform: Option<TargetPlatform>,
		remove_dependencies: bool,
		force_remove: bool,
	) -> Self {
		Self {
			repository,
			dependents_resolver,
			settings: WalkSettings {
				target_platform,
				ignore_dependencies: !remove_dependencies,
				skip_on_error: true,
				allow_prerelease: true,
				cycle_check: CycleCheck::Exact,
				..Default::default()
			},
			marker: Default::default(),
			operations: Default::default(),
			force_remove,
			throw_on_conflicts: true,
			warnings: Default::default(),
		}
	}

	/// Applies the uninstall options of `config`.
	pub fn configure(mut self, config: &crate::Config) -> Self {
		self.settings.ignore_dependencies = !config.remove_dependencies();
		self.settings.raise_error_on_cycle = config.raise_error_on_cycle();
		self.force_remove = config.force_remove();
		self
	}

	/// When disabled, packages that still have dependents are removed without an error.
	pub fn throw_on_conflicts(mut self, throw: bool) -> Self {
		self.throw_on_conflicts = throw;
		self
	}

	pub fn platform_compatibility(mut self, compatibility: &'a dyn PlatformCompatibility) -> Self {
		self.settings.platform_compatibility = compatibility;
		self
	}

	pub fn raise_error_on_cycle(mut self, raise: bool) -> Self {
		self.settings.raise_error_on_cycle = raise;
		self
	}

	/// Plans the removal of `package`.
	///
	/// # Errors
	/// - [`HasDependents`](crate::Error::HasDependents) when something outside of the plan still depends
	/// on a package being removed, unless forcing or conflicts aren't thrown.
	/// - [`CircularDependency`](crate::Error::CircularDependency) only when raising cycles is enabled.
	pub fn resolve_operations(&mut self, package: &Package) -> crate::Result<OperationPlan> {
		self.marker.clear();
		self.operations.clear();
		self.warnings.clear();

		walk(self, package)?;

		let operations = operation::reduce(self.operations.drain(..).rev());
		log::debug!("Planned {} operations to uninstall {}", operations.len(), package);
		Ok(OperationPlan {
			operations,
			conflicts: Vec::new(),
			warnings: std::mem::take(&mut self.warnings),
		})
	}

	/// Dependents of `identifier` that aren't being removed themselves.
	fn live_dependents(&self, identifier: &PackageIdentifier) -> Vec<PackageIdentifier> {
		self.dependents_resolver.get_dependents(identifier)
			.into_iter()
			.filter(|d| !self.is_connected(&d.identifier, &mut BTreeSet::new()))
			.map(|d| d.identifier.clone())
			.collect()
	}

	/// The package is being removed, or only packages being removed depend on it.
	fn is_connected(&self, identifier: &PackageIdentifier, seen: &mut BTreeSet<PackageIdentifier>) -> bool {
		if self.marker.contains(identifier) {
			return true
		}
		if !seen.insert(identifier.clone()) {
			return false
		}
		let dependents = self.dependents_resolver.get_dependents(identifier);
		!dependents.is_empty() && dependents.iter().all(|d| self.is_connected(&d.identifier, seen))
	}

	fn warn(&mut self, warning: PlanWarning) {
		log::warn!("{}", warning);
		if !self.warnings.contains(&warning) {
			self.warnings.push(warning);
		}
	}
}

impl PackageWalker for UninstallWalker<'_> {
	fn settings(&self) -> &WalkSettings<'_> { &self.settings }
	fn marker(&self) -> &Marker { &self.marker }
	fn marker_mut(&mut self) -> &mut Marker { &mut self.marker }

	fn resolve_dependency(&self, dependency: &PackageDependency) -> Option<Package> {
		resolve_dependency(dependency, self.repository, &NullConstraintProvider, true, false, DependencyVersion::Lowest).cloned()
	}

	fn on_before_package_walk(&mut self, package: &Package) -> crate::Result<bool> {
		let dependents = self.live_dependents(&package.identifier);
		if dependents.is_empty() {
			return Ok(true)
		}

		if self.force_remove {
			self.warn(PlanWarning::BrokenDependents { package: package.identifier.clone(), dependents });
		} else if self.throw_on_conflicts {
			return Err(crate::Error::HasDependents { package: package.identifier.clone(), dependents })
		}
		Ok(true)
	}

	fn on_after_resolve_dependency(&mut self, _package: &Package, dependency: &Package) -> bool {
		if self.force_remove {
			return true
		}

		let dependents = self.live_dependents(&dependency.identifier);
		if dependents.is_empty() {
			true
		} else {
			self.warn(PlanWarning::KeptForDependents { package: dependency.identifier.clone(), dependents });
			false
		}
	}

	fn on_dependency_resolve_error(&mut self, package: &Package, dependency: &PackageDependency) -> crate::Result<()> {
		self.warn(PlanWarning::UnresolvedDependency { package: package.identifier.clone(), dependency: dependency.to_string() });
		Ok(())
	}

	fn on_cycle(&mut self, chain: String) {
		self.warn(PlanWarning::CircularDependency(chain));
	}

	fn on_after_package_walk(&mut self, package: &Package) -> crate::Result<()> {
		self.operations.push(Operation::uninstall(package.clone()));
		Ok(())
	}
}
