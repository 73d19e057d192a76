use std::collections::BTreeSet;

use crate::metadb::*;
use crate::metadb::package::*;
use crate::operation::{self, AcceptedTargets, Operation, PackageAction};
use super::*;

/// Plans installing a package and whatever it depends on that isn't installed yet.
///
/// Dependencies are satisfied by packages already chosen in the session first, then installed
/// packages, and only then the source repository.
pub struct InstallWalker<'a> {
	local_repository: &'a dyn PackageRepository,
	source_repository: &'a dyn PackageRepository,
	dependents_resolver: &'a dyn DependentsResolver,
	constraint_provider: &'a dyn ConstraintProvider,
	settings: WalkSettings<'a>,
	accepted_targets: AcceptedTargets,
	marker: Marker,
	walk_info: WalkInfo,
	operations: Vec<Operation>,
	/// Installed packages the plan relies on.
	packages_to_keep: BTreeSet<PackageIdentifier>,
	conflicts: Vec<ConflictRecord>,
	warnings: Vec<PlanWarning>,
}

impl<'a> InstallWalker<'a> {
	/// - `local_repository` holds the installed packages.
	/// - `source_repository` is where new packages come from.
	/// - `dependents_resolver` answers what depends on each installed package.
	pub fn new(
		local_repository: &'a dyn PackageRepository,
		source_repository: &'a dyn PackageRepository,
		dependents_resolver: &'a dyn DependentsResolver,
		target_platform: Option<TargetPlatform>,
	) -> Self {
		Self {
			local_repository,
			source_repository,
			dependents_resolver,
			constraint_provider: &NullConstraintProvider,
			settings: WalkSettings {
				target_platform,
				..Default::default()
			},
			accepted_targets: Default::default(),
			marker: Default::default(),
			walk_info: Default::default(),
			operations: Default::default(),
			packages_to_keep: Default::default(),
			conflicts: Default::default(),
			warnings: Default::default(),
		}
	}

	/// Applies the install options of `config`, the config's constraints have to be passed separately
	/// with [`InstallWalker::constraint_provider()`].
	pub fn configure(mut self, config: &crate::Config) -> Self {
		self.settings.ignore_dependencies = config.ignore_dependencies();
		self.settings.allow_prerelease = config.allow_prerelease();
		self.settings.dependency_version = config.dependency_version();
		self.settings.raise_error_on_cycle = config.raise_error_on_cycle();
		self.accepted_targets = config.accepted_targets();
		self
	}

	pub fn ignore_dependencies(mut self, ignore: bool) -> Self {
		self.settings.ignore_dependencies = ignore;
		self
	}

	pub fn allow_prerelease(mut self, allow: bool) -> Self {
		self.settings.allow_prerelease = allow;
		self
	}

	pub fn dependency_version(mut self, dependency_version: DependencyVersion) -> Self {
		self.settings.dependency_version = dependency_version;
		self
	}

	pub fn constraint_provider(mut self, constraint_provider: &'a dyn ConstraintProvider) -> Self {
		self.constraint_provider = constraint_provider;
		self
	}

	pub fn accepted_targets(mut self, accepted_targets: AcceptedTargets) -> Self {
		self.accepted_targets = accepted_targets;
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

	/// Plans installing `package`.
	///
	/// # Errors
	/// - [`UnresolvedDependency`](crate::Error::UnresolvedDependency) when a dependency can't be found.
	/// - [`MixedDependencyTargets`](crate::Error::MixedDependencyTargets) when a meta package mixes
	/// project and solution level dependencies.
	/// - [`CircularDependency`](crate::Error::CircularDependency) only when raising cycles is enabled.
	pub fn resolve_operations(&mut self, package: &Package) -> crate::Result<OperationPlan> {
		self.resolve_operations_for_all(std::slice::from_ref(package))
	}

	/// Plans installing all of `packages` together, each sees the choices made for the previous ones.
	pub fn resolve_operations_for_all(&mut self, packages: &[Package]) -> crate::Result<OperationPlan> {
		self.reset();
		for package in packages {
			walk(self, package)?;
		}
		Ok(self.finish())
	}

	pub(super) fn reset(&mut self) {
		self.marker.clear();
		self.walk_info.clear();
		self.operations.clear();
		self.packages_to_keep.clear();
		self.conflicts.clear();
		self.warnings.clear();
	}

	pub(super) fn finish(&mut self) -> OperationPlan {
		let operations = operation::reduce(self.operations.drain(..));
		log::debug!("Planned {} operations with {} conflicts", operations.len(), self.conflicts.len());
		OperationPlan {
			operations,
			conflicts: std::mem::take(&mut self.conflicts),
			warnings: std::mem::take(&mut self.warnings),
		}
	}

	pub(super) fn local_repository(&self) -> &'a dyn PackageRepository {
		self.local_repository
	}

	/// Another version of `package` chosen earlier in this session.
	pub(super) fn session_conflict(&self, package: &Package) -> Option<(Package, ConflictSource)> {
		self.marker.find_packages_by_id(package.id())
			.into_iter()
			.find(|p| p.version() != package.version())
			.map(|p| (p.clone(), ConflictSource::Session))
	}

	/// Decides whether `package` can be walked given a conflicting package.
	///
	/// # Process
	/// 1. Packages depending on the conflicting one that don't accept `package`'s version make a
	/// conflict and `package` is skipped.
	/// 1. A downgrade makes a conflict and `package` is skipped.
	/// 1. An upgrade plans removing the conflicting package.
	pub(super) fn handle_conflict(&mut self, package: &Package, conflict: Option<(Package, ConflictSource)>) -> crate::Result<bool> {
		let Some((conflicting, source)) = conflict else {
			return Ok(true)
		};
		if conflicting.identifier == package.identifier {
			return Ok(true)
		}

		let dependents = match source {
			ConflictSource::Session => self.marker.get_dependents(&conflicting.identifier),
			ConflictSource::Installed => self.dependents_resolver.get_dependents(&conflicting.identifier),
		};
		/* Dependents already being removed can't break */
		let dependents = dependents.into_iter()
			.filter(|d| !self.is_uninstall_planned(&d.identifier))
			.collect::<Vec<_>>();
		let target = self.settings.target_platform.as_ref();
		let incompatible_dependents = dependents.iter()
			.filter(|d| d.find_dependency(package.id(), target, self.settings.platform_compatibility)
				.is_some_and(|dependency| !dependency.is_satisfied_by(&package.identifier)))
			.map(|d| d.identifier.clone())
			.collect::<Vec<_>>();
		let dependents = dependents.iter().map(|d| d.identifier.clone()).collect::<Vec<_>>();

		let reason = if !incompatible_dependents.is_empty() {
			Some(ConflictReason::IncompatibleDependents)
		} else if package.version() < conflicting.version() {
			Some(ConflictReason::Downgrade)
		} else {
			None
		};

		if let Some(reason) = reason {
			let record = ConflictRecord {
				package: package.identifier.clone(),
				conflicting_package: conflicting,
				source,
				reason,
				dependents,
				incompatible_dependents,
			};
			let recorded = self.conflicts.iter().any(|c| c.package == record.package
				&& c.conflicting_package.identifier == record.conflicting_package.identifier
				&& c.source == record.source
				&& c.reason == record.reason);
			if !recorded {
				log::warn!("Conflict: {}", record);
				self.conflicts.push(record);
			}
			return Ok(false)
		}

		self.uninstall_conflicting(&conflicting, source)?;
		Ok(true)
	}

	fn is_uninstall_planned(&self, identifier: &PackageIdentifier) -> bool {
		self.operations.iter().any(|o| o.action == PackageAction::Uninstall && &o.package.identifier == identifier)
	}

	/// Plans removing `conflicting` to make way for a newer version.
	fn uninstall_conflicting(&mut self, conflicting: &Package, source: ConflictSource) -> crate::Result<()> {
		self.packages_to_keep.remove(&conflicting.identifier);

		if self.is_uninstall_planned(&conflicting.identifier) && !self.marker.contains(&conflicting.identifier) {
			return Ok(())
		}

		log::debug!("Replacing {}", conflicting);
		let target_platform = self.settings.target_platform.clone();
		let compatibility = self.settings.platform_compatibility;
		let plan = match source {
			ConflictSource::Session => UninstallWalker::new(&self.marker, &self.marker, target_platform, false, false)
				.throw_on_conflicts(false)
				.platform_compatibility(compatibility)
				.resolve_operations(conflicting)?,
			ConflictSource::Installed => UninstallWalker::new(self.local_repository, self.dependents_resolver, target_platform, !self.settings.ignore_dependencies, false)
				.throw_on_conflicts(false)
				.platform_compatibility(compatibility)
				.resolve_operations(conflicting)?,
		};

		for operation in plan.operations {
			if operation.action == PackageAction::Install || !self.packages_to_keep.contains(&operation.package.identifier) {
				self.operations.push(operation);
			}
		}
		Ok(())
	}
}

impl PackageWalker for InstallWalker<'_> {
	fn settings(&self) -> &WalkSettings<'_> { &self.settings }
	fn marker(&self) -> &Marker { &self.marker }
	fn marker_mut(&mut self) -> &mut Marker { &mut self.marker }

	fn walk_info(&mut self) -> Option<&mut WalkInfo> {
		Some(&mut self.walk_info)
	}

	fn resolve_dependency(&self, dependency: &PackageDependency) -> Option<Package> {
		let (allow_prerelease, dependency_version) = (self.settings.allow_prerelease, self.settings.dependency_version);
		resolve_dependency(dependency, self.local_repository, self.constraint_provider, allow_prerelease, false, dependency_version)
			.or_else(|| resolve_dependency(dependency, self.source_repository, self.constraint_provider, allow_prerelease, true, dependency_version))
			.cloned()
	}

	fn on_before_package_walk(&mut self, package: &Package) -> crate::Result<bool> {
		let conflict = self.session_conflict(package);
		self.handle_conflict(package, conflict)
	}

	fn on_dependency_resolve_error(&mut self, _package: &Package, dependency: &PackageDependency) -> crate::Result<()> {
		let constraint = self.constraint_provider.get_constraint(&dependency.id)
			.map(|range| (range.to_string(), self.constraint_provider.source().to_string()));
		Err(crate::Error::UnresolvedDependency { dependency: dependency.to_string(), constraint })
	}

	fn on_cycle(&mut self, chain: String) {
		let warning = PlanWarning::CircularDependency(chain);
		log::warn!("{}", warning);
		self.warnings.push(warning);
	}

	fn on_after_package_walk(&mut self, package: &Package) -> crate::Result<()> {
		if self.local_repository.exists(&package.identifier) {
			self.operations.retain(|o| !(o.action == PackageAction::Uninstall && o.package.identifier == package.identifier));
			self.packages_to_keep.insert(package.identifier.clone());
			return Ok(())
		}

		let target = self.walk_info.target_of(&package.identifier);
		if self.accepted_targets.accepts(target) {
			self.operations.push(Operation::new(package.clone(), PackageAction::Install, target));
		} else {
			log::debug!("Not installing {} to the {:?}", package, target);
		}
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn package(id: &str, version: &str, dependencies: &[(&str, &str)]) -> Package {
		let mut p = Package::new(PackageIdentifier::new(id, PackageVersion::new(version).unwrap()));
		p.dependency_sets.push(DependencySet::new(None, dependencies.iter()
			.map(|(id, range)| PackageDependency::new(*id, Some(VersionRange::parse(range).unwrap())))
			.collect()));
		p
	}

	fn names(plan: &OperationPlan) -> Vec<String> {
		plan.operations.iter().map(|o| o.to_string()).collect()
	}

	#[test]
	fn install_picks_lowest_dependency() {
		let source: MetaDB = vec![package("A", "1.0", &[("B", "[1.0,)")]), package("B", "1.0", &[]), package("B", "2.0", &[])].into();
		let local = MetaDB::new();
		let index = DependentsIndex::default();
		let root = source.find_package("A", &PackageVersion::new("1.0").unwrap()).unwrap().clone();
		let plan = InstallWalker::new(&local, &source, &index, None).resolve_operations(&root).unwrap();
		assert_eq!(names(&plan), vec!["Install B 1.0.0", "Install A 1.0.0"]);
	}

	#[test]
	fn install_uses_installed_dependency() {
		let source: MetaDB = vec![package("A", "1.0", &[("B", "[1.0,)")]), package("B", "1.0", &[]), package("B", "2.0", &[])].into();
		let local: MetaDB = vec![package("B", "2.0", &[])].into();
		let index = DependentsIndex::default();
		let root = source.find_package("A", &PackageVersion::new("1.0").unwrap()).unwrap().clone();
		let plan = InstallWalker::new(&local, &source, &index, None).resolve_operations(&root).unwrap();
		assert_eq!(names(&plan), vec!["Install A 1.0.0"]);
	}

	#[test]
	fn install_missing_dependency_names_constraint() {
		let source: MetaDB = vec![package("A", "1.0", &[("B", "[1.0,)")]), package("B", "1.0", &[])].into();
		let local = MetaDB::new();
		let index = DependentsIndex::default();
		let mut constraints = DefaultConstraintProvider::new("packages.config");
		constraints.add_constraint("B", VersionRange::parse("[2.0,)").unwrap());
		let root = source.find_package("A", &PackageVersion::new("1.0").unwrap()).unwrap().clone();
		let error = InstallWalker::new(&local, &source, &index, None)
			.constraint_provider(&constraints)
			.resolve_operations(&root)
			.unwrap_err();
		assert_eq!(error.to_string(), "unable to resolve dependency 'B 1.0.0', additional constraint '2.0.0' defined in packages.config");
	}

	#[test]
	fn install_session_conflict_with_incompatible_dependent() {
		let source: MetaDB = vec![
			package("A", "1.0", &[("C", "[1.0]"), ("B", "1.0")]),
			package("B", "1.0", &[("C", "[2.0]")]),
			package("C", "1.0", &[]),
			package("C", "2.0", &[]),
		].into();
		let local = MetaDB::new();
		let index = DependentsIndex::default();
		let root = source.find_package("A", &PackageVersion::new("1.0").unwrap()).unwrap().clone();
		let plan = InstallWalker::new(&local, &source, &index, None).resolve_operations(&root).unwrap();
		assert_eq!(plan.conflicts.len(), 1);
		assert_eq!(plan.conflicts[0].reason, ConflictReason::IncompatibleDependents);
		assert_eq!(plan.conflicts[0].conflicting_package.version().to_string(), "1.0.0");
	}

	#[test]
	fn install_conflict_reached_twice_is_recorded_once() {
		let source: MetaDB = vec![
			package("A", "1.0", &[("C", "[1.0]"), ("B", "1.0"), ("D", "1.0")]),
			package("B", "1.0", &[("C", "[2.0]")]),
			package("D", "1.0", &[("C", "[2.0]")]),
			package("C", "1.0", &[]),
			package("C", "2.0", &[]),
		].into();
		let local = MetaDB::new();
		let index = DependentsIndex::default();
		let root = source.find_package("A", &PackageVersion::new("1.0").unwrap()).unwrap().clone();
		let plan = InstallWalker::new(&local, &source, &index, None).resolve_operations(&root).unwrap();
		assert_eq!(plan.conflicts.len(), 1);
		assert_eq!(plan.conflicts[0].package.to_string(), "C 2.0.0");
	}
}
