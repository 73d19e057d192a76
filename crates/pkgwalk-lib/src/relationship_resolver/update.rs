use crate::metadb::*;
use crate::metadb::package::*;
use crate::operation::AcceptedTargets;
use super::*;

/// Plans moving an installed package to another version.
///
/// Works like [`InstallWalker`] except any installed version of a walked package is treated as a
/// conflict, so older versions are replaced instead of installed alongside.
pub struct UpdateWalker<'a> {
	inner: InstallWalker<'a>,
}

impl<'a> UpdateWalker<'a> {
	/// `update_dependencies` also walks the new version's dependencies, updating any that need it.
	pub fn new(
		local_repository: &'a dyn PackageRepository,
		source_repository: &'a dyn PackageRepository,
		dependents_resolver: &'a dyn DependentsResolver,
		target_platform: Option<TargetPlatform>,
		update_dependencies: bool,
	) -> Self {
		Self {
			inner: InstallWalker::new(local_repository, source_repository, dependents_resolver, target_platform)
				.ignore_dependencies(!update_dependencies),
		}
	}

	/// Applies the install options of `config`, see [`InstallWalker::configure()`].
	pub fn configure(mut self, config: &crate::Config) -> Self {
		self.inner = self.inner.configure(config);
		self
	}

	pub fn allow_prerelease(mut self, allow: bool) -> Self {
		self.inner = self.inner.allow_prerelease(allow);
		self
	}

	pub fn dependency_version(mut self, dependency_version: DependencyVersion) -> Self {
		self.inner = self.inner.dependency_version(dependency_version);
		self
	}

	pub fn constraint_provider(mut self, constraint_provider: &'a dyn ConstraintProvider) -> Self {
		self.inner = self.inner.constraint_provider(constraint_provider);
		self
	}

	pub fn accepted_targets(mut self, accepted_targets: AcceptedTargets) -> Self {
		self.inner = self.inner.accepted_targets(accepted_targets);
		self
	}

	pub fn platform_compatibility(mut self, compatibility: &'a dyn PlatformCompatibility) -> Self {
		self.inner = self.inner.platform_compatibility(compatibility);
		self
	}

	pub fn raise_error_on_cycle(mut self, raise: bool) -> Self {
		self.inner = self.inner.raise_error_on_cycle(raise);
		self
	}

	/// Plans updating to `package`.
	///
	/// # Errors
	/// The same as [`InstallWalker::resolve_operations()`].
	pub fn resolve_operations(&mut self, package: &Package) -> crate::Result<OperationPlan> {
		self.inner.reset();
		walk(self, package)?;
		Ok(self.inner.finish())
	}

	/// The highest installed version of `package`'s id other than `package` itself.
	fn installed_conflict(&self, package: &Package) -> Option<(Package, ConflictSource)> {
		self.inner.local_repository()
			.find_packages_by_id(package.id())
			.into_iter()
			.filter(|p| p.version() != package.version())
			.max()
			.map(|p| (p.clone(), ConflictSource::Installed))
	}
}

impl PackageWalker for UpdateWalker<'_> {
	fn settings(&self) -> &WalkSettings<'_> { self.inner.settings() }
	fn marker(&self) -> &Marker { self.inner.marker() }
	fn marker_mut(&mut self) -> &mut Marker { self.inner.marker_mut() }

	fn walk_info(&mut self) -> Option<&mut WalkInfo> {
		self.inner.walk_info()
	}

	fn resolve_dependency(&self, dependency: &PackageDependency) -> Option<Package> {
		self.inner.resolve_dependency(dependency)
	}

	fn on_before_package_walk(&mut self, package: &Package) -> crate::Result<bool> {
		let conflict = self.inner.session_conflict(package).or_else(|| self.installed_conflict(package));
		self.inner.handle_conflict(package, conflict)
	}

	fn on_dependency_resolve_error(&mut self, package: &Package, dependency: &PackageDependency) -> crate::Result<()> {
		self.inner.on_dependency_resolve_error(package, dependency)
	}

	fn on_cycle(&mut self, chain: String) {
		self.inner.on_cycle(chain)
	}

	fn on_after_package_walk(&mut self, package: &Package) -> crate::Result<()> {
		self.inner.on_after_package_walk(package)
	}
}
