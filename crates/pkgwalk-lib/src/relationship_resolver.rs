//! Walks the dependency graph of packages to plan installs, uninstalls and updates.
//!
//! # Usage
//! 1. Build a [`DependentsIndex`] over the installed packages with a [`DependentsWalker`].
//! 1. Create the planner for the change, [`InstallWalker`], [`UninstallWalker`] or [`UpdateWalker`].
//! 1. Call `resolve_operations()` on the planner with the root package to get an [`OperationPlan`].
//! 1. Apply [`OperationPlan::operations`] in order, after checking any conflicts and warnings.
//!
//! [`PackageSorter`] orders a whole repository so dependencies come before their dependents.
//!
//! Every walker is a [`PackageWalker`], the traversal itself is done by [`walk()`] which calls back
//! into the walker's hooks.

use crate::metadb::*;
use crate::metadb::package::*;

mod marker;
pub use marker::Marker;
pub use marker::VisitationState;
mod walk_info;
pub use walk_info::WalkInfo;
mod dependency_graph;
pub use dependency_graph::DependencyGraph;
mod plan;
pub use plan::OperationPlan;
pub use plan::ConflictRecord;
pub use plan::ConflictSource;
pub use plan::ConflictReason;
pub use plan::PlanWarning;

mod sorter;
pub use sorter::PackageSorter;
mod dependents;
pub use dependents::DependentsResolver;
pub use dependents::DependentsWalker;
pub use dependents::DependentsIndex;
mod install;
pub use install::InstallWalker;
mod uninstall;
pub use uninstall::UninstallWalker;
mod update;
pub use update::UpdateWalker;

/// Which marker check is used to detect that a dependency closes a cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CycleCheck {
	/// The exact package is already being processed.
	Exact,
	/// The exact package, or any other version of it, is already being processed.
	#[default] ExactOrVersion,
}

/// Settings shared by every walker.
#[derive(Debug, Clone)]
pub struct WalkSettings<'a> {
	pub target_platform: Option<TargetPlatform>,
	pub platform_compatibility: &'a dyn PlatformCompatibility,
	pub ignore_dependencies: bool,
	/// Skip a dependency that can't be resolved and carry on with the rest, rather than
	/// failing the walk.
	pub skip_on_error: bool,
	pub raise_error_on_cycle: bool,
	pub allow_prerelease: bool,
	pub dependency_version: DependencyVersion,
	pub cycle_check: CycleCheck,
}

impl Default for WalkSettings<'_> {
	fn default() -> Self {
		Self {
			target_platform: None,
			platform_compatibility: &ExactPlatformMatch,
			ignore_dependencies: false,
			skip_on_error: false,
			raise_error_on_cycle: false,
			allow_prerelease: false,
			dependency_version: Default::default(),
			cycle_check: Default::default(),
		}
	}
}

/// The hooks [`walk()`] calls while traversing.
pub trait PackageWalker {
	fn settings(&self) -> &WalkSettings<'_>;
	fn marker(&self) -> &Marker;
	fn marker_mut(&mut self) -> &mut Marker;

	/// Walkers that track operation targets return their [`WalkInfo`].
	fn walk_info(&mut self) -> Option<&mut WalkInfo> {
		None
	}

	/// Resolves a dependency that couldn't be satisfied by a package already marked in this session.
	fn resolve_dependency(&self, dependency: &PackageDependency) -> Option<Package>;

	/// Called before `package` is marked, returning `false` skips it and everything beneath it.
	fn on_before_package_walk(&mut self, _package: &Package) -> crate::Result<bool> {
		Ok(true)
	}

	/// Called once a dependency of `package` is resolved, returning `false` skips walking it.
	fn on_after_resolve_dependency(&mut self, _package: &Package, _dependency: &Package) -> bool {
		true
	}

	fn on_dependency_resolve_error(&mut self, package: &Package, dependency: &PackageDependency) -> crate::Result<()>;

	/// Called for a dependency that closes a cycle, when cycles aren't raised as errors.
	fn on_cycle(&mut self, chain: String) {
		log::warn!("Skipping circular dependency {}", chain);
	}

	/// Called after `package` and its dependencies have been walked.
	fn on_after_package_walk(&mut self, _package: &Package) -> crate::Result<()> {
		Ok(())
	}
}

/// Walks `package` and its dependencies depth first, calling `walker`'s hooks along the way.
///
/// Packages already walked in the session are not walked again, and dependencies that lead back to
/// a package being processed are never followed, so this always terminates.
///
/// # Errors
/// Anything returned by the hooks, plus:
/// - [`CircularDependency`](crate::Error::CircularDependency) when a cycle is found and
/// [`WalkSettings::raise_error_on_cycle`] is set.
/// - [`UnresolvedDependency`](crate::Error::UnresolvedDependency) when a dependency can't be resolved,
/// the walker's hook accepts it and [`WalkSettings::skip_on_error`] isn't set.
/// - [`MixedDependencyTargets`](crate::Error::MixedDependencyTargets) from the walker's [`WalkInfo`].
pub fn walk<W: PackageWalker + ?Sized>(walker: &mut W, package: &Package) -> crate::Result<()> {
	if walker.marker().is_visited(&package.identifier) {
		process_walk_info(walker, package)?;
		return Ok(())
	}

	if walker.marker().is_cycle(&package.identifier) {
		let chain = cycle_chain(walker.marker(), package);
		if walker.settings().raise_error_on_cycle {
			return Err(crate::Error::CircularDependency(chain))
		}
		walker.on_cycle(chain);
		return Ok(())
	}

	if !walker.on_before_package_walk(package)? {
		log::debug!("Skipping {}", package);
		return Ok(())
	}

	log::trace!("Walking {}", package);
	walker.marker_mut().mark_processing(package);

	if !walker.settings().ignore_dependencies {
		let dependencies = {
			let settings = walker.settings();
			package.compatible_dependencies(settings.target_platform.as_ref(), settings.platform_compatibility)
				.into_iter()
				.cloned()
				.collect::<Vec<_>>()
		};

		for dependency in dependencies {
			let resolved = resolve_in_session(walker, &dependency).or_else(|| walker.resolve_dependency(&dependency));

			let Some(resolved) = resolved else {
				log::debug!("Unable to resolve {} for {}", dependency, package);
				walker.on_dependency_resolve_error(package, &dependency)?;
				if walker.settings().skip_on_error {
					continue
				}
				return Err(crate::Error::UnresolvedDependency { dependency: dependency.to_string(), constraint: None })
			};

			walker.marker_mut().add_dependent(&package.identifier, &resolved.identifier);

			if !walker.on_after_resolve_dependency(package, &resolved) {
				continue
			}

			if closes_cycle(walker, &resolved) {
				let chain = cycle_chain(walker.marker(), &resolved);
				if walker.settings().raise_error_on_cycle {
					return Err(crate::Error::CircularDependency(chain))
				}
				walker.on_cycle(chain);
				continue
			}

			if let Some(info) = walker.walk_info() {
				info.set_parent(&resolved.identifier, package);
			}
			walk(walker, &resolved)?;
		}
	}

	walker.marker_mut().mark_visited(package);
	process_walk_info(walker, package)?;
	walker.on_after_package_walk(package)
}

fn resolve_in_session<W: PackageWalker + ?Sized>(walker: &W, dependency: &PackageDependency) -> Option<Package> {
	let settings = walker.settings();
	resolve_dependency(
		dependency,
		walker.marker(),
		&NullConstraintProvider,
		settings.allow_prerelease,
		false,
		settings.dependency_version,
	).cloned()
}

fn closes_cycle<W: PackageWalker + ?Sized>(walker: &W, package: &Package) -> bool {
	let marker = walker.marker();
	match walker.settings().cycle_check {
		CycleCheck::Exact => marker.is_cycle(&package.identifier),
		CycleCheck::ExactOrVersion => marker.is_cycle(&package.identifier) || marker.is_version_cycle(package.id()),
	}
}

fn process_walk_info<W: PackageWalker + ?Sized>(walker: &mut W, package: &Package) -> crate::Result<()> {
	match walker.walk_info() {
		Some(info) => info.process(package),
		None => Ok(()),
	}
}

/// `A 1.0.0 => B 1.0.0 => A 1.0.0`, from the first occurrence of `package` on the current path.
fn cycle_chain(marker: &Marker, package: &Package) -> String {
	let chain = marker.processing_chain();
	let start = chain.iter().position(|p| p.same_id(&package.identifier)).unwrap_or(0);
	chain[start..].iter()
		.chain(std::iter::once(&package.identifier))
		.map(|p| p.to_string())
		.collect::<Vec<_>>()
		.join(" => ")
}
