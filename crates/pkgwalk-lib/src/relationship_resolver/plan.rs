use serde::{Serialize, Deserialize};

use crate::metadb::package::*;
use crate::operation::Operation;
use crate::error::format_identifiers;

/// Where a conflicting package was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictSource {
	/// Chosen earlier in the same planning session.
	Session,
	/// Already installed.
	Installed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictReason {
	/// Packages depending on the conflicting package don't accept the requested version.
	IncompatibleDependents,
	/// The requested version is older than the conflicting one.
	Downgrade,
}

/// A package that couldn't be planned because another version of it is already committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictRecord {
	/// The package that was requested.
	pub package: PackageIdentifier,
	pub conflicting_package: Package,
	pub source: ConflictSource,
	pub reason: ConflictReason,
	/// Everything depending on `conflicting_package` in `source`.
	pub dependents: Vec<PackageIdentifier>,
	/// The dependents that would break.
	pub incompatible_dependents: Vec<PackageIdentifier>,
}

impl std::fmt::Display for ConflictRecord {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self.reason {
			ConflictReason::IncompatibleDependents => write!(f,
				"unable to use '{}', '{}' is required by {}",
				self.package, self.conflicting_package.identifier, format_identifiers(&self.incompatible_dependents)
			),
			ConflictReason::Downgrade => write!(f,
				"unable to use '{}', a newer version '{}' is already in use",
				self.package, self.conflicting_package.identifier
			),
		}
	}
}

/// A failure that was tolerated while planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanWarning {
	/// A dependency of `package` couldn't be found and was skipped.
	UnresolvedDependency { package: PackageIdentifier, dependency: String },
	/// A dependency cycle was skipped.
	CircularDependency(String),
	/// `package` was removed even though `dependents` still depend on it.
	BrokenDependents { package: PackageIdentifier, dependents: Vec<PackageIdentifier> },
	/// `package` was kept because `dependents` still depend on it.
	KeptForDependents { package: PackageIdentifier, dependents: Vec<PackageIdentifier> },
}

impl std::fmt::Display for PlanWarning {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			PlanWarning::UnresolvedDependency { package, dependency } => write!(f, "unable to resolve dependency '{}' of '{}'", dependency, package),
			PlanWarning::CircularDependency(chain) => write!(f, "circular dependency detected '{}'", chain),
			PlanWarning::BrokenDependents { package, dependents } => write!(f, "removing '{}' breaks {}", package, format_identifiers(dependents)),
			PlanWarning::KeptForDependents { package, dependents } => write!(f, "'{}' was not removed, it is required by {}", package, format_identifiers(dependents)),
		}
	}
}

/// The result of planning a change.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct OperationPlan {
	/// Operations in the order they should be applied.
	pub operations: Vec<Operation>,
	pub conflicts: Vec<ConflictRecord>,
	pub warnings: Vec<PlanWarning>,
}

impl OperationPlan {
	/// The plan can be applied as is.
	pub fn is_clean(&self) -> bool {
		self.conflicts.is_empty()
	}
}
