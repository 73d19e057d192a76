//! Planned changes to an installation and the reduction of a raw operation trace into a final plan.

use std::collections::{HashMap, VecDeque};

use serde::{Serialize, Deserialize};

use crate::metadb::package::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PackageAction {
	Install,
	Uninstall,
}

impl PackageAction {
	pub fn opposite(self) -> Self {
		match self {
			PackageAction::Install => PackageAction::Uninstall,
			PackageAction::Uninstall => PackageAction::Install,
		}
	}
}

impl std::fmt::Display for PackageAction {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			PackageAction::Install => write!(f, "Install"),
			PackageAction::Uninstall => write!(f, "Uninstall"),
		}
	}
}

/// Where an operation is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationTarget {
	#[default] Project,
	Solution,
}

impl OperationTarget {
	/// The target a package's content goes to, without looking at what depends on it.
	pub fn for_kind(kind: Kind) -> Self {
		match kind {
			Kind::Tools => OperationTarget::Solution,
			Kind::Project | Kind::MetaPackage => OperationTarget::Project,
		}
	}
}

/// Which operation targets a planner emits operations for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AcceptedTargets {
	Project,
	Solution,
	#[default] All,
}

impl AcceptedTargets {
	pub fn accepts(self, target: OperationTarget) -> bool {
		match self {
			AcceptedTargets::All => true,
			AcceptedTargets::Project => target == OperationTarget::Project,
			AcceptedTargets::Solution => target == OperationTarget::Solution,
		}
	}
}

impl std::str::FromStr for AcceptedTargets {
	type Err = crate::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"project" => Ok(Self::Project),
			"solution" => Ok(Self::Solution),
			"all" => Ok(Self::All),
			_ => Err(crate::Error::Parse(format!("unknown targets \"{}\"", s))),
		}
	}
}

/// A planned install or uninstall of a single package.
///
/// Two operations are equal when they have the same action on the same package identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
	pub package: Package,
	pub action: PackageAction,
	#[serde(default)]
	pub target: OperationTarget,
}

impl Operation {
	pub fn new(package: Package, action: PackageAction, target: OperationTarget) -> Self {
		Self { package, action, target }
	}

	pub fn install(package: Package) -> Self {
		let target = OperationTarget::for_kind(package.kind);
		Self::new(package, PackageAction::Install, target)
	}

	pub fn uninstall(package: Package) -> Self {
		let target = OperationTarget::for_kind(package.kind);
		Self::new(package, PackageAction::Uninstall, target)
	}

	fn key(&self) -> (PackageAction, PackageIdentifier) {
		(self.action, self.package.identifier.clone())
	}

	fn opposing_key(&self) -> (PackageAction, PackageIdentifier) {
		(self.action.opposite(), self.package.identifier.clone())
	}
}

impl PartialEq for Operation {
	fn eq(&self, other: &Self) -> bool {
		self.action == other.action && self.package.identifier == other.package.identifier
	}
}

impl Eq for Operation {}

impl std::hash::Hash for Operation {
	fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
		self.action.hash(state);
		self.package.identifier.hash(state);
	}
}

impl std::fmt::Display for Operation {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{} {}", self.action, self.package.identifier)
	}
}

/// Reduces a raw trace of operations into the final plan.
///
/// # Process
/// 1. An install and an uninstall of the same package cancel each other out, one pair at a time.
/// 1. The remaining operations keep their original order, except for satellite packages.
/// Satellite uninstalls are moved to the front and satellite installs to the end, so localized
/// resources are never present without the runtime package they belong to.
///
/// Reducing an already reduced plan returns it unchanged.
pub fn reduce(operations: impl IntoIterator<Item = Operation>) -> Vec<Operation> {
	let operations = operations.into_iter().collect::<Vec<_>>();

	/* Remaining indices for each (action, package) in their original order */
	let mut lookup = HashMap::<(PackageAction, PackageIdentifier), VecDeque<usize>>::new();
	for (i, operation) in operations.iter().enumerate() {
		lookup.entry(operation.key()).or_default().push_back(i);
	}

	let mut cancelled = vec![false; operations.len()];
	for (i, operation) in operations.iter().enumerate() {
		if cancelled[i] { continue; }

		let opposing = lookup.get_mut(&operation.opposing_key()).and_then(|indices| indices.pop_front());
		if let Some(j) = opposing {
			cancelled[i] = true;
			cancelled[j] = true;
			if let Some(own) = lookup.get_mut(&operation.key()) {
				own.retain(|&k| k != i);
			}
		}
	}

	let survivors = operations.into_iter()
		.zip(cancelled)
		.filter(|(_, cancelled)| !cancelled)
		.map(|(operation, _)| operation)
		.collect::<Vec<_>>();

	let (satellites, mut reduced): (Vec<_>, Vec<_>) = survivors.into_iter().partition(|o| o.package.is_satellite_package());
	let (satellite_installs, satellite_uninstalls): (Vec<_>, Vec<_>) = satellites.into_iter().partition(|o| o.action == PackageAction::Install);

	reduced.splice(0..0, satellite_uninstalls);
	reduced.extend(satellite_installs);
	reduced
}
