//! Per-session record of which packages a walk has touched.

use std::collections::{BTreeMap, BTreeSet};

use crate::metadb::*;
use crate::metadb::package::*;
use super::DependentsResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitationState {
	/// On the current path of the walk.
	Processing,
	/// Fully walked.
	Completed,
}

#[derive(Debug, Clone)]
struct MarkedPackage {
	package: Package,
	state: VisitationState,
}

/// Visitation states and the reverse dependency index for a single planning session.
///
/// Lookups go by id first and then by version, matching how dependencies are declared.
#[derive(Debug, Default, Clone)]
pub struct Marker {
	visited: BTreeMap<String, BTreeMap<PackageVersion, MarkedPackage>>,
	dependents: BTreeMap<PackageIdentifier, BTreeSet<PackageIdentifier>>,
	processing: Vec<PackageIdentifier>,
}

impl Marker {
	pub fn new() -> Self {
		Default::default()
	}

	pub fn clear(&mut self) {
		self.visited.clear();
		self.dependents.clear();
		self.processing.clear();
	}

	fn get(&self, identifier: &PackageIdentifier) -> Option<&MarkedPackage> {
		self.visited.get(&identifier.id_key())?.get(&identifier.version)
	}

	fn state(&self, identifier: &PackageIdentifier) -> Option<VisitationState> {
		self.get(identifier).map(|m| m.state)
	}

	pub fn mark_processing(&mut self, package: &Package) {
		self.visited.entry(package.identifier.id_key())
			.or_default()
			.insert(package.version().clone(), MarkedPackage { package: package.clone(), state: VisitationState::Processing });
		self.processing.push(package.identifier.clone());
	}

	pub fn mark_visited(&mut self, package: &Package) {
		let marked = self.visited.entry(package.identifier.id_key())
			.or_default()
			.entry(package.version().clone())
			.or_insert_with(|| MarkedPackage { package: package.clone(), state: VisitationState::Completed });
		marked.state = VisitationState::Completed;

		if self.processing.last() == Some(&package.identifier) {
			self.processing.pop();
		} else {
			self.processing.retain(|p| p != &package.identifier);
		}
	}

	/// The package has been completely walked.
	pub fn is_visited(&self, identifier: &PackageIdentifier) -> bool {
		self.state(identifier) == Some(VisitationState::Completed)
	}

	/// This exact package is on the current path.
	pub fn is_cycle(&self, identifier: &PackageIdentifier) -> bool {
		self.state(identifier) == Some(VisitationState::Processing)
	}

	/// Any version of `id` is on the current path.
	pub fn is_version_cycle(&self, id: &str) -> bool {
		self.visited.get(&id_key(id))
			.map(|versions| versions.values().any(|m| m.state == VisitationState::Processing))
			.unwrap_or(false)
	}

	pub fn contains(&self, identifier: &PackageIdentifier) -> bool {
		self.get(identifier).is_some()
	}

	/// The first marked version of `id`.
	pub fn find_any_version(&self, id: &str) -> Option<&Package> {
		self.visited.get(&id_key(id))?.values().next().map(|m| &m.package)
	}

	/// Records that `package` depends on `dependency`.
	pub fn add_dependent(&mut self, package: &PackageIdentifier, dependency: &PackageIdentifier) {
		self.dependents.entry(dependency.clone()).or_default().insert(package.clone());
	}

	pub fn get_dependent_identifiers(&self, identifier: &PackageIdentifier) -> impl Iterator<Item = &PackageIdentifier> {
		self.dependents.get(identifier).into_iter().flatten()
	}

	/// Every recorded `(dependent, dependency)` edge.
	pub fn edges(&self) -> impl Iterator<Item = (&PackageIdentifier, &PackageIdentifier)> {
		self.dependents.iter().flat_map(|(dependency, dependents)| dependents.iter().map(move |d| (d, dependency)))
	}

	/// The packages currently being processed, outermost first.
	pub fn processing_chain(&self) -> &[PackageIdentifier] {
		&self.processing
	}
}

impl PackageRepository for Marker {
	fn get_packages(&self) -> Vec<&Package> {
		self.visited.values().flat_map(|versions| versions.values()).map(|m| &m.package).collect()
	}

	fn find_packages_by_id(&self, id: &str) -> Vec<&Package> {
		self.visited.get(&id_key(id))
			.map(|versions| versions.values().map(|m| &m.package).collect())
			.unwrap_or_default()
	}
}

impl DependentsResolver for Marker {
	fn get_dependents(&self, identifier: &PackageIdentifier) -> Vec<&Package> {
		self.get_dependent_identifiers(identifier)
			.filter_map(|d| self.get(d))
			.map(|m| &m.package)
			.collect()
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn package(id: &str, version: &str) -> Package {
		Package::new(PackageIdentifier::new(id, PackageVersion::new(version).unwrap()))
	}

	#[test]
	fn marker_states() {
		let mut marker = Marker::new();
		let a = package("A", "1.0");
		assert!(!marker.contains(&a.identifier));

		marker.mark_processing(&a);
		assert!(marker.is_cycle(&a.identifier));
		assert!(marker.is_version_cycle("a"));
		assert!(!marker.is_visited(&a.identifier));
		assert_eq!(marker.processing_chain(), &[a.identifier.clone()]);

		marker.mark_visited(&a);
		assert!(marker.is_visited(&a.identifier));
		assert!(!marker.is_cycle(&a.identifier));
		assert!(!marker.is_version_cycle("A"));
		assert!(marker.processing_chain().is_empty());
	}

	#[test]
	fn marker_version_cycle_spans_versions() {
		let mut marker = Marker::new();
		marker.mark_processing(&package("A", "1.0"));
		assert!(marker.is_version_cycle("A"));
		assert!(!marker.is_cycle(&package("A", "2.0").identifier));
	}

	#[test]
	fn marker_dependents() {
		let mut marker = Marker::new();
		let (a, b) = (package("A", "1.0"), package("B", "1.0"));
		marker.mark_processing(&a);
		marker.mark_processing(&b);
		marker.add_dependent(&a.identifier, &b.identifier);
		let dependents = marker.get_dependents(&b.identifier);
		assert_eq!(dependents, vec![&a]);
		assert!(marker.get_dependents(&a.identifier).is_empty());
	}

	#[test]
	fn marker_is_a_repository() {
		let mut marker = Marker::new();
		marker.mark_processing(&package("A", "1.0"));
		marker.mark_visited(&package("A", "2.0"));
		assert_eq!(marker.find_packages_by_id("a").len(), 2);
		assert_eq!(marker.find_any_version("A").map(|p| p.version().to_string()).as_deref(), Some("1.0.0"));
		assert!(marker.find_package("a", &PackageVersion::new("2.0").unwrap()).is_some());
		assert!(marker.find_package("A", &PackageVersion::new("3.0").unwrap()).is_none());
	}
}
