use std::collections::BTreeMap;

use super::package::*;

/// Externally configured version pins that are layered on top of the ranges packages declare.
pub trait ConstraintProvider: std::fmt::Debug {
	/// Where the constraints came from, shown to users when a pin blocks a dependency.
	fn source(&self) -> &str;

	fn get_constraint(&self, id: &str) -> Option<VersionRange>;
}

/// Provides no constraints.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullConstraintProvider;

impl ConstraintProvider for NullConstraintProvider {
	fn source(&self) -> &str {
		""
	}

	fn get_constraint(&self, _id: &str) -> Option<VersionRange> {
		None
	}
}

/// A map of package id to pinned range.
#[derive(Debug, Clone, Default)]
pub struct DefaultConstraintProvider {
	source: String,
	constraints: BTreeMap<String, VersionRange>,
}

impl DefaultConstraintProvider {
	pub fn new(source: impl Into<String>) -> Self {
		Self { source: source.into(), constraints: Default::default() }
	}

	/// Pins `id` to `range`, replacing any existing pin.
	pub fn add_constraint(&mut self, id: &str, range: VersionRange) {
		self.constraints.insert(id_key(id), range);
	}

	pub fn with_constraints<'a>(mut self, constraints: impl IntoIterator<Item = (&'a String, &'a VersionRange)>) -> Self {
		for (id, range) in constraints {
			self.add_constraint(id, range.clone());
		}
		self
	}
}

impl ConstraintProvider for DefaultConstraintProvider {
	fn source(&self) -> &str {
		&self.source
	}

	fn get_constraint(&self, id: &str) -> Option<VersionRange> {
		self.constraints.get(&id_key(id)).cloned()
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn default_constraint_provider_is_case_insensitive() {
		let mut provider = DefaultConstraintProvider::new("packages.config");
		provider.add_constraint("Json", VersionRange::parse("[1.0,2.0)").unwrap());
		assert_eq!(provider.get_constraint("JSON"), Some(VersionRange::parse("[1.0,2.0)").unwrap()));
		assert_eq!(provider.get_constraint("Other"), None);
	}
}
