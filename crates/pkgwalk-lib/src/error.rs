//! Library error type.

pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

use crate::metadb::package::PackageIdentifier;

#[derive(Debug, Error)]
pub enum Error {
	#[error("IO error: {0}")]
	IO(#[from] std::io::Error),
	#[error("JSON error: {0}")]
	SerdeJSON(#[from] serde_json::Error),
	#[error("parsing error: {0}")]
	Parse(String),
	/// No package satisfies a dependency that the walk can't continue without.
	///
	/// `constraint` carries a pretty printed pin and its source when a constraint provider narrowed the candidates.
	#[error("unable to resolve dependency '{dependency}'{}", format_constraint(.constraint))]
	UnresolvedDependency {
		dependency: String,
		constraint: Option<(String, String)>,
	},
	/// A dependency chain came back to a package that is still being walked.
	#[error("circular dependency detected '{0}'")]
	CircularDependency(String),
	/// Removing `package` would break the listed packages.
	#[error("unable to uninstall '{package}' because {} depend(s) on it", format_identifiers(.dependents))]
	HasDependents {
		package: PackageIdentifier,
		dependents: Vec<PackageIdentifier>,
	},
	/// A dependency only package pulled in both project and solution level packages.
	#[error("dependency only package '{0}' can't mix project and solution level dependencies")]
	MixedDependencyTargets(PackageIdentifier),
}

pub(crate) fn format_identifiers(identifiers: &[PackageIdentifier]) -> String {
	identifiers.iter().map(|i| format!("'{}'", i)).collect::<Vec<_>>().join(", ")
}

fn format_constraint(constraint: &Option<(String, String)>) -> String {
	match constraint {
		Some((range, source)) => format!(", additional constraint '{}' defined in {}", range, source),
		None => String::new(),
	}
}
