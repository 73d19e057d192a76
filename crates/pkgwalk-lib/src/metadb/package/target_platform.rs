use serde::*;

/// An opaque name for the platform a package is installed for, e.g. `net45` or `linux-x64`.
///
/// The planner never looks inside the name, compatibility questions go to a [`PlatformCompatibility`] implementation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetPlatform(String);

impl TargetPlatform {
	pub fn new(name: impl Into<String>) -> Self {
		Self(name.into())
	}

	pub fn name(&self) -> &str {
		&self.0
	}
}

impl PartialEq for TargetPlatform {
	fn eq(&self, other: &Self) -> bool {
		self.0.to_lowercase() == other.0.to_lowercase()
	}
}

impl Eq for TargetPlatform {}

impl std::hash::Hash for TargetPlatform {
	fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
		self.0.to_lowercase().hash(state);
	}
}

impl std::fmt::Display for TargetPlatform {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<&str> for TargetPlatform {
	fn from(value: &str) -> Self { Self::new(value) }
}

/// Decides whether packages built for one platform can be used on another.
pub trait PlatformCompatibility: std::fmt::Debug {
	/// `true` if something built for `candidate` can be installed into `target`.
	fn is_compatible(&self, target: &TargetPlatform, candidate: &TargetPlatform) -> bool;
}

/// Only identical platform names are compatible.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactPlatformMatch;

impl PlatformCompatibility for ExactPlatformMatch {
	fn is_compatible(&self, target: &TargetPlatform, candidate: &TargetPlatform) -> bool {
		target == candidate
	}
}
