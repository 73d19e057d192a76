use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Serialize, Deserialize};

use crate::metadb::DependencyVersion;
use crate::metadb::DefaultConstraintProvider;
use crate::metadb::package::*;
use crate::operation::AcceptedTargets;

/// Defaults used by the planners.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	target_platform: Option<TargetPlatform>,
	allow_prerelease: bool,
	dependency_version: DependencyVersion,
	ignore_dependencies: bool,
	remove_dependencies: bool,
	force_remove: bool,
	raise_error_on_cycle: bool,
	accepted_targets: AcceptedTargets,
	/// Package id to the range it is pinned to.
	constraints: BTreeMap<String, VersionRange>,
}

impl Config {
	/// `$PKGWALK_CONFIG` if set, otherwise `pkgwalk/config.json` in the user's config directory.
	pub fn default_path() -> Option<PathBuf> {
		if let Ok(path) = std::env::var("PKGWALK_CONFIG") {
			return Some(PathBuf::from(path))
		}

		#[cfg(target_os = "windows")]
		let path = std::env::var("APPDATA").ok().map(PathBuf::from);

		#[cfg(not(target_os = "windows"))]
		let path = if let Ok(e) = std::env::var("XDG_CONFIG_HOME") {
			Some(PathBuf::from(e))
		} else {
			std::env::var("HOME").ok().map(|home| PathBuf::from(home).join(".config"))
		};

		path.map(|p| p.join("pkgwalk").join("config.json"))
	}

	/// Loads the config from [`Config::default_path()`].
	///
	/// # Errors
	/// - [`IO`](crate::Error::IO) when there is no config path or the file can't be read.
	/// - [`SerdeJSON`](crate::Error::SerdeJSON) when the file isn't a valid config.
	pub fn load_from_disk() -> crate::Result<Self> {
		let path = Self::default_path()
			.ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no config directory"))?;
		Self::load_from_file(path)
	}

	pub fn load_from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
		let path = path.as_ref();
		log::debug!("Loading config from {}", path.display());
		let file = std::fs::File::open(path)?;
		Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
	}

	pub fn save_to_file(&self, path: impl AsRef<Path>) -> crate::Result<()> {
		let path = path.as_ref();
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		let file = std::fs::File::create(path)?;
		serde_json::to_writer_pretty(file, self)?;
		Ok(())
	}

	pub fn target_platform(&self) -> Option<&TargetPlatform> {
		self.target_platform.as_ref()
	}
	pub fn set_target_platform(&mut self, target_platform: Option<TargetPlatform>) {
		self.target_platform = target_platform;
	}

	pub fn allow_prerelease(&self) -> bool {
		self.allow_prerelease
	}
	pub fn set_allow_prerelease(&mut self, allow_prerelease: bool) {
		self.allow_prerelease = allow_prerelease;
	}

	pub fn dependency_version(&self) -> DependencyVersion {
		self.dependency_version
	}
	pub fn set_dependency_version(&mut self, dependency_version: DependencyVersion) {
		self.dependency_version = dependency_version;
	}

	pub fn ignore_dependencies(&self) -> bool {
		self.ignore_dependencies
	}
	pub fn set_ignore_dependencies(&mut self, ignore_dependencies: bool) {
		self.ignore_dependencies = ignore_dependencies;
	}

	/// Uninstalls also remove dependencies nothing else needs.
	pub fn remove_dependencies(&self) -> bool {
		self.remove_dependencies
	}
	pub fn set_remove_dependencies(&mut self, remove_dependencies: bool) {
		self.remove_dependencies = remove_dependencies;
	}

	/// Uninstalls go ahead even when other packages depend on what is removed.
	pub fn force_remove(&self) -> bool {
		self.force_remove
	}
	pub fn set_force_remove(&mut self, force_remove: bool) {
		self.force_remove = force_remove;
	}

	pub fn raise_error_on_cycle(&self) -> bool {
		self.raise_error_on_cycle
	}
	pub fn set_raise_error_on_cycle(&mut self, raise_error_on_cycle: bool) {
		self.raise_error_on_cycle = raise_error_on_cycle;
	}

	pub fn accepted_targets(&self) -> AcceptedTargets {
		self.accepted_targets
	}
	pub fn set_accepted_targets(&mut self, accepted_targets: AcceptedTargets) {
		self.accepted_targets = accepted_targets;
	}

	pub fn constraints(&self) -> &BTreeMap<String, VersionRange> {
		&self.constraints
	}
	/// Pins `id` to `range`, returning the previous pin.
	pub fn add_constraint(&mut self, id: impl Into<String>, range: VersionRange) -> Option<VersionRange> {
		self.constraints.insert(id.into(), range)
	}
	pub fn remove_constraint(&mut self, id: &str) -> Option<VersionRange> {
		self.constraints.remove(id)
	}

	/// The pins as a constraint provider named after the config.
	pub fn constraint_provider(&self) -> DefaultConstraintProvider {
		DefaultConstraintProvider::new("config").with_constraints(&self.constraints)
	}
}
