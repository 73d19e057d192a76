use serde::*;
use try_map::FallibleMapExt;

/// The version of a package.
///
/// # Format
/// Package versions follow the format `MAJOR[.MINOR[.BUILD[.REVISION]]][-LABEL]`.
/// - Missing numeric components are `0`, so `1.2` and `1.2.0.0` are the same version.
/// - `LABEL` marks a prerelease and is compared case-insensitively.
///
/// # Eq & Ord
/// The numeric components are compared first. At the same numeric version a release
/// sorts *after* any prerelease, so `1.0.0-alpha < 1.0.0`. Two labels compare ordinally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageVersion {
	major: u32,
	minor: u32,
	build: u32,
	revision: u32,
	special: Option<String>,
}

impl PackageVersion {
	/// Create a new [`PackageVersion`] from a version string.
	///
	/// # Errors
	/// This function will return a [`Parse`](crate::Error::Parse) error in the following cases.
	/// - Input is empty or has more than four numeric components.
	/// - A numeric component can't be parsed as an integer.
	/// - The prerelease label is empty or contains characters other than ASCII alphanumerics, `-` and `.`.
	pub fn new(s: impl AsRef<str>) -> crate::Result<Self> {
		use crate::Error::Parse;
		let s = s.as_ref().trim();

		let (numeric, special) = match s.split_once('-') {
			Some((numeric, special)) => (numeric, Some(special)),
			None => (s, None),
		};

		if let Some(special) = special {
			if special.is_empty() || !special.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.') {
				return Err(Parse(format!("invalid prerelease label in version \"{}\"", s)))
			}
		}

		let components = numeric.split('.').collect::<Vec<_>>();
		if numeric.is_empty() || components.len() > 4 { return Err(Parse(format!("too many/few version components in \"{}\"", s))) }

		let component = |v: &&str| v.parse::<u32>().map_err(|_| Parse(format!("version component \"{}\" can't be parsed", v)));

		#[allow(clippy::get_first)]
		let major = components.get(0).try_map(component)?.unwrap_or(0);
		let minor = components.get(1).try_map(component)?.unwrap_or(0);
		let build = components.get(2).try_map(component)?.unwrap_or(0);
		let revision = components.get(3).try_map(component)?.unwrap_or(0);

		Ok(PackageVersion {
			major,
			minor,
			build,
			revision,
			special: special.map(str::to_owned),
		})
	}

	pub fn from_parts(major: u32, minor: u32, build: u32, revision: u32) -> Self {
		Self { major, minor, build, revision, special: None }
	}

	pub fn major(&self) -> u32 { self.major }
	pub fn minor(&self) -> u32 { self.minor }
	pub fn build(&self) -> u32 { self.build }
	pub fn revision(&self) -> u32 { self.revision }
	pub fn special(&self) -> Option<&str> { self.special.as_deref() }

	pub fn is_prerelease(&self) -> bool {
		self.special.is_some()
	}

	fn numeric(&self) -> (u32, u32, u32, u32) {
		(self.major, self.minor, self.build, self.revision)
	}

	fn special_key(&self) -> Option<String> {
		self.special.as_ref().map(|s| s.to_lowercase())
	}
}

impl TryFrom<String> for PackageVersion {
	type Error = crate::Error;
	fn try_from(value: String) -> Result<Self, Self::Error> { Self::new(value) }
}

impl TryFrom<&str> for PackageVersion {
	type Error = crate::Error;
	fn try_from(value: &str) -> Result<Self, Self::Error> { Self::new(value) }
}

impl std::str::FromStr for PackageVersion {
	type Err = crate::Error;
	fn from_str(s: &str) -> Result<Self, Self::Err> { Self::new(s) }
}

impl From<PackageVersion> for String {
	fn from(value: PackageVersion) -> Self { value.to_string() }
}

impl PartialEq for PackageVersion {
	fn eq(&self, other: &Self) -> bool {
		self.numeric() == other.numeric() &&
		self.special_key() == other.special_key()
	}
}

impl Eq for PackageVersion {}

impl Ord for PackageVersion {
	fn cmp(&self, other: &Self) -> std::cmp::Ordering {
		use std::cmp::Ordering;

		match self.numeric().cmp(&other.numeric()) {
			Ordering::Equal => {},
			ord => return ord,
		}

		/* A missing label is a release which is newer than any prerelease of the same numeric version. */
		match (self.special_key(), other.special_key()) {
			(None, None) => Ordering::Equal,
			(None, Some(_)) => Ordering::Greater,
			(Some(_), None) => Ordering::Less,
			(Some(lhs), Some(rhs)) => lhs.cmp(&rhs),
		}
	}
}

impl PartialOrd for PackageVersion {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}

impl std::hash::Hash for PackageVersion {
	fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
		self.numeric().hash(state);
		self.special_key().hash(state);
	}
}

impl std::fmt::Display for PackageVersion {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}.{}.{}", self.major, self.minor, self.build)?;
		if self.revision != 0 {
			write!(f, ".{}", self.revision)?;
		}
		if let Some(special) = &self.special {
			write!(f, "-{}", special)?;
		}
		Ok(())
	}
}
