use std::ops::Bound;

use serde::{Serialize, Deserialize};

use super::PackageVersion;

/// A range of package versions.
///
/// Each side is independently inclusive, exclusive or absent. A range with neither side matches everything.
///
/// # Notation
/// Ranges read and write the interval notation used in package manifests:
///
/// | Notation | Meaning |
/// |---|---|
/// | `1.0` | `1.0 <= x` |
/// | `[1.0]` | `x == 1.0` |
/// | `(1.0,)` | `1.0 < x` |
/// | `(,1.0]` | `x <= 1.0` |
/// | `[1.0,2.0)` | `1.0 <= x < 2.0` |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionRange {
	min: Bound<PackageVersion>,
	max: Bound<PackageVersion>,
}

impl Default for VersionRange {
	fn default() -> Self {
		Self::any()
	}
}

impl VersionRange {
	pub fn new(min: Bound<PackageVersion>, max: Bound<PackageVersion>) -> Self {
		Self { min, max }
	}

	/// Matches every version.
	pub fn any() -> Self {
		Self { min: Bound::Unbounded, max: Bound::Unbounded }
	}

	/// Matches only `version`.
	pub fn exact(version: PackageVersion) -> Self {
		Self { min: Bound::Included(version.clone()), max: Bound::Included(version) }
	}

	/// Matches `version` and anything above it.
	pub fn at_least(version: PackageVersion) -> Self {
		Self { min: Bound::Included(version), max: Bound::Unbounded }
	}

	/// Parses a range in interval notation, see [`VersionRange`].
	///
	/// # Errors
	/// - [`Parse`](crate::Error::Parse) when the brackets are unbalanced, there are too many
	/// components, the range is empty (e.g. `(1.0)` or `[2.0,1.0]`) or a version can't be parsed.
	pub fn parse(s: impl AsRef<str>) -> crate::Result<Self> {
		use crate::Error::Parse;
		let s = s.as_ref().trim();
		if s.is_empty() { return Err(Parse("empty version range".into())) }

		let first = s.chars().next().unwrap_or_default();
		if first != '[' && first != '(' {
			/* A bare version is a minimum */
			return Ok(Self::at_least(PackageVersion::new(s)?))
		}

		let last = s.chars().last().unwrap_or_default();
		if s.len() < 3 || (last != ']' && last != ')') {
			return Err(Parse(format!("unbalanced version range \"{}\"", s)))
		}

		let min_inclusive = first == '[';
		let max_inclusive = last == ']';
		let inner = &s[1..s.len() - 1];
		let parts = inner.split(',').map(str::trim).collect::<Vec<_>>();

		let range = match parts.as_slice() {
			[exact] => {
				if !(min_inclusive && max_inclusive) || exact.is_empty() {
					return Err(Parse(format!("exact version range \"{}\" must use []", s)))
				}
				Self::exact(PackageVersion::new(exact)?)
			},
			[min, max] => {
				let bound = |v: &str, inclusive: bool| -> crate::Result<Bound<PackageVersion>> {
					if v.is_empty() {
						Ok(Bound::Unbounded)
					} else if inclusive {
						Ok(Bound::Included(PackageVersion::new(v)?))
					} else {
						Ok(Bound::Excluded(PackageVersion::new(v)?))
					}
				};
				Self::new(bound(*min, min_inclusive)?, bound(*max, max_inclusive)?)
			},
			_ => return Err(Parse(format!("too many components in version range \"{}\"", s))),
		};

		if range.is_empty() {
			return Err(Parse(format!("version range \"{}\" can't match any version", s)))
		}

		Ok(range)
	}

	pub fn min(&self) -> Bound<&PackageVersion> {
		self.min.as_ref()
	}

	pub fn max(&self) -> Bound<&PackageVersion> {
		self.max.as_ref()
	}

	/// `true` if both sides of the range are the same inclusive version.
	pub fn is_exact(&self) -> bool {
		matches!((&self.min, &self.max), (Bound::Included(a), Bound::Included(b)) if a == b)
	}

	/// Checks if `version` falls within the range.
	pub fn satisfies(&self, version: &PackageVersion) -> bool {
		let above_min = match &self.min {
			Bound::Unbounded => true,
			Bound::Included(min) => version >= min,
			Bound::Excluded(min) => version > min,
		};
		let below_max = match &self.max {
			Bound::Unbounded => true,
			Bound::Included(max) => version <= max,
			Bound::Excluded(max) => version < max,
		};
		above_min && below_max
	}

	/// `true` when no version can satisfy the range.
	pub fn is_empty(&self) -> bool {
		match (&self.min, &self.max) {
			(Bound::Included(min), Bound::Included(max)) => min > max,
			(Bound::Included(min), Bound::Excluded(max))
			| (Bound::Excluded(min), Bound::Included(max))
			| (Bound::Excluded(min), Bound::Excluded(max)) => min >= max,
			_ => false,
		}
	}

	/// Gets the intersection between the ranges, if no intersection exists returns `None`
	pub fn intersect(&self, other: &Self) -> Option<Self> {
		fn tighter_min(a: &Bound<PackageVersion>, b: &Bound<PackageVersion>) -> Bound<PackageVersion> {
			match (a, b) {
				(Bound::Unbounded, x) | (x, Bound::Unbounded) => x.clone(),
				(Bound::Included(x), Bound::Included(y)) => Bound::Included(std::cmp::max(x, y).clone()),
				(Bound::Excluded(x), Bound::Excluded(y)) => Bound::Excluded(std::cmp::max(x, y).clone()),
				(Bound::Included(i), Bound::Excluded(e)) | (Bound::Excluded(e), Bound::Included(i)) => {
					if i > e { Bound::Included(i.clone()) } else { Bound::Excluded(e.clone()) }
				},
			}
		}

		fn tighter_max(a: &Bound<PackageVersion>, b: &Bound<PackageVersion>) -> Bound<PackageVersion> {
			match (a, b) {
				(Bound::Unbounded, x) | (x, Bound::Unbounded) => x.clone(),
				(Bound::Included(x), Bound::Included(y)) => Bound::Included(std::cmp::min(x, y).clone()),
				(Bound::Excluded(x), Bound::Excluded(y)) => Bound::Excluded(std::cmp::min(x, y).clone()),
				(Bound::Included(i), Bound::Excluded(e)) | (Bound::Excluded(e), Bound::Included(i)) => {
					if i < e { Bound::Included(i.clone()) } else { Bound::Excluded(e.clone()) }
				},
			}
		}

		let range = Self::new(tighter_min(&self.min, &other.min), tighter_max(&self.max, &other.max));
		if range.is_empty() { None } else { Some(range) }
	}
}

impl TryFrom<String> for VersionRange {
	type Error = crate::Error;
	fn try_from(value: String) -> Result<Self, Self::Error> { Self::parse(value) }
}

impl TryFrom<&str> for VersionRange {
	type Error = crate::Error;
	fn try_from(value: &str) -> Result<Self, Self::Error> { Self::parse(value) }
}

impl std::str::FromStr for VersionRange {
	type Err = crate::Error;
	fn from_str(s: &str) -> Result<Self, Self::Err> { Self::parse(s) }
}

impl From<VersionRange> for String {
	fn from(value: VersionRange) -> Self { value.to_string() }
}

impl std::fmt::Display for VersionRange {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if self.is_exact() {
			if let Bound::Included(v) = &self.min {
				return write!(f, "[{}]", v)
			}
		}

		match &self.min {
			Bound::Included(min) if matches!(self.max, Bound::Unbounded) => write!(f, "{}", min),
			_ => {
				match &self.min {
					Bound::Unbounded => write!(f, "(,")?,
					Bound::Included(min) => write!(f, "[{},", min)?,
					Bound::Excluded(min) => write!(f, "({},", min)?,
				}
				match &self.max {
					Bound::Unbounded => write!(f, ")"),
					Bound::Included(max) => write!(f, "{}]", max),
					Bound::Excluded(max) => write!(f, "{})", max),
				}
			},
		}
	}
}
