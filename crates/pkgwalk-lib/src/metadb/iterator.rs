use super::package::*;

pub struct VersionMatches<'a, 'r, I>
where
	I: Iterator<Item = &'a Package>,
{
	range: &'r VersionRange,
	underlying: I,
}

impl<'a, 'r, I> Iterator for VersionMatches<'a, 'r, I>
where
	I: Iterator<Item = &'a Package>,
{
	type Item = I::Item;

	fn next(&mut self) -> Option<Self::Item> {
		self.underlying.by_ref().find(|package| self.range.satisfies(package.version()))
	}
}

pub trait VersionMatchesExt<'a>: Iterator<Item = &'a Package>
{
	/// Filters the iterator to packages with a version inside `range`
	fn version_matches(self, range: &VersionRange) -> VersionMatches<'a, '_, Self>
	where
		Self: Sized,
	{
		VersionMatches { underlying: self, range }
	}
}

impl<'a, I: Iterator<Item = &'a Package>> VersionMatchesExt<'a> for I {}
