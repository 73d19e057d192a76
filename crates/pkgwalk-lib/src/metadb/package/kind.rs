use serde::*;

/// The type of a package, decides where its operations are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
	/// A normal package with content for the project.
	#[default] Project,
	/// Only carries solution level content such as build tools.
	Tools,
	/// Has no content of its own, only relationships to other packages.
	MetaPackage,
}
