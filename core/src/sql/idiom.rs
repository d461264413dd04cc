use crate::sql::{Ident, Part};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// A column reference: a field path, optionally qualified with the name of
/// the input stream it reads from, as in `alias:field.sub[0]`.
#[derive(Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub struct Idiom {
	/// The input alias this column reads from, if qualified
	pub input: Option<Ident>,
	/// The path into the input record. The first part is always a field.
	pub parts: Vec<Part>,
}

impl Idiom {
	pub fn new(input: Option<Ident>, parts: Vec<Part>) -> Self {
		Self {
			input,
			parts,
		}
	}

	/// The name this column contributes to a projection when no alias
	/// is given: the last named step of the path.
	pub fn simple_name(&self) -> Option<String> {
		self.parts.iter().rev().find_map(|p| match p {
			Part::Field(v) => Some(v.to_raw()),
			Part::Key(v) => Some(v.0.clone()),
			Part::Descend(v) => Some(v.to_raw()),
			_ => None,
		})
	}

	/// Whether the path uses the descendant accessor anywhere
	pub fn is_descending(&self) -> bool {
		self.parts.iter().any(|p| matches!(p, Part::Descend(_)))
	}
}

impl Display for Idiom {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		if let Some(ref v) = self.input {
			write!(f, "{v}:")?;
		}
		for (i, p) in self.parts.iter().enumerate() {
			// The leading field is written without its dot
			match (i, p) {
				(0, Part::Field(v)) => write!(f, "{v}")?,
				_ => write!(f, "{p}")?,
			}
		}
		Ok(())
	}
}
