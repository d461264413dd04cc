use crate::sql::{Ident, Strand};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of a field path expression
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub enum Part {
	/// A plain field access, `.name`
	Field(Ident),
	/// A quoted field access, `."some key"`
	Key(Strand),
	/// An array element access, `[0]`
	Index(i64),
	/// An array slice, `[i:j]` with either bound optional
	Slice(Option<i64>, Option<i64>),
	/// The descendant accessor, `..name`, collecting every value found
	/// under the given key at any depth. Only legal for reads.
	Descend(Ident),
}

impl From<Ident> for Part {
	fn from(v: Ident) -> Self {
		Self::Field(v)
	}
}

impl From<&str> for Part {
	fn from(v: &str) -> Self {
		Self::Field(v.into())
	}
}

impl From<i64> for Part {
	fn from(v: i64) -> Self {
		Self::Index(v)
	}
}

impl fmt::Display for Part {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Part::Field(v) => write!(f, ".{v}"),
			Part::Key(v) => write!(f, ".{v}"),
			Part::Index(v) => write!(f, "[{v}]"),
			Part::Slice(from, to) => {
				f.write_str("[")?;
				if let Some(v) = from {
					write!(f, "{v}")?;
				}
				f.write_str(":")?;
				if let Some(v) = to {
					write!(f, "{v}")?;
				}
				f.write_str("]")
			}
			Part::Descend(v) => write!(f, "..{v}"),
		}
	}
}
