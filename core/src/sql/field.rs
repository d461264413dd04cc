use crate::sql::fmt::Fmt;
use crate::sql::{Ident, Value};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter, Write};
use std::ops::Deref;

/// The projection list of a SELECT
#[derive(Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub struct Fields(pub Vec<Field>);

impl Deref for Fields {
	type Target = Vec<Field>;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl IntoIterator for Fields {
	type Item = Field;
	type IntoIter = std::vec::IntoIter<Self::Item>;
	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

impl Fields {
	/// Whether any projection is or contains an aggregate call
	pub fn has_aggregate(&self) -> bool {
		self.0.iter().any(|f| match f {
			Field::All => false,
			Field::Single {
				expr,
				..
			} => expr.has_aggregate(),
		})
	}
}

impl Display for Fields {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		Display::fmt(&Fmt::comma_separated(&self.0), f)
	}
}

/// A single projection
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub enum Field {
	/// The whole input row, `*`
	All,
	/// A single expression, with an optional output name
	Single {
		expr: Value,
		alias: Option<Ident>,
	},
}

impl Default for Field {
	fn default() -> Self {
		Self::All
	}
}

impl Field {
	/// The output column name for this projection
	pub fn output_name(&self) -> Option<String> {
		match self {
			Self::All => None,
			Self::Single {
				expr,
				alias,
			} => Some(match alias {
				Some(v) => v.to_raw(),
				None => expr.output_name(),
			}),
		}
	}
}

impl Display for Field {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match self {
			Self::All => f.write_char('*'),
			Self::Single {
				expr,
				alias,
			} => {
				Display::fmt(expr, f)?;
				if let Some(ref v) = alias {
					write!(f, " AS {v}")?;
				}
				Ok(())
			}
		}
	}
}
