use crate::sql::fmt::Fmt;
use crate::sql::{Ident, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The names of the built-in aggregate functions
pub(crate) const AGGREGATES: &[&str] = &["count", "sum", "avg", "min", "max"];

/// A function call expression. `count(*)` is represented with the `star`
/// flag set and no arguments.
#[derive(Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub struct Function {
	pub name: Ident,
	pub args: Vec<Value>,
	pub star: bool,
}

impl Function {
	pub fn new(name: Ident, args: Vec<Value>) -> Self {
		Self {
			name,
			args,
			star: false,
		}
	}

	/// Whether this call is to an aggregate function
	pub fn is_aggregate(&self) -> bool {
		AGGREGATES.contains(&self.name.as_str())
	}

	/// Whether any aggregate call occurs in this call or its arguments
	pub fn has_aggregate(&self) -> bool {
		self.is_aggregate() || self.args.iter().any(|v| v.has_aggregate())
	}
}

impl fmt::Display for Function {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self.star {
			true => write!(f, "{}(*)", self.name),
			false => write!(f, "{}({})", self.name, Fmt::comma_separated(self.args.iter())),
		}
	}
}
