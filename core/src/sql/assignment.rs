use crate::sql::fmt::Fmt;
use crate::sql::{Ident, Value};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::ops::Deref;

/// A comma-separated list of `key = value` pairs, as written in the
/// WITH and SET clauses. Values must be foldable expressions.
#[derive(Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub struct Assignments(pub Vec<(Ident, Value)>);

impl Deref for Assignments {
	type Target = Vec<(Ident, Value)>;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl Assignments {
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl Display for Assignments {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		Display::fmt(
			&Fmt::comma_separated(
				self.0.iter().map(|args| Fmt::new(args, |(k, v), f| write!(f, "{k} = {v}"))),
			),
			f,
		)
	}
}
