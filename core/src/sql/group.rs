use crate::sql::fmt::Fmt;
use crate::sql::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::ops::Deref;

/// A GROUP BY clause: the list of grouping key expressions
#[derive(Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub struct Groups(pub Vec<Value>);

impl Deref for Groups {
	type Target = Vec<Value>;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl Display for Groups {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		write!(f, "GROUP BY {}", Fmt::comma_separated(self.0.iter()))
	}
}
