use crate::sql::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// A HAVING clause, evaluated once per group
#[derive(Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub struct Having(pub Value);

impl Deref for Having {
	type Target = Value;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl fmt::Display for Having {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "HAVING {}", self.0)
	}
}
