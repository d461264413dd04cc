use crate::sql::{Kind, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A `CAST(expr AS TYPE)` conversion
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub struct Cast(pub Value, pub Kind);

impl fmt::Display for Cast {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "CAST({} AS {})", self.0, self.1)
	}
}
