use crate::sql::{Assignments, Ident};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// What kind of object an UPDATE statement addresses
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub enum UpdateTarget {
	#[default]
	State,
	Source,
	Sink,
}

impl Display for UpdateTarget {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match self {
			Self::State => f.write_str("STATE"),
			Self::Source => f.write_str("SOURCE"),
			Self::Sink => f.write_str("SINK"),
		}
	}
}

/// `UPDATE {STATE|SOURCE|SINK} <name> SET k = v, ...`
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct UpdateStatement {
	pub target: UpdateTarget,
	pub name: Ident,
	pub params: Assignments,
}

impl Display for UpdateStatement {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		write!(f, "UPDATE {} {} SET {}", self.target, self.name, self.params)
	}
}
