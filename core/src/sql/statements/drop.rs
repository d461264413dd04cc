use crate::sql::Ident;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// What kind of object a DROP statement removes
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub enum DropTarget {
	#[default]
	Source,
	Stream,
	Sink,
	State,
}

impl Display for DropTarget {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match self {
			Self::Source => f.write_str("SOURCE"),
			Self::Stream => f.write_str("STREAM"),
			Self::Sink => f.write_str("SINK"),
			Self::State => f.write_str("STATE"),
		}
	}
}

/// `DROP {SOURCE|STREAM|SINK|STATE} <name>`
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct DropStatement {
	pub target: DropTarget,
	pub name: Ident,
}

impl Display for DropStatement {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		write!(f, "DROP {} {}", self.target, self.name)
	}
}
