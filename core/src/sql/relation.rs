use crate::sql::{Function, Ident, Window};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// The backpressure behaviour requested for an input pipe
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub enum DropHint {
	Wait,
	DropOldest,
	DropNewest,
}

impl Display for DropHint {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match self {
			Self::Wait => f.write_str("WAIT IF FULL"),
			Self::DropOldest => f.write_str("DROP OLDEST IF FULL"),
			Self::DropNewest => f.write_str("DROP NEWEST IF FULL"),
		}
	}
}

/// Where a FROM relation takes its tuples from
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub enum RelationSource {
	/// An existing stream, source or box in the topology
	Stream(Ident),
	/// A user-defined stream function, instantiated for this SELECT
	Udsf(Function),
}

impl Display for RelationSource {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match self {
			Self::Stream(v) => Display::fmt(v, f),
			Self::Udsf(v) => Display::fmt(v, f),
		}
	}
}

/// One aliased, windowed input of a SELECT
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub struct Relation {
	pub source: RelationSource,
	pub window: Window,
	/// An explicit BUFFER SIZE for the feeding pipe
	pub capacity: Option<i64>,
	/// An explicit backpressure policy for the feeding pipe
	pub policy: Option<DropHint>,
	pub alias: Option<Ident>,
}

impl Relation {
	/// The alias under which this input's window buffer is addressed
	pub fn alias_name(&self) -> String {
		match self.alias {
			Some(ref v) => v.to_raw(),
			None => match self.source {
				RelationSource::Stream(ref v) => v.to_raw(),
				RelationSource::Udsf(ref v) => v.name.to_raw(),
			},
		}
	}
}

impl Display for Relation {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		write!(f, "{} [{}", self.source, self.window)?;
		if let Some(v) = self.capacity {
			write!(f, ", BUFFER SIZE {v}")?;
		}
		if let Some(ref v) = self.policy {
			write!(f, ", {v}")?;
		}
		f.write_str("]")?;
		if let Some(ref v) = self.alias {
			write!(f, " AS {v}")?;
		}
		Ok(())
	}
}
