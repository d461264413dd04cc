use crate::sql::{Assignments, Ident};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// The condition under which the `OR CREATE` fallback fires
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub enum CreateTrigger {
	/// `IF NOT SAVED`: create whenever no snapshot exists
	#[default]
	NotSaved,
	/// `IF NOT EXISTS`: create only when no snapshot exists and no
	/// state is registered under the name either
	NotExists,
}

/// The `OR CREATE IF NOT {SAVED|EXISTS} [WITH ...]` fallback clause
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct CreateFallback {
	pub trigger: CreateTrigger,
	pub params: Assignments,
}

impl Display for CreateFallback {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match self.trigger {
			CreateTrigger::NotSaved => f.write_str("OR CREATE IF NOT SAVED")?,
			CreateTrigger::NotExists => f.write_str("OR CREATE IF NOT EXISTS")?,
		}
		if !self.params.is_empty() {
			write!(f, " WITH {}", self.params)?;
		}
		Ok(())
	}
}

/// `LOAD STATE <name> TYPE <type> [TAG <tag>] [SET ...] [OR CREATE ...]`
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct LoadStateStatement {
	pub name: Ident,
	pub kind: Ident,
	pub tag: Option<Ident>,
	/// Parameters handed to the loader
	pub params: Assignments,
	/// The CREATE STATE fallback, if any
	pub create: Option<CreateFallback>,
}

impl Display for LoadStateStatement {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		write!(f, "LOAD STATE {} TYPE {}", self.name, self.kind)?;
		if let Some(ref v) = self.tag {
			write!(f, " TAG {v}")?;
		}
		if !self.params.is_empty() {
			write!(f, " SET {}", self.params)?;
		}
		if let Some(ref v) = self.create {
			write!(f, " {v}")?;
		}
		Ok(())
	}
}
