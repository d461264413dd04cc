use crate::sql::{Assignments, Ident};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `CREATE SOURCE [PAUSED|UNPAUSED] <name> TYPE <type> [WITH ...]`
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct CreateSourceStatement {
	/// Whether the source starts paused. None means the default, which
	/// is to start running.
	pub paused: Option<bool>,
	pub name: Ident,
	pub kind: Ident,
	pub params: Assignments,
}

impl fmt::Display for CreateSourceStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str("CREATE SOURCE")?;
		match self.paused {
			Some(true) => f.write_str(" PAUSED")?,
			Some(false) => f.write_str(" UNPAUSED")?,
			None => {}
		}
		write!(f, " {} TYPE {}", self.name, self.kind)?;
		if !self.params.is_empty() {
			write!(f, " WITH {}", self.params)?;
		}
		Ok(())
	}
}
