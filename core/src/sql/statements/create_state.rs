use crate::sql::{Assignments, Ident};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `CREATE STATE <name> TYPE <type> [WITH ...]`
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct CreateStateStatement {
	pub name: Ident,
	pub kind: Ident,
	pub params: Assignments,
}

impl fmt::Display for CreateStateStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "CREATE STATE {} TYPE {}", self.name, self.kind)?;
		if !self.params.is_empty() {
			write!(f, " WITH {}", self.params)?;
		}
		Ok(())
	}
}
