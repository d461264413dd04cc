use crate::sql::Ident;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `PAUSE SOURCE <name>`
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct PauseSourceStatement {
	pub name: Ident,
}

impl fmt::Display for PauseSourceStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "PAUSE SOURCE {}", self.name)
	}
}

/// `RESUME SOURCE <name>`
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ResumeSourceStatement {
	pub name: Ident,
}

impl fmt::Display for ResumeSourceStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "RESUME SOURCE {}", self.name)
	}
}

/// `REWIND SOURCE <name>`
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct RewindSourceStatement {
	pub name: Ident,
}

impl fmt::Display for RewindSourceStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "REWIND SOURCE {}", self.name)
	}
}
