use crate::sql::Ident;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `SAVE STATE <name> [TAG <tag>]`
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct SaveStateStatement {
	pub name: Ident,
	pub tag: Option<Ident>,
}

impl fmt::Display for SaveStateStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "SAVE STATE {}", self.name)?;
		if let Some(ref v) = self.tag {
			write!(f, " TAG {v}")?;
		}
		Ok(())
	}
}
