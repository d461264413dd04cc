use crate::sql::fmt::Fmt;
use crate::sql::{Cond, Emitter, Fields, Groups, Having, Relation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A windowed continuous SELECT
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct SelectStatement {
	pub emitter: Emitter,
	pub fields: Fields,
	pub from: Vec<Relation>,
	pub cond: Option<Cond>,
	pub group: Option<Groups>,
	pub having: Option<Having>,
}

impl fmt::Display for SelectStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "SELECT {} {}", self.emitter, self.fields)?;
		if !self.from.is_empty() {
			write!(f, " FROM {}", Fmt::comma_separated(self.from.iter()))?;
		}
		if let Some(ref v) = self.cond {
			write!(f, " {v}")?;
		}
		if let Some(ref v) = self.group {
			write!(f, " {v}")?;
		}
		if let Some(ref v) = self.having {
			write!(f, " {v}")?;
		}
		Ok(())
	}
}

/// Two or more SELECTs merged with UNION ALL
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct SelectUnionStatement {
	pub selects: Vec<SelectStatement>,
}

impl fmt::Display for SelectUnionStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		for (i, v) in self.selects.iter().enumerate() {
			if i > 0 {
				f.write_str(" UNION ALL ")?;
			}
			fmt::Display::fmt(v, f)?;
		}
		Ok(())
	}
}
