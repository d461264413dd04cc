use crate::sql::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A `CASE` expression, in either the searched form (no subject) or the
/// simple form (subject compared against each `WHEN` value).
#[derive(Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub struct Case {
	/// The subject expression, if this is a simple CASE
	pub expr: Option<Value>,
	/// The WHEN ... THEN ... arms, in order
	pub whens: Vec<(Value, Value)>,
	/// The ELSE arm, if any
	pub other: Option<Value>,
}

impl fmt::Display for Case {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str("CASE")?;
		if let Some(ref v) = self.expr {
			write!(f, " {v}")?;
		}
		for (w, t) in self.whens.iter() {
			write!(f, " WHEN {w} THEN {t}")?;
		}
		if let Some(ref v) = self.other {
			write!(f, " ELSE {v}")?;
		}
		f.write_str(" END")
	}
}
