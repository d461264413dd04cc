use crate::sql::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `EVAL <expr> [ON <mapExpr>]`
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct EvalStatement {
	pub expr: Value,
	pub on: Option<Value>,
}

impl fmt::Display for EvalStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "EVAL {}", self.expr)?;
		if let Some(ref v) = self.on {
			write!(f, " ON {v}")?;
		}
		Ok(())
	}
}
