use crate::sql::Ident;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `INSERT INTO <sink> FROM <stream>`
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct InsertStatement {
	pub sink: Ident,
	pub from: Ident,
}

impl fmt::Display for InsertStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "INSERT INTO {} FROM {}", self.sink, self.from)
	}
}
