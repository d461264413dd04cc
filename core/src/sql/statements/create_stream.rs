use crate::sql::statements::select::SelectStatement;
use crate::sql::Ident;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `CREATE STREAM <name> AS SELECT ... [UNION ALL SELECT ...]`
///
/// A single entry in `selects` builds one box; more than one builds a
/// temporary box per sub-select plus a forwarder carrying the name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct CreateStreamStatement {
	pub name: Ident,
	pub selects: Vec<SelectStatement>,
}

impl fmt::Display for CreateStreamStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "CREATE STREAM {} AS ", self.name)?;
		for (i, v) in self.selects.iter().enumerate() {
			if i > 0 {
				f.write_str(" UNION ALL ")?;
			}
			fmt::Display::fmt(v, f)?;
		}
		Ok(())
	}
}
