use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// A value type name, as used by `CAST(x AS T)`
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub enum Kind {
	Bool,
	Int,
	Float,
	String,
	Blob,
	Timestamp,
	Array,
	Map,
}

impl Kind {
	pub fn as_str(&self) -> &'static str {
		match self {
			Kind::Bool => "BOOL",
			Kind::Int => "INT",
			Kind::Float => "FLOAT",
			Kind::String => "STRING",
			Kind::Blob => "BLOB",
			Kind::Timestamp => "TIMESTAMP",
			Kind::Array => "ARRAY",
			Kind::Map => "MAP",
		}
	}
}

impl Display for Kind {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
