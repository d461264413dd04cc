use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter, Write};
use std::ops::Deref;

/// A binary blob value. Rendered as a hexadecimal literal since the BQL
/// surface has no blob literal form.
#[derive(Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub struct Bytes(pub Vec<u8>);

impl From<Vec<u8>> for Bytes {
	fn from(v: Vec<u8>) -> Self {
		Self(v)
	}
}

impl From<&[u8]> for Bytes {
	fn from(v: &[u8]) -> Self {
		Self(v.to_vec())
	}
}

impl Deref for Bytes {
	type Target = Vec<u8>;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl Bytes {
	pub fn into_inner(self) -> Vec<u8> {
		self.0
	}
}

impl Display for Bytes {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		f.write_str("0x")?;
		for b in self.0.iter() {
			write!(f, "{b:02x}")?;
		}
		Ok(())
	}
}
