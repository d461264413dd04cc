use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// The stream-relation semantics of a SELECT: which part of the current
/// result set is emitted on each arrival.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub enum EmitterKind {
	/// Emit rows newly present in the result set
	#[default]
	IStream,
	/// Emit rows which just left the result set
	DStream,
	/// Emit the whole result set on every arrival
	RStream,
}

impl EmitterKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::IStream => "ISTREAM",
			Self::DStream => "DSTREAM",
			Self::RStream => "RSTREAM",
		}
	}
}

impl Display for EmitterKind {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// An optional output-rate reduction on an emitter
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Sampling {
	/// `EVERY n-TH TUPLE`: pass only every n-th emitted tuple
	Count(u64),
	/// `SAMPLE p%`: pass each emitted tuple with independent probability
	Percent(f64),
	/// `EVERY n SECONDS` / `EVERY n MILLISECONDS`: pass a tuple only when
	/// the interval has elapsed since the last passed one
	Every(u64, SampleUnit),
}

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub enum SampleUnit {
	Seconds,
	Milliseconds,
}

/// The English ordinal suffix for a count, as written in `EVERY 2ND TUPLE`
fn ordinal(n: u64) -> &'static str {
	match (n % 10, n % 100) {
		(1, 11) | (2, 12) | (3, 13) => "TH",
		(1, _) => "ST",
		(2, _) => "ND",
		(3, _) => "RD",
		_ => "TH",
	}
}

impl Display for Sampling {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match self {
			Self::Count(n) => write!(f, "EVERY {n}{} TUPLE", ordinal(*n)),
			Self::Percent(p) => write!(f, "SAMPLE {p}%"),
			Self::Every(n, SampleUnit::Seconds) => write!(f, "EVERY {n} SECONDS"),
			Self::Every(n, SampleUnit::Milliseconds) => write!(f, "EVERY {n} MILLISECONDS"),
		}
	}
}

/// The full emitter clause of a SELECT
#[derive(Clone, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Emitter {
	pub kind: EmitterKind,
	pub limit: Option<u64>,
	pub sampling: Option<Sampling>,
}

impl Display for Emitter {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		Display::fmt(&self.kind, f)?;
		if let Some(v) = self.limit {
			write!(f, " LIMIT {v}")?;
		}
		if let Some(ref v) = self.sampling {
			write!(f, " {v}")?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ordinal_suffixes() {
		assert_eq!(ordinal(1), "ST");
		assert_eq!(ordinal(2), "ND");
		assert_eq!(ordinal(3), "RD");
		assert_eq!(ordinal(4), "TH");
		assert_eq!(ordinal(11), "TH");
		assert_eq!(ordinal(12), "TH");
		assert_eq!(ordinal(21), "ST");
	}
}
