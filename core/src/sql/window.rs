use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::time::Duration;

/// A window retention rule over an input buffer
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub enum Window {
	/// Keep the most recent n tuples
	Tuples(i64),
	/// Keep tuples which arrived within the last n seconds
	Seconds(u64),
	/// Keep tuples which arrived within the last n milliseconds
	Milliseconds(u64),
}

impl Default for Window {
	fn default() -> Self {
		Self::Tuples(1)
	}
}

impl Window {
	/// The retention interval for time-based windows
	pub fn interval(&self) -> Option<Duration> {
		match self {
			Self::Tuples(_) => None,
			Self::Seconds(v) => Some(Duration::from_secs(*v)),
			Self::Milliseconds(v) => Some(Duration::from_millis(*v)),
		}
	}
}

impl Display for Window {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match self {
			Self::Tuples(v) => write!(f, "RANGE {v} TUPLES"),
			Self::Seconds(v) => write!(f, "RANGE {v} SECONDS"),
			Self::Milliseconds(v) => write!(f, "RANGE {v} MILLISECONDS"),
		}
	}
}
