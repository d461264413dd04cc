use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::ops::Deref;

/// An instant in time with nanosecond resolution. Event timestamps and
/// wall-clock processing timestamps both use this type.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub struct Datetime(pub DateTime<Utc>);

impl Default for Datetime {
	fn default() -> Self {
		Self(Utc.timestamp_nanos(0))
	}
}

impl From<DateTime<Utc>> for Datetime {
	fn from(v: DateTime<Utc>) -> Self {
		Self(v)
	}
}

impl From<Datetime> for DateTime<Utc> {
	fn from(v: Datetime) -> Self {
		v.0
	}
}

impl Deref for Datetime {
	type Target = DateTime<Utc>;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl Datetime {
	/// The current wall-clock instant
	pub fn now() -> Self {
		Self(Utc::now())
	}
	/// Construct from nanoseconds since the Unix epoch
	pub fn from_nanos(v: i64) -> Self {
		Self(Utc.timestamp_nanos(v))
	}
	/// Nanoseconds since the Unix epoch
	pub fn as_nanos(&self) -> i64 {
		self.0.timestamp_nanos_opt().unwrap_or(i64::MAX)
	}
	/// Seconds since the Unix epoch, with fractional nanoseconds
	pub fn as_secs_f64(&self) -> f64 {
		self.as_nanos() as f64 / 1e9
	}
}

impl Display for Datetime {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		Display::fmt(&self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true), f)
	}
}
