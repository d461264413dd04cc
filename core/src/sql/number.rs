use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::hash;
use std::str::FromStr;

/// A numeric value, either a signed 64-bit integer or an IEEE-754 double.
/// Integer arithmetic wraps on overflow; an operation mixing the two
/// variants promotes to a float.
#[derive(Clone, Copy, Serialize, Deserialize, Debug)]
#[non_exhaustive]
pub enum Number {
	Int(i64),
	Float(f64),
}

impl Default for Number {
	fn default() -> Self {
		Self::Int(0)
	}
}

macro_rules! from_prim_ints {
	($($int: ty),*) => {
		$(
			impl From<$int> for Number {
				fn from(i: $int) -> Self {
					Self::Int(i as i64)
				}
			}
		)*
	};
}

from_prim_ints!(i8, i16, i32, i64, isize, u8, u16, u32, usize);

impl From<f32> for Number {
	fn from(f: f32) -> Self {
		Self::Float(f as f64)
	}
}

impl From<f64> for Number {
	fn from(f: f64) -> Self {
		Self::Float(f)
	}
}

impl FromStr for Number {
	type Err = ();
	fn from_str(v: &str) -> Result<Self, Self::Err> {
		// Attempt to parse as i64
		match v.parse::<i64>() {
			// Store it as an i64
			Ok(v) => Ok(Self::Int(v)),
			// It wasn't parsed as a i64 so parse as a float
			_ => match f64::from_str(v) {
				// Store it as a float
				Ok(v) => Ok(Self::Float(v)),
				// It wasn't parsed as a number
				_ => Err(()),
			},
		}
	}
}

impl Display for Number {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match self {
			Number::Int(v) => Display::fmt(v, f),
			// Debug formatting keeps a trailing `.0` on whole floats so
			// that the rendered literal parses back as a float
			Number::Float(v) => write!(f, "{v:?}"),
		}
	}
}

impl Number {
	pub fn is_int(&self) -> bool {
		matches!(self, Number::Int(_))
	}

	pub fn is_float(&self) -> bool {
		matches!(self, Number::Float(_))
	}

	pub fn to_int(&self) -> i64 {
		match self {
			Number::Int(v) => *v,
			Number::Float(v) => *v as i64,
		}
	}

	pub fn to_float(&self) -> f64 {
		match self {
			Number::Int(v) => *v as f64,
			Number::Float(v) => *v,
		}
	}

	pub fn is_truthy(&self) -> bool {
		match self {
			Number::Int(v) => v != &0,
			Number::Float(v) => v != &0.0,
		}
	}

	// -----------------------------------
	// Arithmetic. Division by zero and remainder by zero return None,
	// which the caller maps to a Null value.
	// -----------------------------------

	pub fn add(self, other: Self) -> Self {
		match (self, other) {
			(Number::Int(v), Number::Int(w)) => Number::Int(v.wrapping_add(w)),
			(v, w) => Number::Float(v.to_float() + w.to_float()),
		}
	}

	pub fn sub(self, other: Self) -> Self {
		match (self, other) {
			(Number::Int(v), Number::Int(w)) => Number::Int(v.wrapping_sub(w)),
			(v, w) => Number::Float(v.to_float() - w.to_float()),
		}
	}

	pub fn mul(self, other: Self) -> Self {
		match (self, other) {
			(Number::Int(v), Number::Int(w)) => Number::Int(v.wrapping_mul(w)),
			(v, w) => Number::Float(v.to_float() * w.to_float()),
		}
	}

	pub fn div(self, other: Self) -> Option<Self> {
		match (self, other) {
			(_, Number::Int(0)) => None,
			(_, Number::Float(w)) if w == 0.0 => None,
			(Number::Int(v), Number::Int(w)) => Some(Number::Int(v.wrapping_div(w))),
			(v, w) => Some(Number::Float(v.to_float() / w.to_float())),
		}
	}

	pub fn rem(self, other: Self) -> Option<Self> {
		match (self, other) {
			(_, Number::Int(0)) => None,
			(_, Number::Float(w)) if w == 0.0 => None,
			// The remainder takes the sign of the dividend
			(Number::Int(v), Number::Int(w)) => Some(Number::Int(v.wrapping_rem(w))),
			(v, w) => Some(Number::Float(v.to_float() % w.to_float())),
		}
	}

	pub fn neg(self) -> Self {
		match self {
			Number::Int(v) => Number::Int(v.wrapping_neg()),
			Number::Float(v) => Number::Float(-v),
		}
	}
}

impl Eq for Number {}

impl PartialEq for Number {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Number::Int(v), Number::Int(w)) => v == w,
			(Number::Float(v), Number::Float(w)) => v.total_cmp(w) == Ordering::Equal,
			// Compare across variants by promoting to a float
			(v, w) => v.to_float().total_cmp(&w.to_float()) == Ordering::Equal,
		}
	}
}

impl Ord for Number {
	fn cmp(&self, other: &Self) -> Ordering {
		match (self, other) {
			(Number::Int(v), Number::Int(w)) => v.cmp(w),
			(v, w) => v.to_float().total_cmp(&w.to_float()),
		}
	}
}

impl PartialOrd for Number {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl hash::Hash for Number {
	fn hash<H: hash::Hasher>(&self, state: &mut H) {
		match self {
			Number::Int(v) => v.hash(state),
			Number::Float(v) => v.to_bits().hash(state),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn integer_arithmetic_wraps() {
		assert_eq!(Number::Int(i64::MAX).add(Number::Int(1)), Number::Int(i64::MIN));
		assert_eq!(Number::Int(i64::MIN).sub(Number::Int(1)), Number::Int(i64::MAX));
		assert_eq!(Number::Int(i64::MIN).neg(), Number::Int(i64::MIN));
	}

	#[test]
	fn division_by_zero_is_none() {
		assert_eq!(Number::Int(1).div(Number::Int(0)), None);
		assert_eq!(Number::Float(1.0).div(Number::Float(0.0)), None);
		assert_eq!(Number::Int(7).rem(Number::Int(0)), None);
	}

	#[test]
	fn remainder_follows_dividend() {
		assert_eq!(Number::Int(-7).rem(Number::Int(3)), Some(Number::Int(-1)));
		assert_eq!(Number::Int(7).rem(Number::Int(-3)), Some(Number::Int(1)));
	}

	#[test]
	fn mixed_promotes_to_float() {
		assert_eq!(Number::Int(1).add(Number::Float(0.5)), Number::Float(1.5));
		assert_eq!(Number::Int(1), Number::Float(1.0));
	}
}
