//! The binary and unary operator kernel. Three-valued logic is explicit
//! here: unless stated otherwise, an operation with a Null operand
//! produces Null, and a comparison across value kinds is an error.

use crate::err::Error;
use crate::sql::{Number, Value};
use std::cmp::Ordering;

pub fn neg(a: Value) -> Result<Value, Error> {
	match a {
		Value::Null => Ok(Value::Null),
		Value::Number(v) => Ok(Value::Number(v.neg())),
		a => Err(Error::TypeMismatch {
			message: format!("cannot negate a {} value", a.kind_name()),
		}),
	}
}

pub fn not(a: Value) -> Result<Value, Error> {
	match a {
		Value::Null => Ok(Value::Null),
		Value::Bool(v) => Ok(Value::Bool(!v)),
		a => Err(Error::TypeMismatch {
			message: format!("NOT expects a bool, not a {} value", a.kind_name()),
		}),
	}
}

/// The truth value of a boolean operand: true, false, or unknown
fn truth(v: &Value) -> Result<Option<bool>, Error> {
	match v {
		Value::Null => Ok(None),
		Value::Bool(v) => Ok(Some(*v)),
		v => Err(Error::TypeMismatch {
			message: format!("expected a bool condition, not a {} value", v.kind_name()),
		}),
	}
}

pub fn and(a: Value, b: Value) -> Result<Value, Error> {
	Ok(match (truth(&a)?, truth(&b)?) {
		(Some(false), _) | (_, Some(false)) => Value::Bool(false),
		(Some(true), Some(true)) => Value::Bool(true),
		_ => Value::Null,
	})
}

pub fn or(a: Value, b: Value) -> Result<Value, Error> {
	Ok(match (truth(&a)?, truth(&b)?) {
		(Some(true), _) | (_, Some(true)) => Value::Bool(true),
		(Some(false), Some(false)) => Value::Bool(false),
		_ => Value::Null,
	})
}

fn numbers(a: Value, b: Value, op: &str) -> Result<Option<(Number, Number)>, Error> {
	match (a, b) {
		(Value::Null, _) | (_, Value::Null) => Ok(None),
		(Value::Number(a), Value::Number(b)) => Ok(Some((a, b))),
		(a, b) => Err(Error::TypeMismatch {
			message: format!(
				"cannot apply '{op}' to {} and {} values",
				a.kind_name(),
				b.kind_name()
			),
		}),
	}
}

pub fn add(a: Value, b: Value) -> Result<Value, Error> {
	Ok(match numbers(a, b, "+")? {
		Some((a, b)) => Value::Number(a.add(b)),
		None => Value::Null,
	})
}

pub fn sub(a: Value, b: Value) -> Result<Value, Error> {
	Ok(match numbers(a, b, "-")? {
		Some((a, b)) => Value::Number(a.sub(b)),
		None => Value::Null,
	})
}

pub fn mul(a: Value, b: Value) -> Result<Value, Error> {
	Ok(match numbers(a, b, "*")? {
		Some((a, b)) => Value::Number(a.mul(b)),
		None => Value::Null,
	})
}

pub fn div(a: Value, b: Value) -> Result<Value, Error> {
	Ok(match numbers(a, b, "/")? {
		// Division by zero yields Null rather than failing
		Some((a, b)) => a.div(b).map(Value::Number).unwrap_or(Value::Null),
		None => Value::Null,
	})
}

pub fn rem(a: Value, b: Value) -> Result<Value, Error> {
	Ok(match numbers(a, b, "%")? {
		Some((a, b)) => a.rem(b).map(Value::Number).unwrap_or(Value::Null),
		None => Value::Null,
	})
}

pub fn concat(a: Value, b: Value) -> Result<Value, Error> {
	match (a, b) {
		(Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
		(Value::Strand(mut a), Value::Strand(b)) => {
			a.0.push_str(b.as_str());
			Ok(Value::Strand(a))
		}
		(a, b) => Err(Error::TypeMismatch {
			message: format!(
				"cannot concatenate {} and {} values",
				a.kind_name(),
				b.kind_name()
			),
		}),
	}
}

/// Compares two plain values of the same kind, with Int and Float
/// comparable to each other. Returns None when either side is Null.
fn compare(a: &Value, b: &Value, op: &str) -> Result<Option<Ordering>, Error> {
	match (a, b) {
		(Value::Null, _) | (_, Value::Null) => Ok(None),
		(Value::Bool(a), Value::Bool(b)) => Ok(Some(a.cmp(b))),
		(Value::Number(a), Value::Number(b)) => Ok(Some(a.cmp(b))),
		// String comparison is lexicographic over UTF-8 code points
		(Value::Strand(a), Value::Strand(b)) => Ok(Some(a.cmp(b))),
		(Value::Bytes(a), Value::Bytes(b)) => Ok(Some(a.cmp(b))),
		(Value::Datetime(a), Value::Datetime(b)) => Ok(Some(a.cmp(b))),
		(Value::Array(a), Value::Array(b)) => Ok(Some(a.cmp(b))),
		(Value::Object(a), Value::Object(b)) => Ok(Some(a.cmp(b))),
		(a, b) => Err(Error::TypeMismatch {
			message: format!(
				"cannot apply '{op}' to {} and {} values",
				a.kind_name(),
				b.kind_name()
			),
		}),
	}
}

pub fn equal(a: &Value, b: &Value) -> Result<Value, Error> {
	Ok(match compare(a, b, "=")? {
		Some(v) => Value::Bool(v == Ordering::Equal),
		None => Value::Null,
	})
}

pub fn not_equal(a: &Value, b: &Value) -> Result<Value, Error> {
	Ok(match compare(a, b, "!=")? {
		Some(v) => Value::Bool(v != Ordering::Equal),
		None => Value::Null,
	})
}

pub fn less_than(a: &Value, b: &Value) -> Result<Value, Error> {
	Ok(match compare(a, b, "<")? {
		Some(v) => Value::Bool(v == Ordering::Less),
		None => Value::Null,
	})
}

pub fn less_than_or_equal(a: &Value, b: &Value) -> Result<Value, Error> {
	Ok(match compare(a, b, "<=")? {
		Some(v) => Value::Bool(v != Ordering::Greater),
		None => Value::Null,
	})
}

pub fn more_than(a: &Value, b: &Value) -> Result<Value, Error> {
	Ok(match compare(a, b, ">")? {
		Some(v) => Value::Bool(v == Ordering::Greater),
		None => Value::Null,
	})
}

pub fn more_than_or_equal(a: &Value, b: &Value) -> Result<Value, Error> {
	Ok(match compare(a, b, ">=")? {
		Some(v) => Value::Bool(v != Ordering::Less),
		None => Value::Null,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn three_valued_and_or() {
		assert_eq!(and(Value::Bool(false), Value::Null).unwrap(), Value::Bool(false));
		assert_eq!(and(Value::Null, Value::Bool(false)).unwrap(), Value::Bool(false));
		assert_eq!(and(Value::Bool(true), Value::Null).unwrap(), Value::Null);
		assert_eq!(or(Value::Bool(true), Value::Null).unwrap(), Value::Bool(true));
		assert_eq!(or(Value::Null, Value::Bool(true)).unwrap(), Value::Bool(true));
		assert_eq!(or(Value::Bool(false), Value::Null).unwrap(), Value::Null);
	}

	#[test]
	fn null_comparisons_are_null() {
		assert_eq!(equal(&Value::Null, &Value::from(1i64)).unwrap(), Value::Null);
		assert_eq!(less_than(&Value::from(1i64), &Value::Null).unwrap(), Value::Null);
	}

	#[test]
	fn cross_kind_comparison_fails() {
		assert!(equal(&Value::from(1i64), &Value::from("1")).is_err());
		assert!(less_than(&Value::Bool(true), &Value::from(0i64)).is_err());
	}

	#[test]
	fn numeric_promotion() {
		assert_eq!(
			equal(&Value::from(1i64), &Value::from(1.0)).unwrap(),
			Value::Bool(true)
		);
		assert_eq!(add(Value::from(1i64), Value::from(0.5)).unwrap(), Value::from(1.5));
	}

	#[test]
	fn division_by_zero() {
		assert_eq!(div(Value::from(1i64), Value::from(0i64)).unwrap(), Value::Null);
		assert_eq!(rem(Value::from(1i64), Value::from(0i64)).unwrap(), Value::Null);
	}
}
