use crate::err::Error;
use crate::fnc::operate;
use crate::sql::{Number, Value};

/// Runs an aggregate function over the per-row argument values of one
/// group. Null inputs are skipped; an aggregate over no remaining
/// values yields Null, except `count`, which yields 0.
pub(crate) fn run(name: &str, values: Vec<Value>) -> Result<Value, Error> {
	match name {
		"count" => count(values),
		"sum" => sum(values),
		"avg" => avg(values),
		"min" => min(values),
		"max" => max(values),
		_ => Err(Error::UnknownFunction(name.to_owned())),
	}
}

fn count(values: Vec<Value>) -> Result<Value, Error> {
	Ok(Value::from(values.iter().filter(|v| !v.is_null()).count() as i64))
}

fn sum(values: Vec<Value>) -> Result<Value, Error> {
	let mut acc: Option<Number> = None;
	for v in values {
		match v {
			Value::Null => continue,
			Value::Number(v) => {
				acc = Some(match acc {
					Some(a) => a.add(v),
					None => v,
				})
			}
			v => {
				return Err(Error::InvalidArguments {
					name: String::from("sum"),
					message: format!("expected numbers, not a {} value", v.kind_name()),
				})
			}
		}
	}
	Ok(acc.map(Value::Number).unwrap_or(Value::Null))
}

fn avg(values: Vec<Value>) -> Result<Value, Error> {
	let mut acc = 0f64;
	let mut n = 0usize;
	for v in values {
		match v {
			Value::Null => continue,
			Value::Number(v) => {
				acc += v.to_float();
				n += 1;
			}
			v => {
				return Err(Error::InvalidArguments {
					name: String::from("avg"),
					message: format!("expected numbers, not a {} value", v.kind_name()),
				})
			}
		}
	}
	Ok(match n {
		0 => Value::Null,
		n => Value::from(acc / n as f64),
	})
}

fn extreme(values: Vec<Value>, want_min: bool) -> Result<Value, Error> {
	let mut acc: Option<Value> = None;
	for v in values {
		if v.is_null() {
			continue;
		}
		acc = Some(match acc {
			None => v,
			// Comparison failures surface as type mismatches
			Some(a) => match operate::less_than(&a, &v)?.is_true() == want_min {
				true => a,
				false => v,
			},
		});
	}
	Ok(acc.unwrap_or(Value::Null))
}

fn min(values: Vec<Value>) -> Result<Value, Error> {
	extreme(values, true)
}

fn max(values: Vec<Value>) -> Result<Value, Error> {
	extreme(values, false)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_input_defaults() {
		assert_eq!(run("count", vec![]).unwrap(), Value::from(0i64));
		assert_eq!(run("sum", vec![]).unwrap(), Value::Null);
		assert_eq!(run("avg", vec![]).unwrap(), Value::Null);
		assert_eq!(run("min", vec![]).unwrap(), Value::Null);
		assert_eq!(run("max", vec![]).unwrap(), Value::Null);
	}

	#[test]
	fn nulls_are_skipped() {
		let vals = vec![Value::from(1i64), Value::Null, Value::from(3i64)];
		assert_eq!(run("count", vals.clone()).unwrap(), Value::from(2i64));
		assert_eq!(run("sum", vals.clone()).unwrap(), Value::from(4i64));
		assert_eq!(run("avg", vals.clone()).unwrap(), Value::from(2.0));
		assert_eq!(run("min", vals.clone()).unwrap(), Value::from(1i64));
		assert_eq!(run("max", vals).unwrap(), Value::from(3i64));
	}

	#[test]
	fn integer_sum_stays_integer() {
		let vals = vec![Value::from(1i64), Value::from(2i64)];
		assert_eq!(run("sum", vals).unwrap(), Value::from(3i64));
	}
}
