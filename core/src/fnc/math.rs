use crate::err::Error;
use crate::sql::{Number, Value};

fn numeric(name: &str, v: Value) -> Result<Option<Number>, Error> {
	match v {
		Value::Null => Ok(None),
		Value::Number(v) => Ok(Some(v)),
		v => Err(Error::InvalidArguments {
			name: name.to_owned(),
			message: format!("expected a number, not a {} value", v.kind_name()),
		}),
	}
}

pub fn abs((v,): (Value,)) -> Result<Value, Error> {
	Ok(match numeric("abs", v)? {
		Some(Number::Int(v)) => Value::from(v.wrapping_abs()),
		Some(Number::Float(v)) => Value::from(v.abs()),
		None => Value::Null,
	})
}

pub fn ceil((v,): (Value,)) -> Result<Value, Error> {
	Ok(match numeric("ceil", v)? {
		Some(Number::Int(v)) => Value::from(v),
		Some(Number::Float(v)) => Value::from(v.ceil()),
		None => Value::Null,
	})
}

pub fn floor((v,): (Value,)) -> Result<Value, Error> {
	Ok(match numeric("floor", v)? {
		Some(Number::Int(v)) => Value::from(v),
		Some(Number::Float(v)) => Value::from(v.floor()),
		None => Value::Null,
	})
}
