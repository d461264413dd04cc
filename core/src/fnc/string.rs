use crate::err::Error;
use crate::sql::Value;

pub fn lower((v,): (Value,)) -> Result<Value, Error> {
	match v {
		Value::Null => Ok(Value::Null),
		Value::Strand(v) => Ok(Value::from(v.to_lowercase())),
		v => Err(Error::InvalidArguments {
			name: String::from("lower"),
			message: format!("expected a string, not a {} value", v.kind_name()),
		}),
	}
}

pub fn upper((v,): (Value,)) -> Result<Value, Error> {
	match v {
		Value::Null => Ok(Value::Null),
		Value::Strand(v) => Ok(Value::from(v.to_uppercase())),
		v => Err(Error::InvalidArguments {
			name: String::from("upper"),
			message: format!("expected a string, not a {} value", v.kind_name()),
		}),
	}
}

/// The length of a string in characters, or of an array or map in
/// elements
pub fn len((v,): (Value,)) -> Result<Value, Error> {
	match v {
		Value::Null => Ok(Value::Null),
		Value::Strand(v) => Ok(Value::from(v.chars().count() as i64)),
		Value::Bytes(v) => Ok(Value::from(v.len() as i64)),
		Value::Array(v) => Ok(Value::from(v.len() as i64)),
		Value::Object(v) => Ok(Value::from(v.len() as i64)),
		v => Err(Error::InvalidArguments {
			name: String::from("len"),
			message: format!("cannot take the length of a {} value", v.kind_name()),
		}),
	}
}

pub fn concat(args: Vec<Value>) -> Result<Value, Error> {
	let mut out = String::new();
	for v in args {
		match v {
			Value::Null => return Ok(Value::Null),
			Value::Strand(v) => out.push_str(v.as_str()),
			v => {
				return Err(Error::InvalidArguments {
					name: String::from("concat"),
					message: format!("expected strings, not a {} value", v.kind_name()),
				})
			}
		}
	}
	Ok(Value::from(out))
}
