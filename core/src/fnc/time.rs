use crate::err::Error;
use crate::sql::{Datetime, Value};

/// The current wall-clock instant
pub fn now(_: ()) -> Result<Value, Error> {
	Ok(Value::Datetime(Datetime::now()))
}
