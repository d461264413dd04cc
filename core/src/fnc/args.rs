use crate::err::Error;
use crate::sql::Value;

/// Extracts a typed argument list from the raw call arguments, failing
/// with the function name when the arity does not match.
pub trait FromArgs: Sized {
	fn from_args(name: &str, args: Vec<Value>) -> Result<Self, Error>;
}

impl FromArgs for Vec<Value> {
	fn from_args(_: &str, args: Vec<Value>) -> Result<Self, Error> {
		Ok(args)
	}
}

impl FromArgs for (Value,) {
	fn from_args(name: &str, args: Vec<Value>) -> Result<Self, Error> {
		let [a]: [Value; 1] = args.try_into().map_err(|_| Error::InvalidArguments {
			name: name.to_owned(),
			message: String::from("expected exactly one argument"),
		})?;
		Ok((a,))
	}
}

impl FromArgs for (Value, Value) {
	fn from_args(name: &str, args: Vec<Value>) -> Result<Self, Error> {
		let [a, b]: [Value; 2] = args.try_into().map_err(|_| Error::InvalidArguments {
			name: name.to_owned(),
			message: String::from("expected exactly two arguments"),
		})?;
		Ok((a, b))
	}
}

impl FromArgs for () {
	fn from_args(name: &str, args: Vec<Value>) -> Result<Self, Error> {
		if !args.is_empty() {
			return Err(Error::InvalidArguments {
				name: name.to_owned(),
				message: String::from("expected no arguments"),
			});
		}
		Ok(())
	}
}
