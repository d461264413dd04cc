//! Function evaluation: the operator kernel, the built-in scalar and
//! aggregate functions, and the creator registries.

use crate::err::Error;
use crate::sql::{Function, Idiom, Object, Part, Value};
use std::collections::BTreeMap;

pub mod aggregate;
pub mod args;
pub mod math;
pub mod operate;
pub mod registry;
pub mod string;
pub mod time;

/// Each function is specified by its name (a string literal) followed by
/// its path. The function is handed its typed argument tuple, extracted
/// with [`args::FromArgs`].
macro_rules! dispatch {
	($name: ident, $args: ident, $($function_name: literal => $($function_path: ident)::+,)+) => {
		{
			match $name {
				$($function_name => {
					let args = args::FromArgs::from_args($name, $args)?;
					$($function_path)::+(args)
				},)+
				_ => {
					Err($crate::err::Error::UnknownFunction(String::from($name)))
				}
			}
		}
	};
}

/// Attempts to run any built-in scalar function
pub(crate) fn synchronous(name: &str, args: Vec<Value>) -> Result<Value, Error> {
	dispatch!(
		name,
		args,
		"abs" => math::abs,
		"ceil" => math::ceil,
		"concat" => string::concat,
		"floor" => math::floor,
		"len" => string::len,
		"lower" => string::lower,
		"now" => time::now,
		"upper" => string::upper,
	)
}

/// The environment an expression is evaluated in: the function registry,
/// the named input records if any, and the rows of the current group when
/// aggregates are in scope.
pub(crate) struct Env<'a> {
	fns: &'a registry::Functions,
	rows: Option<&'a BTreeMap<String, Object>>,
	partition: Option<&'a [BTreeMap<String, Object>]>,
}

impl<'a> Env<'a> {
	/// An environment with no input rows. Any column reference fails as
	/// not foldable.
	pub(crate) fn foldable(fns: &'a registry::Functions) -> Self {
		Self {
			fns,
			rows: None,
			partition: None,
		}
	}

	/// An environment over one set of named input records
	pub(crate) fn on_rows(fns: &'a registry::Functions, rows: &'a BTreeMap<String, Object>) -> Self {
		Self {
			fns,
			rows: Some(rows),
			partition: None,
		}
	}

	/// An environment over one group: plain columns read the first row,
	/// aggregates range over the whole partition
	pub(crate) fn grouped(
		fns: &'a registry::Functions,
		first: &'a BTreeMap<String, Object>,
		partition: &'a [BTreeMap<String, Object>],
	) -> Self {
		Self {
			fns,
			rows: Some(first),
			partition: Some(partition),
		}
	}

	/// Resolves a column reference against the input records
	pub(crate) fn lookup(&self, idiom: &Idiom) -> Result<Value, Error> {
		let Some(rows) = self.rows else {
			return Err(Error::NotFoldable(idiom.to_string()));
		};
		let row = match idiom.input {
			// A qualified column names its input directly
			Some(ref name) => rows
				.get(name.as_str())
				.ok_or_else(|| Error::NotFound(name.to_raw()))?,
			// An unqualified column requires a single unambiguous input
			None => match rows.len() {
				1 => match rows.values().next() {
					Some(row) => row,
					None => return Ok(Value::Null),
				},
				0 => return Ok(Value::Null),
				_ => return Err(Error::AmbiguousColumn(idiom.to_string())),
			},
		};
		// The leading path step addresses a field of the input record
		match idiom.parts.split_first() {
			Some((Part::Field(k), rest)) => match row.0.get(k.as_str()) {
				Some(v) => Ok(v.get(rest)),
				None => Ok(Value::Null),
			},
			_ => Ok(Value::Object(row.clone()).get(&idiom.parts)),
		}
	}

	/// Runs a function call: aggregates range over the current group,
	/// anything else evaluates its arguments in place
	pub(crate) fn invoke(&self, f: &Function) -> Result<Value, Error> {
		if f.is_aggregate() {
			let Some(partition) = self.partition else {
				return Err(Error::TypeMismatch {
					message: format!(
						"the aggregate '{}' is not allowed outside a grouped selection",
						f.name
					),
				});
			};
			// count(*) counts whole rows rather than argument values
			if f.star {
				if f.name.as_str() != "count" {
					return Err(Error::InvalidArguments {
						name: f.name.to_raw(),
						message: String::from("only count() accepts a star argument"),
					});
				}
				return Ok(Value::from(partition.len() as i64));
			}
			let arg = f.args.first().ok_or_else(|| Error::InvalidArguments {
				name: f.name.to_raw(),
				message: String::from("expected exactly one argument"),
			})?;
			if f.args.len() != 1 {
				return Err(Error::InvalidArguments {
					name: f.name.to_raw(),
					message: String::from("expected exactly one argument"),
				});
			}
			let mut values = Vec::with_capacity(partition.len());
			for row in partition {
				let env = Env::on_rows(self.fns, row);
				values.push(arg.compute(&env)?);
			}
			return aggregate::run(f.name.as_str(), values);
		}
		if f.star {
			return Err(Error::InvalidArguments {
				name: f.name.to_raw(),
				message: String::from("a star argument is only valid in count()"),
			});
		}
		let mut computed = Vec::with_capacity(f.args.len());
		for a in f.args.iter() {
			computed.push(a.compute(self)?);
		}
		self.fns.run(f.name.as_str(), computed)
	}
}

#[cfg(test)]
mod tests {
	use super::registry::Functions;
	use super::*;
	use crate::syn;

	fn eval(text: &str) -> Result<Value, Error> {
		let fns = Functions::default();
		syn::value(text).unwrap().compute_foldable(&fns)
	}

	#[test]
	fn foldable_evaluation_is_pure() {
		let a = eval("1 + 2 * 3").unwrap();
		let b = eval("1 + 2 * 3").unwrap();
		assert_eq!(a, b);
		assert_eq!(a, Value::from(7i64));
	}

	#[test]
	fn column_references_are_not_foldable() {
		assert!(matches!(eval("a + 1"), Err(Error::NotFoldable(_))));
	}

	#[test]
	fn builtin_functions() {
		assert_eq!(eval(r#"upper("abc")"#).unwrap(), Value::from("ABC"));
		assert_eq!(eval(r#"len("abc")"#).unwrap(), Value::from(3i64));
		assert_eq!(eval("abs(-2)").unwrap(), Value::from(2i64));
		assert!(matches!(eval("nosuch(1)"), Err(Error::UnknownFunction(_))));
	}

	#[test]
	fn case_and_cast_evaluation() {
		assert_eq!(
			eval("CASE WHEN 1 = 2 THEN 1 ELSE 2 END").unwrap(),
			Value::from(2i64)
		);
		assert_eq!(eval(r#"CAST("42" AS INT)"#).unwrap(), Value::from(42i64));
	}

	#[test]
	fn evaluate_on_input() {
		let fns = Functions::default();
		let expr = syn::value("a + 1").unwrap();
		let rows = map! {
			String::from("x") => crate::sql::Object(map!{
				String::from("a") => Value::from(2i64),
			})
		};
		assert_eq!(expr.compute_on(&rows, &fns).unwrap(), Value::from(3i64));
	}
}
