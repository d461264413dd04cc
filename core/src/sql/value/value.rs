use crate::err::Error;
use crate::fnc::Env;
use crate::sql::{
	Array, Bytes, Case, Cast, Datetime, Expression, Idiom, Kind, Number, Object, Strand,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// A single value. The first group of variants are plain data values as
/// they appear inside tuple payloads. The second group are un-computed
/// expression forms, which only occur inside parsed statements and are
/// evaluated into plain values before leaving the engine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub enum Value {
	// Plain data values, as carried by tuples.
	#[default]
	Null,
	Bool(bool),
	Number(Number),
	Strand(Strand),
	Bytes(Bytes),
	Datetime(Datetime),
	Array(Array),
	Object(Object),
	// Un-computed expression forms. These never appear in tuple
	// payloads; evaluation folds them into the variants above.
	Idiom(Idiom),
	Cast(Box<Cast>),
	Case(Box<Case>),
	Function(Box<crate::sql::Function>),
	Expression(Box<Expression>),
}

impl Eq for Value {}

impl Value {
	/// The ordering rank of this variant. Values of different kinds sort
	/// by rank, so that mixed-kind grouping keys have a stable total
	/// order.
	fn rank(&self) -> u8 {
		match self {
			Value::Null => 0,
			Value::Bool(_) => 1,
			Value::Number(_) => 2,
			Value::Strand(_) => 3,
			Value::Bytes(_) => 4,
			Value::Datetime(_) => 5,
			Value::Array(_) => 6,
			Value::Object(_) => 7,
			Value::Idiom(_) => 8,
			Value::Cast(_) => 9,
			Value::Case(_) => 10,
			Value::Function(_) => 11,
			Value::Expression(_) => 12,
		}
	}
}

impl Ord for Value {
	fn cmp(&self, other: &Self) -> Ordering {
		match (self, other) {
			(Value::Bool(v), Value::Bool(w)) => v.cmp(w),
			(Value::Number(v), Value::Number(w)) => v.cmp(w),
			(Value::Strand(v), Value::Strand(w)) => v.cmp(w),
			(Value::Bytes(v), Value::Bytes(w)) => v.cmp(w),
			(Value::Datetime(v), Value::Datetime(w)) => v.cmp(w),
			(Value::Array(v), Value::Array(w)) => v.cmp(w),
			(Value::Object(v), Value::Object(w)) => v.cmp(w),
			(Value::Idiom(v), Value::Idiom(w)) => v.cmp(w),
			(Value::Cast(v), Value::Cast(w)) => v.cmp(w),
			(Value::Case(v), Value::Case(w)) => v.cmp(w),
			(Value::Function(v), Value::Function(w)) => v.cmp(w),
			(Value::Expression(v), Value::Expression(w)) => v.cmp(w),
			(v, w) => v.rank().cmp(&w.rank()),
		}
	}
}

impl PartialOrd for Value {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

// -----------------------------------
// Conversions
// -----------------------------------

impl From<bool> for Value {
	#[inline]
	fn from(v: bool) -> Self {
		Value::Bool(v)
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Value::Number(Number::Int(v))
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Value::Number(Number::Float(v))
	}
}

impl From<Number> for Value {
	fn from(v: Number) -> Self {
		Value::Number(v)
	}
}

impl From<Strand> for Value {
	fn from(v: Strand) -> Self {
		Value::Strand(v)
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Value::Strand(v.into())
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::Strand(v.into())
	}
}

impl From<Bytes> for Value {
	fn from(v: Bytes) -> Self {
		Value::Bytes(v)
	}
}

impl From<Datetime> for Value {
	fn from(v: Datetime) -> Self {
		Value::Datetime(v)
	}
}

impl From<Array> for Value {
	fn from(v: Array) -> Self {
		Value::Array(v)
	}
}

impl From<Vec<Value>> for Value {
	fn from(v: Vec<Value>) -> Self {
		Value::Array(v.into())
	}
}

impl From<Object> for Value {
	fn from(v: Object) -> Self {
		Value::Object(v)
	}
}

impl From<BTreeMap<String, Value>> for Value {
	fn from(v: BTreeMap<String, Value>) -> Self {
		Value::Object(v.into())
	}
}

impl From<Idiom> for Value {
	fn from(v: Idiom) -> Self {
		Value::Idiom(v)
	}
}

impl From<Cast> for Value {
	fn from(v: Cast) -> Self {
		Value::Cast(Box::new(v))
	}
}

impl From<Case> for Value {
	fn from(v: Case) -> Self {
		Value::Case(Box::new(v))
	}
}

impl From<crate::sql::Function> for Value {
	fn from(v: crate::sql::Function) -> Self {
		Value::Function(Box::new(v))
	}
}

impl From<Expression> for Value {
	fn from(v: Expression) -> Self {
		Value::Expression(Box::new(v))
	}
}

impl From<Json> for Value {
	fn from(v: Json) -> Self {
		match v {
			Json::Null => Value::Null,
			Json::Bool(v) => Value::Bool(v),
			Json::Number(v) => match v.as_i64() {
				Some(v) => Value::from(v),
				None => Value::from(v.as_f64().unwrap_or(f64::NAN)),
			},
			Json::String(v) => Value::from(v),
			Json::Array(v) => Value::Array(v.into_iter().map(Value::from).collect()),
			Json::Object(v) => {
				Value::Object(v.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
			}
		}
	}
}

impl From<Value> for Json {
	fn from(v: Value) -> Self {
		match v {
			Value::Null => Json::Null,
			Value::Bool(v) => Json::Bool(v),
			Value::Number(Number::Int(v)) => Json::from(v),
			Value::Number(Number::Float(v)) => Json::from(v),
			Value::Strand(v) => Json::String(v.0),
			Value::Bytes(v) => Json::Array(v.0.into_iter().map(Json::from).collect()),
			Value::Datetime(v) => Json::String(v.0.to_rfc3339()),
			Value::Array(v) => Json::Array(v.into_iter().map(Json::from).collect()),
			Value::Object(v) => {
				Json::Object(v.into_iter().map(|(k, v)| (k, Json::from(v))).collect())
			}
			// Un-computed forms serialize as their rendered text
			v => Json::String(v.to_string()),
		}
	}
}

// -----------------------------------
// Inspection
// -----------------------------------

impl Value {
	/// Whether this value is the Null value
	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	/// Whether this value is the boolean true value. Filter clauses use
	/// this check, so a Null condition never passes a filter.
	pub fn is_true(&self) -> bool {
		matches!(self, Value::Bool(true))
	}

	/// The name of this value's kind, for error messages
	pub fn kind_name(&self) -> &'static str {
		match self {
			Value::Null => "null",
			Value::Bool(_) => "bool",
			Value::Number(Number::Int(_)) => "int",
			Value::Number(Number::Float(_)) => "float",
			Value::Strand(_) => "string",
			Value::Bytes(_) => "blob",
			Value::Datetime(_) => "timestamp",
			Value::Array(_) => "array",
			Value::Object(_) => "map",
			Value::Idiom(_) => "column",
			Value::Cast(_) => "cast",
			Value::Case(_) => "case",
			Value::Function(_) => "function",
			Value::Expression(_) => "expression",
		}
	}

	/// Whether this expression references no input column, and can be
	/// folded to a constant
	pub fn is_foldable(&self) -> bool {
		match self {
			Value::Idiom(_) => false,
			Value::Cast(v) => v.0.is_foldable(),
			Value::Case(v) => {
				v.expr.as_ref().map_or(true, |e| e.is_foldable())
					&& v.whens.iter().all(|(w, t)| w.is_foldable() && t.is_foldable())
					&& v.other.as_ref().map_or(true, |e| e.is_foldable())
			}
			Value::Function(v) => !v.is_aggregate() && v.args.iter().all(|a| a.is_foldable()),
			Value::Expression(v) => v.is_foldable(),
			Value::Array(v) => v.iter().all(|a| a.is_foldable()),
			Value::Object(v) => v.values().all(|a| a.is_foldable()),
			_ => true,
		}
	}

	/// Whether any aggregate function call occurs inside this expression
	pub fn has_aggregate(&self) -> bool {
		match self {
			Value::Cast(v) => v.0.has_aggregate(),
			Value::Case(v) => {
				v.expr.as_ref().is_some_and(|e| e.has_aggregate())
					|| v.whens.iter().any(|(w, t)| w.has_aggregate() || t.has_aggregate())
					|| v.other.as_ref().is_some_and(|e| e.has_aggregate())
			}
			Value::Function(v) => v.has_aggregate(),
			Value::Expression(v) => v.has_aggregate(),
			Value::Array(v) => v.iter().any(|a| a.has_aggregate()),
			Value::Object(v) => v.values().any(|a| a.has_aggregate()),
			_ => false,
		}
	}

	/// The output column name this expression contributes to a projection
	/// when it has no explicit alias
	pub fn output_name(&self) -> String {
		match self {
			Value::Idiom(v) => v.simple_name().unwrap_or_else(|| v.to_string()),
			Value::Function(v) => v.name.to_raw(),
			v => v.to_string(),
		}
	}
}

// -----------------------------------
// Evaluation
// -----------------------------------

impl Value {
	/// Evaluate this expression down to a plain value
	pub(crate) fn compute(&self, env: &Env) -> Result<Value, Error> {
		match self {
			Value::Idiom(v) => env.lookup(v),
			Value::Cast(v) => v.0.compute(env)?.convert_to(&v.1),
			Value::Case(v) => {
				match v.expr {
					// The simple form compares the subject against each arm
					Some(ref subject) => {
						let subject = subject.compute(env)?;
						for (w, t) in v.whens.iter() {
							let w = w.compute(env)?;
							if crate::fnc::operate::equal(&subject, &w)?.is_true() {
								return t.compute(env);
							}
						}
					}
					// The searched form takes the first true arm
					None => {
						for (w, t) in v.whens.iter() {
							if w.compute(env)?.is_true() {
								return t.compute(env);
							}
						}
					}
				}
				match v.other {
					Some(ref e) => e.compute(env),
					None => Ok(Value::Null),
				}
			}
			Value::Function(v) => env.invoke(v),
			Value::Expression(v) => v.compute(env),
			Value::Array(v) => {
				let mut out = Array::with_capacity(v.len());
				for v in v.iter() {
					out.push(v.compute(env)?);
				}
				Ok(Value::Array(out))
			}
			Value::Object(v) => {
				let mut out = Object::new();
				for (k, v) in v.iter() {
					out.insert(k.clone(), v.compute(env)?);
				}
				Ok(Value::Object(out))
			}
			v => Ok(v.clone()),
		}
	}

	/// Evaluate an expression which references no input column. Fails
	/// with a foldability error if it does.
	pub fn compute_foldable(&self, fns: &crate::registry::Functions) -> Result<Value, Error> {
		self.compute(&Env::foldable(fns))
	}

	/// Evaluate an expression against a set of named input records
	pub fn compute_on(
		&self,
		rows: &BTreeMap<String, Object>,
		fns: &crate::registry::Functions,
	) -> Result<Value, Error> {
		self.compute(&Env::on_rows(fns, rows))
	}
}

// -----------------------------------
// Casting
// -----------------------------------

impl Value {
	/// Convert this plain value to the given kind, as `CAST` does.
	/// A Null input always casts to Null.
	pub(crate) fn convert_to(self, kind: &Kind) -> Result<Value, Error> {
		if self.is_null() {
			return Ok(Value::Null);
		}
		let from = self.kind_name();
		match kind {
			Kind::Bool => match self {
				Value::Bool(v) => Ok(Value::Bool(v)),
				Value::Number(v) => Ok(Value::Bool(v.is_truthy())),
				Value::Strand(v) => match v.as_str() {
					"true" => Ok(Value::Bool(true)),
					"false" => Ok(Value::Bool(false)),
					_ => Err(Error::CastFailure {
						from: v.to_string(),
						into: "BOOL",
					}),
				},
				_ => Err(Error::CastFailure {
					from: from.into(),
					into: "BOOL",
				}),
			},
			Kind::Int => match self {
				Value::Number(v) => Ok(Value::Number(Number::Int(v.to_int()))),
				Value::Bool(v) => Ok(Value::from(v as i64)),
				Value::Strand(v) => v
					.parse::<i64>()
					.map(Value::from)
					.map_err(|_| Error::CastFailure {
						from: v.to_string(),
						into: "INT",
					}),
				// A timestamp converts to nanoseconds since the epoch
				Value::Datetime(v) => Ok(Value::from(v.as_nanos())),
				_ => Err(Error::CastFailure {
					from: from.into(),
					into: "INT",
				}),
			},
			Kind::Float => match self {
				Value::Number(v) => Ok(Value::Number(Number::Float(v.to_float()))),
				Value::Bool(v) => Ok(Value::from(v as i64 as f64)),
				Value::Strand(v) => v
					.parse::<f64>()
					.map(Value::from)
					.map_err(|_| Error::CastFailure {
						from: v.to_string(),
						into: "FLOAT",
					}),
				// A timestamp converts to fractional seconds since the epoch
				Value::Datetime(v) => Ok(Value::from(v.as_secs_f64())),
				_ => Err(Error::CastFailure {
					from: from.into(),
					into: "FLOAT",
				}),
			},
			Kind::String => match self {
				Value::Strand(v) => Ok(Value::Strand(v)),
				Value::Bytes(v) => match String::from_utf8(v.into_inner()) {
					Ok(v) => Ok(Value::from(v)),
					Err(_) => Err(Error::CastFailure {
						from: from.into(),
						into: "STRING",
					}),
				},
				Value::Datetime(v) => Ok(Value::from(v.to_string())),
				v => Ok(Value::from(v.to_string())),
			},
			Kind::Blob => match self {
				Value::Bytes(v) => Ok(Value::Bytes(v)),
				Value::Strand(v) => Ok(Value::Bytes(v.0.into_bytes().into())),
				_ => Err(Error::CastFailure {
					from: from.into(),
					into: "BLOB",
				}),
			},
			Kind::Timestamp => match self {
				Value::Datetime(v) => Ok(Value::Datetime(v)),
				Value::Number(Number::Int(v)) => Ok(Value::Datetime(Datetime::from_nanos(v))),
				Value::Number(Number::Float(v)) => {
					Ok(Value::Datetime(Datetime::from_nanos((v * 1e9) as i64)))
				}
				Value::Strand(v) => match chrono::DateTime::parse_from_rfc3339(v.as_str()) {
					Ok(v) => Ok(Value::Datetime(v.with_timezone(&chrono::Utc).into())),
					Err(_) => Err(Error::CastFailure {
						from: v.to_string(),
						into: "TIMESTAMP",
					}),
				},
				_ => Err(Error::CastFailure {
					from: from.into(),
					into: "TIMESTAMP",
				}),
			},
			Kind::Array => match self {
				Value::Array(v) => Ok(Value::Array(v)),
				_ => Err(Error::CastFailure {
					from: from.into(),
					into: "ARRAY",
				}),
			},
			Kind::Map => match self {
				Value::Object(v) => Ok(Value::Object(v)),
				_ => Err(Error::CastFailure {
					from: from.into(),
					into: "MAP",
				}),
			},
		}
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match self {
			Value::Null => f.write_str("NULL"),
			Value::Bool(true) => f.write_str("TRUE"),
			Value::Bool(false) => f.write_str("FALSE"),
			Value::Number(v) => Display::fmt(v, f),
			Value::Strand(v) => Display::fmt(v, f),
			Value::Bytes(v) => Display::fmt(v, f),
			Value::Datetime(v) => Display::fmt(v, f),
			Value::Array(v) => Display::fmt(v, f),
			Value::Object(v) => Display::fmt(v, f),
			Value::Idiom(v) => Display::fmt(v, f),
			Value::Cast(v) => Display::fmt(v, f),
			Value::Case(v) => Display::fmt(v, f),
			Value::Function(v) => Display::fmt(v, f),
			Value::Expression(v) => Display::fmt(v, f),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn mixed_kind_ordering_is_total() {
		let mut vals = vec![
			Value::from("b"),
			Value::Null,
			Value::from(2i64),
			Value::Bool(true),
			Value::from(1.5),
		];
		vals.sort();
		assert_eq!(vals[0], Value::Null);
		assert_eq!(vals[1], Value::Bool(true));
		assert_eq!(vals[2], Value::from(1.5));
		assert_eq!(vals[3], Value::from(2i64));
		assert_eq!(vals[4], Value::from("b"));
	}

	#[test]
	fn casting() {
		let v = Value::from("42").convert_to(&Kind::Int).unwrap();
		assert_eq!(v, Value::from(42i64));
		let v = Value::from(1.9).convert_to(&Kind::Int).unwrap();
		assert_eq!(v, Value::from(1i64));
		let v = Value::Null.convert_to(&Kind::Int).unwrap();
		assert_eq!(v, Value::Null);
		assert!(Value::Bool(true).convert_to(&Kind::Map).is_err());
	}

	#[test]
	fn json_round_trip() {
		let v = Value::Object(Object(map! {
			String::from("a") => Value::from(1i64),
			String::from("b") => Value::Array(vec![Value::Null, Value::from("x")].into()),
		}));
		let j = Json::from(v.clone());
		assert_eq!(Value::from(j), v);
	}
}
