use crate::err::Error;
use crate::fnc;
use crate::fnc::Env;
use crate::sql::operator::Operator;
use crate::sql::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unary and binary operator expressions
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub enum Expression {
	Unary {
		o: Operator,
		v: Value,
	},
	Binary {
		l: Value,
		o: Operator,
		r: Value,
	},
}

impl Default for Expression {
	fn default() -> Expression {
		Expression::Binary {
			l: Value::Null,
			o: Operator::default(),
			r: Value::Null,
		}
	}
}

impl Expression {
	/// Create a new binary expression
	pub fn new(l: Value, o: Operator, r: Value) -> Self {
		Self::Binary {
			l,
			o,
			r,
		}
	}

	/// Whether any aggregate call occurs inside this expression
	pub(crate) fn has_aggregate(&self) -> bool {
		match self {
			Self::Unary {
				v,
				..
			} => v.has_aggregate(),
			Self::Binary {
				l,
				r,
				..
			} => l.has_aggregate() || r.has_aggregate(),
		}
	}

	/// Whether this expression references no input column
	pub(crate) fn is_foldable(&self) -> bool {
		match self {
			Self::Unary {
				v,
				..
			} => v.is_foldable(),
			Self::Binary {
				l,
				r,
				..
			} => l.is_foldable() && r.is_foldable(),
		}
	}

	/// Process this type returning a computed simple Value
	pub(crate) fn compute(&self, env: &Env) -> Result<Value, Error> {
		let (l, o, r) = match self {
			Self::Unary {
				o,
				v,
			} => {
				let operand = v.compute(env)?;
				return match o {
					Operator::Neg => fnc::operate::neg(operand),
					Operator::Not => fnc::operate::not(operand),
					Operator::IsNull => Ok(Value::Bool(operand.is_null())),
					Operator::IsNotNull => Ok(Value::Bool(!operand.is_null())),
					o => Err(Error::TypeMismatch {
						message: format!("'{o}' is not a unary operator"),
					}),
				};
			}
			Self::Binary {
				l,
				o,
				r,
			} => (l, o, r),
		};

		let l = l.compute(env)?;
		// Boolean shortcuts: a false AND and a true OR are decided by
		// the left operand alone, even if the right would be Null
		match o {
			Operator::And if l == Value::Bool(false) => return Ok(Value::Bool(false)),
			Operator::Or if l == Value::Bool(true) => return Ok(Value::Bool(true)),
			_ => {}
		}
		let r = r.compute(env)?;
		match o {
			Operator::Or => fnc::operate::or(l, r),
			Operator::And => fnc::operate::and(l, r),
			Operator::Add => fnc::operate::add(l, r),
			Operator::Sub => fnc::operate::sub(l, r),
			Operator::Mul => fnc::operate::mul(l, r),
			Operator::Div => fnc::operate::div(l, r),
			Operator::Rem => fnc::operate::rem(l, r),
			Operator::Concat => fnc::operate::concat(l, r),
			Operator::Equal => fnc::operate::equal(&l, &r),
			Operator::NotEqual => fnc::operate::not_equal(&l, &r),
			Operator::LessThan => fnc::operate::less_than(&l, &r),
			Operator::LessThanOrEqual => fnc::operate::less_than_or_equal(&l, &r),
			Operator::MoreThan => fnc::operate::more_than(&l, &r),
			Operator::MoreThanOrEqual => fnc::operate::more_than_or_equal(&l, &r),
			o => Err(Error::TypeMismatch {
				message: format!("'{o}' is not a binary operator"),
			}),
		}
	}
}

impl Expression {
	/// Returns the operator
	pub(crate) fn operator(&self) -> &Operator {
		match self {
			Expression::Unary {
				o,
				..
			} => o,
			Expression::Binary {
				o,
				..
			} => o,
		}
	}
}

/// Writes an operand, parenthesizing it when it binds less tightly than
/// the surrounding operator
fn fmt_operand(f: &mut fmt::Formatter, v: &Value, parent: u8, right: bool) -> fmt::Result {
	if let Value::Expression(e) = v {
		let p = e.operator().precedence();
		if p < parent || (p == parent && right) {
			return write!(f, "({v})");
		}
	}
	write!(f, "{v}")
}

impl fmt::Display for Expression {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Unary {
				o,
				v,
			} => match o.is_postfix() {
				true => {
					fmt_operand(f, v, o.precedence(), false)?;
					write!(f, " {o}")
				}
				false => {
					match o {
						Operator::Not => write!(f, "{o} ")?,
						_ => write!(f, "{o}")?,
					}
					fmt_operand(f, v, o.precedence(), false)
				}
			},
			Self::Binary {
				l,
				o,
				r,
			} => {
				fmt_operand(f, l, o.precedence(), false)?;
				write!(f, " {o} ")?;
				fmt_operand(f, r, o.precedence(), true)
			}
		}
	}
}
