use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary and unary operators
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub enum Operator {
	/// `OR`
	Or,
	/// `AND`
	And,
	/// `NOT`, unary
	Not,
	/// `=`
	#[default]
	Equal,
	/// `!=` (also written `<>`)
	NotEqual,
	/// `<`
	LessThan,
	/// `<=`
	LessThanOrEqual,
	/// `>`
	MoreThan,
	/// `>=`
	MoreThanOrEqual,
	/// `+`
	Add,
	/// `-`
	Sub,
	/// `*`
	Mul,
	/// `/`
	Div,
	/// `%`
	Rem,
	/// `||` string concatenation
	Concat,
	/// `-`, unary
	Neg,
	/// `IS NULL`, unary postfix
	IsNull,
	/// `IS NOT NULL`, unary postfix
	IsNotNull,
}

impl Operator {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Or => "OR",
			Self::And => "AND",
			Self::Not => "NOT",
			Self::Equal => "=",
			Self::NotEqual => "!=",
			Self::LessThan => "<",
			Self::LessThanOrEqual => "<=",
			Self::MoreThan => ">",
			Self::MoreThanOrEqual => ">=",
			Self::Add => "+",
			Self::Sub => "-",
			Self::Mul => "*",
			Self::Div => "/",
			Self::Rem => "%",
			Self::Concat => "||",
			Self::Neg => "-",
			Self::IsNull => "IS NULL",
			Self::IsNotNull => "IS NOT NULL",
		}
	}

	/// Whether this operator is written after its single operand
	pub fn is_postfix(&self) -> bool {
		matches!(self, Self::IsNull | Self::IsNotNull)
	}

	/// The binding strength of this operator. Used when rendering nested
	/// expressions, so that an operand which binds less tightly than its
	/// parent is wrapped in parentheses.
	pub(crate) fn precedence(&self) -> u8 {
		match self {
			Self::Or => 1,
			Self::And => 2,
			Self::Not => 3,
			Self::Equal
			| Self::NotEqual
			| Self::LessThan
			| Self::LessThanOrEqual
			| Self::MoreThan
			| Self::MoreThanOrEqual
			| Self::IsNull
			| Self::IsNotNull => 4,
			Self::Add | Self::Sub | Self::Concat => 5,
			Self::Mul | Self::Div | Self::Rem => 6,
			Self::Neg => 7,
		}
	}
}

impl fmt::Display for Operator {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
