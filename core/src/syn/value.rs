use super::common::{commas, expected, ident, keyword, mightbespace, shouldbespace};
use super::error::{IResult, ParseError};
use super::idiom::idiom;
use super::literal::{literal, string};
use crate::sql::{Array, Case, Cast, Expression, Function, Kind, Object, Operator, Value};
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::{cut, map, opt, value};
use nom::multi::{many0, separated_list0, separated_list1};
use nom::sequence::preceded;

/// A full expression, at the loosest precedence level
pub(super) fn expression(i: &str) -> IResult<&str, Value> {
	or_expr(i)
}

/// A closing delimiter, upgraded to a failure when missing
fn closing(c: char) -> impl Fn(&str) -> IResult<&str, char> {
	move |i| match char::<_, ParseError<&str>>(c)(i) {
		Err(_) => Err(nom::Err::Failure(ParseError::Expected {
			tried: i,
			expected: "a closing delimiter",
		})),
		r => r,
	}
}

fn binary_fold(first: Value, rest: Vec<(Operator, Value)>) -> Value {
	rest.into_iter().fold(first, |l, (o, r)| Value::from(Expression::new(l, o, r)))
}

fn or_expr(i: &str) -> IResult<&str, Value> {
	let (i, first) = and_expr(i)?;
	let (i, rest) = many0(|i| {
		let (i, _) = shouldbespace(i)?;
		let (i, _) = keyword("OR")(i)?;
		let (i, _) = shouldbespace(i)?;
		let (i, r) = and_expr(i)?;
		Ok((i, (Operator::Or, r)))
	})(i)?;
	Ok((i, binary_fold(first, rest)))
}

fn and_expr(i: &str) -> IResult<&str, Value> {
	let (i, first) = not_expr(i)?;
	let (i, rest) = many0(|i| {
		let (i, _) = shouldbespace(i)?;
		let (i, _) = keyword("AND")(i)?;
		let (i, _) = shouldbespace(i)?;
		let (i, r) = not_expr(i)?;
		Ok((i, (Operator::And, r)))
	})(i)?;
	Ok((i, binary_fold(first, rest)))
}

fn not_expr(i: &str) -> IResult<&str, Value> {
	match keyword("NOT")(i) {
		Ok((i, _)) => {
			let (i, _) = shouldbespace(i)?;
			let (i, v) = not_expr(i)?;
			Ok((
				i,
				Value::from(Expression::Unary {
					o: Operator::Not,
					v,
				}),
			))
		}
		Err(_) => comparison(i),
	}
}

fn comparison_op(i: &str) -> IResult<&str, Operator> {
	let (i, _) = mightbespace(i)?;
	alt((
		value(Operator::LessThanOrEqual, tag("<=")),
		value(Operator::MoreThanOrEqual, tag(">=")),
		value(Operator::NotEqual, tag("!=")),
		value(Operator::NotEqual, tag("<>")),
		value(Operator::LessThan, tag("<")),
		value(Operator::MoreThan, tag(">")),
		value(Operator::Equal, tag("=")),
	))(i)
}

fn comparison(i: &str) -> IResult<&str, Value> {
	let (i, l) = additive(i)?;
	// IS NULL / IS NOT NULL postfix tests
	if let Ok((j, _)) = preceded(shouldbespace, keyword("IS"))(i) {
		let (j, _) = shouldbespace(j)?;
		let (j, not) = opt(|j| {
			let (j, _) = keyword("NOT")(j)?;
			let (j, _) = shouldbespace(j)?;
			Ok((j, ()))
		})(j)?;
		let (j, _) = expected("NULL", keyword("NULL"))(j)?;
		let o = match not {
			Some(_) => Operator::IsNotNull,
			None => Operator::IsNull,
		};
		return Ok((
			j,
			Value::from(Expression::Unary {
				o,
				v: l,
			}),
		));
	}
	match comparison_op(i) {
		Ok((i, o)) => {
			let (i, _) = mightbespace(i)?;
			let (i, r) = additive(i)?;
			Ok((i, Value::from(Expression::new(l, o, r))))
		}
		Err(_) => Ok((i, l)),
	}
}

fn additive_op(i: &str) -> IResult<&str, Operator> {
	let (i, _) = mightbespace(i)?;
	alt((
		value(Operator::Concat, tag("||")),
		value(Operator::Add, tag("+")),
		value(Operator::Sub, tag("-")),
	))(i)
}

fn additive(i: &str) -> IResult<&str, Value> {
	let (i, first) = multiplicative(i)?;
	let (i, rest) = many0(|i| {
		let (i, o) = additive_op(i)?;
		let (i, _) = mightbespace(i)?;
		let (i, r) = multiplicative(i)?;
		Ok((i, (o, r)))
	})(i)?;
	Ok((i, binary_fold(first, rest)))
}

fn multiplicative_op(i: &str) -> IResult<&str, Operator> {
	let (i, _) = mightbespace(i)?;
	alt((
		value(Operator::Mul, tag("*")),
		value(Operator::Div, tag("/")),
		value(Operator::Rem, tag("%")),
	))(i)
}

fn multiplicative(i: &str) -> IResult<&str, Value> {
	let (i, first) = unary(i)?;
	let (i, rest) = many0(|i| {
		let (i, o) = multiplicative_op(i)?;
		let (i, _) = mightbespace(i)?;
		let (i, r) = unary(i)?;
		Ok((i, (o, r)))
	})(i)?;
	Ok((i, binary_fold(first, rest)))
}

fn unary(i: &str) -> IResult<&str, Value> {
	match char::<_, ParseError<&str>>('-')(i) {
		Ok((i, _)) => {
			let (i, _) = mightbespace(i)?;
			let (i, v) = unary(i)?;
			Ok((
				i,
				Value::from(Expression::Unary {
					o: Operator::Neg,
					v,
				}),
			))
		}
		Err(_) => primary(i),
	}
}

fn primary(i: &str) -> IResult<&str, Value> {
	alt((
		cast_expr,
		case_expr,
		literal,
		parenthesised,
		array_literal,
		map_literal,
		function_value,
		map(idiom, Value::from),
	))(i)
}

fn parenthesised(i: &str) -> IResult<&str, Value> {
	let (i, _) = char('(')(i)?;
	let (i, _) = mightbespace(i)?;
	let (i, v) = cut(expression)(i)?;
	let (i, _) = mightbespace(i)?;
	let (i, _) = closing(')')(i)?;
	Ok((i, v))
}

fn array_literal(i: &str) -> IResult<&str, Value> {
	let (i, _) = char('[')(i)?;
	let (i, _) = mightbespace(i)?;
	let (i, items) = separated_list0(commas, expression)(i)?;
	let (i, _) = mightbespace(i)?;
	let (i, _) = closing(']')(i)?;
	Ok((i, Value::Array(Array::from(items))))
}

fn map_entry(i: &str) -> IResult<&str, (String, Value)> {
	let (i, k) = alt((map(string, |s| s.0), map(ident, |v| v.to_raw())))(i)?;
	let (i, _) = mightbespace(i)?;
	let (i, _) = char(':')(i)?;
	let (i, _) = mightbespace(i)?;
	let (i, v) = expression(i)?;
	Ok((i, (k, v)))
}

fn map_literal(i: &str) -> IResult<&str, Value> {
	let (i, _) = char('{')(i)?;
	let (i, _) = mightbespace(i)?;
	let (i, entries) = separated_list0(commas, map_entry)(i)?;
	let (i, _) = mightbespace(i)?;
	let (i, _) = closing('}')(i)?;
	Ok((i, Value::Object(entries.into_iter().collect::<Object>())))
}

pub(super) fn kind(i: &str) -> IResult<&str, Kind> {
	alt((
		value(Kind::Bool, keyword("BOOL")),
		value(Kind::Int, keyword("INT")),
		value(Kind::Float, keyword("FLOAT")),
		value(Kind::String, keyword("STRING")),
		value(Kind::Blob, keyword("BLOB")),
		value(Kind::Timestamp, keyword("TIMESTAMP")),
		value(Kind::Array, keyword("ARRAY")),
		value(Kind::Map, keyword("MAP")),
	))(i)
}

fn cast_expr(i: &str) -> IResult<&str, Value> {
	let (i, _) = keyword("CAST")(i)?;
	let (i, _) = mightbespace(i)?;
	let (i, _) = char('(')(i)?;
	let (i, _) = mightbespace(i)?;
	let (i, v) = cut(expression)(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, _) = expected("AS", keyword("AS"))(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, k) = expected("a type name", kind)(i)?;
	let (i, _) = mightbespace(i)?;
	let (i, _) = closing(')')(i)?;
	Ok((i, Value::from(Cast(v, k))))
}

fn case_when(i: &str) -> IResult<&str, (Value, Value)> {
	let (i, _) = keyword("WHEN")(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, w) = cut(expression)(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, _) = expected("THEN", keyword("THEN"))(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, t) = cut(expression)(i)?;
	Ok((i, (w, t)))
}

fn case_expr(i: &str) -> IResult<&str, Value> {
	let (i, _) = keyword("CASE")(i)?;
	let (i, _) = shouldbespace(i)?;
	// Unless the first arm starts right away, the simple form's subject
	// expression comes before the first WHEN
	let (i, subject) = match keyword("WHEN")(i) {
		Ok(_) => (i, None),
		Err(_) => {
			let (i, v) = cut(expression)(i)?;
			let (i, _) = shouldbespace(i)?;
			(i, Some(v))
		}
	};
	let (i, whens) = separated_list1(shouldbespace, case_when)(i)?;
	let (i, other) = opt(|i| {
		let (i, _) = shouldbespace(i)?;
		let (i, _) = keyword("ELSE")(i)?;
		let (i, _) = shouldbespace(i)?;
		cut(expression)(i)
	})(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, _) = expected("END", keyword("END"))(i)?;
	Ok((
		i,
		Value::from(Case {
			expr: subject,
			whens,
			other,
		}),
	))
}

/// A function call. A `*` argument marks a whole-row aggregate, as in
/// `count(*)`.
pub(super) fn function_call(i: &str) -> IResult<&str, Function> {
	let (i, name) = ident(i)?;
	let (i, _) = mightbespace(i)?;
	let (i, _) = char('(')(i)?;
	let (i, _) = mightbespace(i)?;
	if let Ok((i, _)) = char::<_, ParseError<&str>>('*')(i) {
		let (i, _) = mightbespace(i)?;
		let (i, _) = closing(')')(i)?;
		let mut f = Function::new(name, vec![]);
		f.star = true;
		return Ok((i, f));
	}
	let (i, args) = separated_list0(commas, expression)(i)?;
	let (i, _) = mightbespace(i)?;
	let (i, _) = closing(')')(i)?;
	Ok((i, Function::new(name, args)))
}

fn function_value(i: &str) -> IResult<&str, Value> {
	map(function_call, Value::from)(i)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(i: &str) -> Value {
		let (rest, v) = expression(i).unwrap();
		assert!(rest.trim().is_empty(), "unparsed input: {rest}");
		v
	}

	#[test]
	fn precedence() {
		assert_eq!(parse("1 + 2 * 3").to_string(), "1 + 2 * 3");
		assert_eq!(parse("(1 + 2) * 3").to_string(), "(1 + 2) * 3");
		assert_eq!(parse("a AND b OR c").to_string(), "a AND b OR c");
		assert_eq!(parse("NOT a AND b").to_string(), "NOT a AND b");
	}

	#[test]
	fn null_tests() {
		assert_eq!(parse("a IS NULL").to_string(), "a IS NULL");
		assert_eq!(parse("a IS NOT NULL").to_string(), "a IS NOT NULL");
	}

	#[test]
	fn functions_and_aggregates() {
		assert_eq!(parse("count(*)").to_string(), "count(*)");
		assert_eq!(parse("avg(price)").to_string(), "avg(price)");
	}

	#[test]
	fn case_forms() {
		assert_eq!(
			parse("CASE WHEN a THEN 1 ELSE 2 END").to_string(),
			"CASE WHEN a THEN 1 ELSE 2 END"
		);
		assert_eq!(parse("CASE x WHEN 1 THEN TRUE END").to_string(), "CASE x WHEN 1 THEN TRUE END");
	}

	#[test]
	fn casts() {
		assert_eq!(parse(r#"CAST("1" AS INT)"#).to_string(), r#"CAST("1" AS INT)"#);
	}

	#[test]
	fn collections() {
		assert_eq!(parse("[1, 2, 3]").to_string(), "[1, 2, 3]");
		assert_eq!(parse(r#"{"a": 1, "b c": 2}"#).to_string(), r#"{a: 1, "b c": 2}"#);
	}

	#[test]
	fn qualified_columns() {
		assert_eq!(parse("a:v + b:v").to_string(), "a:v + b:v");
	}
}
