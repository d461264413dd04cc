use super::common::{is_digit, keyword};
use super::error::{IResult, ParseError};
use crate::sql::{Number, Strand, Value};
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while, take_while1};
use nom::character::complete::char;
use nom::combinator::{map, opt, recognize, value};
use nom::sequence::{preceded, tuple};
use nom::Err;

/// The `NULL`, `TRUE` and `FALSE` literals
pub(super) fn constant(i: &str) -> IResult<&str, Value> {
	alt((
		value(Value::Null, keyword("NULL")),
		value(Value::Bool(true), keyword("TRUE")),
		value(Value::Bool(false), keyword("FALSE")),
	))(i)
}

/// An unsigned numeric literal, integer or float
pub(super) fn number(i: &str) -> IResult<&str, Number> {
	let (rest, text) = recognize(tuple((
		take_while1(is_digit),
		opt(preceded(char('.'), take_while1(is_digit))),
		opt(tuple((alt((tag("e"), tag("E"))), opt(alt((tag("+"), tag("-")))), take_while1(is_digit)))),
	)))(i)?;
	// Integers without a fraction or exponent stay integers
	if text.bytes().all(|b| b.is_ascii_digit()) {
		return match text.parse::<i64>() {
			Ok(v) => Ok((rest, Number::Int(v))),
			Err(error) => Err(Err::Failure(ParseError::ParseInt {
				tried: text,
				error,
			})),
		};
	}
	match text.parse::<f64>() {
		Ok(v) => Ok((rest, Number::Float(v))),
		Err(error) => Err(Err::Failure(ParseError::ParseFloat {
			tried: text,
			error,
		})),
	}
}

/// A double-quoted string literal. A doubled quote denotes a literal
/// quote character.
pub(super) fn string(i: &str) -> IResult<&str, Strand> {
	let (mut rest, _) = char('"')(i)?;
	let mut out = String::new();
	loop {
		let (r, chunk) = take_while(|c| c != '"')(rest)?;
		out.push_str(chunk);
		let (r, _) = char('"')(r)?;
		// A second quote directly after the closing one is an escape
		match char::<_, ParseError<&str>>('"')(r) {
			Ok((r, _)) => {
				out.push('"');
				rest = r;
			}
			Err(_) => return Ok((r, Strand::from(out))),
		}
	}
}

pub(super) fn literal(i: &str) -> IResult<&str, Value> {
	alt((constant, map(number, Value::Number), map(string, Value::Strand)))(i)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn numbers() {
		assert_eq!(number("42 ").unwrap().1, Number::Int(42));
		assert_eq!(number("2.5)").unwrap().1, Number::Float(2.5));
		assert_eq!(number("1e3,").unwrap().1, Number::Float(1000.0));
		assert_eq!(number("1.5e-2 ").unwrap().1, Number::Float(0.015));
	}

	#[test]
	fn strings() {
		assert_eq!(string(r#""cat""#).unwrap().1, Strand::from("cat"));
		assert_eq!(string(r#""a ""b"" c""#).unwrap().1, Strand::from(r#"a "b" c"#));
		assert_eq!(string(r#""""#).unwrap().1, Strand::from(""));
	}
}
