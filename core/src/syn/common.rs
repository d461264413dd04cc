use super::error::{IResult, ParseError};
use crate::sql::Ident;
use nom::branch::alt;
use nom::bytes::complete::{tag, tag_no_case, take_while, take_while1};
use nom::character::complete::{char, multispace1, not_line_ending};
use nom::combinator::{map_res, peek, value};
use nom::multi::many0;
use nom::Err;

#[inline]
pub(super) fn is_digit(chr: char) -> bool {
	chr.is_ascii_digit()
}

#[inline]
pub(super) fn val_char(chr: char) -> bool {
	chr.is_ascii_alphanumeric() || chr == '_'
}

/// A single-line comment, from `--` to the end of the line
fn comment(i: &str) -> IResult<&str, ()> {
	let (i, _) = tag("--")(i)?;
	let (i, _) = not_line_ending(i)?;
	Ok((i, ()))
}

/// Optional whitespace, including comments
pub(super) fn mightbespace(i: &str) -> IResult<&str, ()> {
	value((), many0(alt((value((), multispace1), comment))))(i)
}

/// Required whitespace, including comments
pub(super) fn shouldbespace(i: &str) -> IResult<&str, ()> {
	let (i, _) = alt((value((), multispace1), comment))(i)?;
	mightbespace(i)
}

/// A comma with optional surrounding whitespace
pub(super) fn commas(i: &str) -> IResult<&str, ()> {
	let (i, _) = mightbespace(i)?;
	let (i, _) = char(',')(i)?;
	let (i, _) = mightbespace(i)?;
	Ok((i, ()))
}

/// A case-insensitive keyword, terminated at a word boundary
pub(super) fn keyword(word: &'static str) -> impl Fn(&str) -> IResult<&str, &str> {
	move |i| {
		let (i, v) = tag_no_case(word)(i)?;
		// The keyword must not run into a following identifier character
		if i.chars().next().is_some_and(val_char) {
			return Err(Err::Error(ParseError::Expected {
				tried: i,
				expected: word,
			}));
		}
		Ok((i, v))
	}
}

/// Two keywords separated by whitespace
pub(super) fn keyword2(
	first: &'static str,
	second: &'static str,
) -> impl Fn(&str) -> IResult<&str, ()> {
	move |i| {
		let (i, _) = keyword(first)(i)?;
		let (i, _) = shouldbespace(i)?;
		let (i, _) = keyword(second)(i)?;
		Ok((i, ()))
	}
}

/// An identifier: an ASCII letter followed by letters, digits or
/// underscores
pub(super) fn ident(i: &str) -> IResult<&str, Ident> {
	let (i, _) = peek(take_while1(|c: char| c.is_ascii_alphabetic()))(i)?;
	let (i, v) = take_while1(val_char)(i)?;
	Ok((i, Ident::from(v)))
}

/// An unsigned 64-bit integer
pub(super) fn take_u64(i: &str) -> IResult<&str, u64> {
	map_res(take_while1(is_digit), |s: &str| s.parse::<u64>())(i)
}

/// A signed 64-bit integer
pub(super) fn take_i64(i: &str) -> IResult<&str, i64> {
	let (i, neg) = nom::combinator::opt(char('-'))(i)?;
	let (i, v) = map_res(take_while1(is_digit), |s: &str| s.parse::<i64>())(i)?;
	Ok((
		i,
		match neg {
			Some(_) => v.wrapping_neg(),
			None => v,
		},
	))
}

/// Consumes input as long as it is digits, for lookahead decisions
pub(super) fn peek_digit(i: &str) -> IResult<&str, &str> {
	peek(take_while(is_digit))(i)
}

/// Expects a parser to succeed, upgrading a soft error into a failure
/// carrying the expectation
pub(super) fn expected<'a, O>(
	expected: &'static str,
	mut parser: impl FnMut(&'a str) -> IResult<&'a str, O>,
) -> impl FnMut(&'a str) -> IResult<&'a str, O> {
	move |i| match parser(i) {
		Err(Err::Error(_)) => Err(Err::Failure(ParseError::Expected {
			tried: i,
			expected,
		})),
		r => r,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn keywords_stop_at_word_boundaries() {
		assert!(keyword("SELECT")("SELECT x").is_ok());
		assert!(keyword("SELECT")("select x").is_ok());
		assert!(keyword("SELECT")("SELECTx").is_err());
	}

	#[test]
	fn comments_are_whitespace() {
		let (rest, _) = mightbespace("-- a comment\n  next").unwrap();
		assert_eq!(rest, "next");
	}

	#[test]
	fn identifiers() {
		let (rest, v) = ident("abc_1 rest").unwrap();
		assert_eq!(v.as_str(), "abc_1");
		assert_eq!(rest, " rest");
		assert!(ident("1abc").is_err());
		assert!(ident("_abc").is_err());
	}
}
