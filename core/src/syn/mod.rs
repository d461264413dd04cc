//! The BQL parser, built from nom combinators. Parsing and rendering are
//! inverse to each other: displaying a parsed statement reproduces an
//! equivalent canonical form of the input.

use crate::err::Error;
use crate::sql::{Query, Statements, Value};
use nom::Err;

mod common;
mod error;
mod idiom;
mod literal;
mod stmt;
mod value;

pub(crate) use error::IResult;

/// Parses a BQL script into a [`Query`]
pub fn parse(input: &str) -> Result<Query, Error> {
	parse_impl(input, stmt::statements).map(|v| Query(Statements(v)))
}

/// Parses a single BQL expression into an unevaluated [`Value`]
pub fn value(input: &str) -> Result<Value, Error> {
	parse_impl(input, value::expression)
}

fn parse_impl<O>(
	input: &str,
	parser: impl Fn(&str) -> IResult<&str, O>,
) -> Result<O, Error> {
	// Check the length of the input
	if input.trim().is_empty() {
		return Err(Error::QueryEmpty);
	}
	match parser(input) {
		Ok((rest, v)) => {
			// The parser must consume the entire input
			let (rest, _) = common::mightbespace(rest).unwrap_or((rest, ()));
			if rest.is_empty() {
				Ok(v)
			} else {
				let (line, col) = error::locate(input, rest);
				Err(Error::Syntax {
					line,
					col,
					message: String::from(
						"unexpected trailing input, perhaps a missing semicolon?",
					),
				})
			}
		}
		Err(Err::Error(e)) | Err(Err::Failure(e)) => {
			let tried = e.tried();
			let (line, col) = error::locate(input, tried);
			Err(Error::Syntax {
				line,
				col,
				message: e.explain(),
			})
		}
		Err(Err::Incomplete(_)) => Err(Error::Syntax {
			line: 1,
			col: 1,
			message: String::from("incomplete input"),
		}),
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn parse_and_restore_text() {
		for text in ["SELECT ISTREAM a, b", "SELECT ISTREAM a, b WHERE c"] {
			let q = parse(text).unwrap();
			assert_eq!(q.len(), 1);
			assert_eq!(q[0].to_string(), text);
		}
	}

	#[test]
	fn statement_terminators() {
		assert!(parse("SELECT ISTREAM a").is_ok());
		assert!(parse("SELECT ISTREAM a;").is_ok());
		let q = parse("SELECT ISTREAM a; SELECT DSTREAM b;").unwrap();
		assert_eq!(q.len(), 2);
		// Multi-statement input requires terminators
		assert!(parse("SELECT ISTREAM a SELECT DSTREAM b").is_err());
	}

	#[test]
	fn syntax_errors_carry_location() {
		let err = parse("SELECT WRONG a").unwrap_err();
		match err {
			Error::Syntax {
				line,
				col,
				..
			} => {
				assert_eq!(line, 1);
				assert!(col > 1);
			}
			e => panic!("unexpected error: {e}"),
		}
	}

	#[test]
	fn comments_are_ignored() {
		let q = parse("-- leading comment\nSELECT ISTREAM a -- trailing\n").unwrap();
		assert_eq!(q.len(), 1);
	}

	#[test]
	fn full_surface_round_trips() {
		for text in [
			"SELECT RSTREAM LIMIT 5 EVERY 2ND TUPLE a FROM x [RANGE 2 TUPLES] AS a",
			"SELECT DSTREAM SAMPLE 25% * FROM x [RANGE 3 SECONDS]",
			"SELECT ISTREAM count(*) AS c FROM x [RANGE 2 TUPLES] GROUP BY k HAVING count(*) > 1",
			"CREATE SOURCE PAUSED s TYPE dummy WITH num = 10",
			"CREATE SINK snk TYPE collector",
			"CREATE STATE st TYPE counter WITH start = 0",
			"CREATE STREAM y AS SELECT ISTREAM a FROM x [RANGE 1 TUPLES]",
			"UPDATE SOURCE s SET num = 20",
			"DROP STREAM y",
			"INSERT INTO snk FROM y",
			"PAUSE SOURCE s",
			"RESUME SOURCE s",
			"REWIND SOURCE s",
			"SAVE STATE st TAG v1",
			"LOAD STATE st TYPE counter TAG v1 OR CREATE IF NOT SAVED WITH start = 0",
			"EVAL 1 + 2",
			r#"EVAL a ON {"a": 7}"#,
		] {
			let q = parse(text).unwrap_or_else(|e| panic!("failed to parse {text}: {e}"));
			assert_eq!(q.len(), 1, "{text}");
			let rendered = q[0].to_string();
			let again = parse(&rendered)
				.unwrap_or_else(|e| panic!("failed to re-parse {rendered}: {e}"));
			assert_eq!(q[0], again[0], "{text} != {rendered}");
		}
	}
}
