use super::common::{ident, take_i64};
use super::error::{IResult, ParseError};
use super::literal::string;
use crate::sql::{Idiom, Part};
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::{map, opt};
use nom::multi::many0;
use nom::Err;

/// One continuation step of a path. Paths are written without internal
/// whitespace.
fn part(i: &str) -> IResult<&str, Part> {
	alt((descend, field, key, bracketed))(i)
}

fn descend(i: &str) -> IResult<&str, Part> {
	let (i, _) = tag("..")(i)?;
	let (i, v) = ident(i)?;
	Ok((i, Part::Descend(v)))
}

fn field(i: &str) -> IResult<&str, Part> {
	let (i, _) = char('.')(i)?;
	let (i, v) = ident(i)?;
	Ok((i, Part::Field(v)))
}

fn key(i: &str) -> IResult<&str, Part> {
	let (i, _) = char('.')(i)?;
	let (i, v) = string(i)?;
	Ok((i, Part::Key(v)))
}

fn bracketed(i: &str) -> IResult<&str, Part> {
	let (i, _) = char('[')(i)?;
	let (i, v) = alt((slice, map(take_i64, Part::Index)))(i)?;
	let (i, _) = match char::<_, ParseError<&str>>(']')(i) {
		Ok(v) => v,
		Err(_) => {
			return Err(Err::Failure(ParseError::Expected {
				tried: i,
				expected: "a closing ']'",
			}))
		}
	};
	Ok((i, v))
}

fn slice(i: &str) -> IResult<&str, Part> {
	let (i, from) = opt(take_i64)(i)?;
	let (i, _) = char(':')(i)?;
	let (i, to) = opt(take_i64)(i)?;
	Ok((i, Part::Slice(from, to)))
}

/// A column reference, optionally qualified with its input alias, as in
/// `a:v.sub[0]`
pub(super) fn idiom(i: &str) -> IResult<&str, Idiom> {
	let (i, first) = ident(i)?;
	// A directly attached colon qualifies the path with an input name
	let (i, input, head) = match char::<_, ParseError<&str>>(':')(i) {
		Ok((j, _)) => match ident(j) {
			Ok((j, head)) => (j, Some(first), head),
			// Not followed by a path, so the colon is not ours
			Err(_) => (i, None, first),
		},
		Err(_) => (i, None, first),
	};
	let mut parts = vec![Part::Field(head)];
	let (i, rest) = many0(part)(i)?;
	parts.extend(rest);
	Ok((i, Idiom::new(input, parts)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sql::{Ident, Strand};

	#[test]
	fn plain_path() {
		let (rest, v) = idiom("a.b[0] ").unwrap();
		assert_eq!(rest, " ");
		assert_eq!(v.input, None);
		assert_eq!(
			v.parts,
			vec![Part::Field(Ident::from("a")), Part::Field(Ident::from("b")), Part::Index(0)]
		);
	}

	#[test]
	fn qualified_path() {
		let (_, v) = idiom("a:v").unwrap();
		assert_eq!(v.input, Some(Ident::from("a")));
		assert_eq!(v.parts, vec![Part::Field(Ident::from("v"))]);
	}

	#[test]
	fn quoted_key_and_slices() {
		let (_, v) = idiom(r#"a."quoted key"[1:2]"#).unwrap();
		assert_eq!(
			v.parts,
			vec![
				Part::Field(Ident::from("a")),
				Part::Key(Strand::from("quoted key")),
				Part::Slice(Some(1), Some(2)),
			]
		);
		let (_, v) = idiom("a[:]").unwrap();
		assert_eq!(v.parts, vec![Part::Field(Ident::from("a")), Part::Slice(None, None)]);
	}

	#[test]
	fn descend_path() {
		let (_, v) = idiom("doc..name").unwrap();
		assert_eq!(
			v.parts,
			vec![Part::Field(Ident::from("doc")), Part::Descend(Ident::from("name"))]
		);
	}

	#[test]
	fn round_trip_rendering() {
		for text in ["a.b[0]", r#"a."quoted key""#, "a:v.sub", "doc..name", "a[1:]", "a[:2]"] {
			let (_, v) = idiom(text).unwrap();
			assert_eq!(v.to_string(), text);
		}
	}
}
