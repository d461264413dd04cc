use crate::sql::Statement;
use crate::syn::common::mightbespace;
use crate::syn::error::{IResult, ParseError};
use nom::branch::alt;
use nom::character::complete::char;
use nom::combinator::opt;
use nom::multi::many1;
use nom::Err;

mod common;
mod create;
mod select;
mod simple;
mod state;

/// One or more semicolons, each a statement terminator
fn colons(i: &str) -> IResult<&str, ()> {
	let (i, _) = mightbespace(i)?;
	let (i, _) = many1(char(';'))(i)?;
	let (i, _) = mightbespace(i)?;
	Ok((i, ()))
}

/// A single statement of any kind
pub(super) fn statement(i: &str) -> IResult<&str, Statement> {
	match alt((
		select::select_statement,
		create::create,
		simple::update,
		simple::drop,
		simple::insert,
		simple::pause,
		simple::resume,
		simple::rewind,
		state::save_state,
		state::load_state,
		simple::eval,
	))(i)
	{
		Err(Err::Error(_)) => Err(Err::Failure(ParseError::Expected {
			tried: i,
			expected: "a statement",
		})),
		r => r,
	}
}

/// A whole script: statements separated by semicolons, with the final
/// terminator optional
pub(super) fn statements(i: &str) -> IResult<&str, Vec<Statement>> {
	let (i, _) = mightbespace(i)?;
	let (i, v) = nom::multi::separated_list1(colons, statement)(i)?;
	let (i, _) = opt(colons)(i)?;
	Ok((i, v))
}
