use crate::sql::{Assignments, Ident, Value};
use crate::syn::common::{commas, ident, mightbespace};
use crate::syn::error::IResult;
use crate::syn::value::expression;
use nom::character::complete::char;
use nom::multi::separated_list1;

/// One `key = value` pair of a WITH or SET clause
fn assignment(i: &str) -> IResult<&str, (Ident, Value)> {
	let (i, k) = ident(i)?;
	let (i, _) = mightbespace(i)?;
	let (i, _) = char('=')(i)?;
	let (i, _) = mightbespace(i)?;
	let (i, v) = expression(i)?;
	Ok((i, (k, v)))
}

/// A non-empty `key = value, ...` list
pub(super) fn assignments(i: &str) -> IResult<&str, Assignments> {
	let (i, v) = separated_list1(commas, assignment)(i)?;
	Ok((i, Assignments(v)))
}
