use super::common::assignments;
use crate::sql::statements::{
	CreateFallback, CreateTrigger, LoadStateStatement, SaveStateStatement,
};
use crate::sql::Statement;
use crate::syn::common::{expected, ident, keyword, keyword2, shouldbespace};
use crate::syn::error::IResult;
use nom::branch::alt;
use nom::combinator::{opt, value};

pub(super) fn save_state(i: &str) -> IResult<&str, Statement> {
	let (i, _) = keyword("SAVE")(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, _) = expected("STATE", keyword("STATE"))(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, name) = expected("a state name", ident)(i)?;
	let (i, tag) = opt(tag_clause)(i)?;
	Ok((
		i,
		Statement::SaveState(SaveStateStatement {
			name,
			tag,
		}),
	))
}

fn tag_clause(i: &str) -> IResult<&str, crate::sql::Ident> {
	let (i, _) = shouldbespace(i)?;
	let (i, _) = keyword("TAG")(i)?;
	let (i, _) = shouldbespace(i)?;
	ident(i)
}

pub(super) fn load_state(i: &str) -> IResult<&str, Statement> {
	let (i, _) = keyword("LOAD")(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, _) = expected("STATE", keyword("STATE"))(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, name) = expected("a state name", ident)(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, _) = expected("TYPE", keyword("TYPE"))(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, kind) = expected("a state type", ident)(i)?;
	let (i, tag) = opt(tag_clause)(i)?;
	let (i, params) = opt(|i| {
		let (i, _) = shouldbespace(i)?;
		let (i, _) = keyword("SET")(i)?;
		let (i, _) = shouldbespace(i)?;
		assignments(i)
	})(i)?;
	let (i, create) = opt(|i| {
		let (i, _) = shouldbespace(i)?;
		let (i, _) = keyword("OR")(i)?;
		let (i, _) = shouldbespace(i)?;
		let (i, _) = expected("CREATE", keyword("CREATE"))(i)?;
		let (i, _) = shouldbespace(i)?;
		let (i, _) = expected("IF NOT", keyword2("IF", "NOT"))(i)?;
		let (i, _) = shouldbespace(i)?;
		let (i, trigger) = expected(
			"SAVED or EXISTS",
			alt((
				value(CreateTrigger::NotSaved, keyword("SAVED")),
				value(CreateTrigger::NotExists, keyword("EXISTS")),
			)),
		)(i)?;
		let (i, params) = opt(|i| {
			let (i, _) = shouldbespace(i)?;
			let (i, _) = keyword("WITH")(i)?;
			let (i, _) = shouldbespace(i)?;
			assignments(i)
		})(i)?;
		Ok((
			i,
			CreateFallback {
				trigger,
				params: params.unwrap_or_default(),
			},
		))
	})(i)?;
	Ok((
		i,
		Statement::LoadState(LoadStateStatement {
			name,
			kind,
			tag,
			params: params.unwrap_or_default(),
			create,
		}),
	))
}
