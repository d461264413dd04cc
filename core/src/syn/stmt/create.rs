use super::common::assignments;
use super::select::select_union;
use crate::sql::statements::{
	CreateSinkStatement, CreateSourceStatement, CreateStateStatement, CreateStreamStatement,
};
use crate::sql::Statement;
use crate::syn::common::{expected, ident, keyword, shouldbespace};
use crate::syn::error::IResult;
use nom::branch::alt;
use nom::combinator::{opt, value};

pub(super) fn create(i: &str) -> IResult<&str, Statement> {
	let (i, _) = keyword("CREATE")(i)?;
	let (i, _) = shouldbespace(i)?;
	alt((create_source, create_sink, create_state, create_stream))(i)
}

fn create_source(i: &str) -> IResult<&str, Statement> {
	let (i, _) = keyword("SOURCE")(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, paused) = opt(|i| {
		let (i, v) = alt((value(true, keyword("PAUSED")), value(false, keyword("UNPAUSED"))))(i)?;
		let (i, _) = shouldbespace(i)?;
		Ok((i, v))
	})(i)?;
	let (i, name) = expected("a source name", ident)(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, _) = expected("TYPE", keyword("TYPE"))(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, kind) = expected("a source type", ident)(i)?;
	let (i, params) = opt_with(i)?;
	Ok((
		i,
		Statement::CreateSource(CreateSourceStatement {
			paused,
			name,
			kind,
			params,
		}),
	))
}

fn create_sink(i: &str) -> IResult<&str, Statement> {
	let (i, _) = keyword("SINK")(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, name) = expected("a sink name", ident)(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, _) = expected("TYPE", keyword("TYPE"))(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, kind) = expected("a sink type", ident)(i)?;
	let (i, params) = opt_with(i)?;
	Ok((
		i,
		Statement::CreateSink(CreateSinkStatement {
			name,
			kind,
			params,
		}),
	))
}

fn create_state(i: &str) -> IResult<&str, Statement> {
	let (i, _) = keyword("STATE")(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, name) = expected("a state name", ident)(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, _) = expected("TYPE", keyword("TYPE"))(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, kind) = expected("a state type", ident)(i)?;
	let (i, params) = opt_with(i)?;
	Ok((
		i,
		Statement::CreateState(CreateStateStatement {
			name,
			kind,
			params,
		}),
	))
}

fn create_stream(i: &str) -> IResult<&str, Statement> {
	let (i, _) = keyword("STREAM")(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, name) = expected("a stream name", ident)(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, _) = expected("AS", keyword("AS"))(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, selects) = select_union(i)?;
	Ok((
		i,
		Statement::CreateStream(CreateStreamStatement {
			name,
			selects,
		}),
	))
}

fn opt_with(i: &str) -> IResult<&str, crate::sql::Assignments> {
	let (i, params) = opt(|i| {
		let (i, _) = shouldbespace(i)?;
		let (i, _) = keyword("WITH")(i)?;
		let (i, _) = shouldbespace(i)?;
		assignments(i)
	})(i)?;
	Ok((i, params.unwrap_or_default()))
}
