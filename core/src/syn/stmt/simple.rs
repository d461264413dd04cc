use super::common::assignments;
use crate::sql::statements::{
	DropStatement, DropTarget, EvalStatement, InsertStatement, PauseSourceStatement,
	ResumeSourceStatement, RewindSourceStatement, UpdateStatement, UpdateTarget,
};
use crate::sql::Statement;
use crate::syn::common::{expected, ident, keyword, shouldbespace};
use crate::syn::error::IResult;
use crate::syn::value::expression;
use nom::branch::alt;
use nom::combinator::{opt, value};

pub(super) fn update(i: &str) -> IResult<&str, Statement> {
	let (i, _) = keyword("UPDATE")(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, target) = expected(
		"STATE, SOURCE or SINK",
		alt((
			value(UpdateTarget::State, keyword("STATE")),
			value(UpdateTarget::Source, keyword("SOURCE")),
			value(UpdateTarget::Sink, keyword("SINK")),
		)),
	)(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, name) = expected("a name", ident)(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, _) = expected("SET", keyword("SET"))(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, params) = assignments(i)?;
	Ok((
		i,
		Statement::Update(UpdateStatement {
			target,
			name,
			params,
		}),
	))
}

pub(super) fn drop(i: &str) -> IResult<&str, Statement> {
	let (i, _) = keyword("DROP")(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, target) = expected(
		"SOURCE, STREAM, SINK or STATE",
		alt((
			value(DropTarget::Source, keyword("SOURCE")),
			value(DropTarget::Stream, keyword("STREAM")),
			value(DropTarget::Sink, keyword("SINK")),
			value(DropTarget::State, keyword("STATE")),
		)),
	)(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, name) = expected("a name", ident)(i)?;
	Ok((
		i,
		Statement::Drop(DropStatement {
			target,
			name,
		}),
	))
}

pub(super) fn insert(i: &str) -> IResult<&str, Statement> {
	let (i, _) = keyword("INSERT")(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, _) = expected("INTO", keyword("INTO"))(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, sink) = expected("a sink name", ident)(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, _) = expected("FROM", keyword("FROM"))(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, from) = expected("a stream name", ident)(i)?;
	Ok((
		i,
		Statement::Insert(InsertStatement {
			sink,
			from,
		}),
	))
}

pub(super) fn pause(i: &str) -> IResult<&str, Statement> {
	let (i, _) = keyword("PAUSE")(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, _) = expected("SOURCE", keyword("SOURCE"))(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, name) = expected("a source name", ident)(i)?;
	Ok((
		i,
		Statement::PauseSource(PauseSourceStatement {
			name,
		}),
	))
}

pub(super) fn resume(i: &str) -> IResult<&str, Statement> {
	let (i, _) = keyword("RESUME")(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, _) = expected("SOURCE", keyword("SOURCE"))(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, name) = expected("a source name", ident)(i)?;
	Ok((
		i,
		Statement::ResumeSource(ResumeSourceStatement {
			name,
		}),
	))
}

pub(super) fn rewind(i: &str) -> IResult<&str, Statement> {
	let (i, _) = keyword("REWIND")(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, _) = expected("SOURCE", keyword("SOURCE"))(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, name) = expected("a source name", ident)(i)?;
	Ok((
		i,
		Statement::RewindSource(RewindSourceStatement {
			name,
		}),
	))
}

pub(super) fn eval(i: &str) -> IResult<&str, Statement> {
	let (i, _) = keyword("EVAL")(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, expr) = expression(i)?;
	let (i, on) = opt(|i| {
		let (i, _) = shouldbespace(i)?;
		let (i, _) = keyword("ON")(i)?;
		let (i, _) = shouldbespace(i)?;
		expression(i)
	})(i)?;
	Ok((
		i,
		Statement::Eval(EvalStatement {
			expr,
			on,
		}),
	))
}
