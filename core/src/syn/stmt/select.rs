use crate::syn::common::{
	commas, expected, ident, keyword, keyword2, mightbespace, shouldbespace, take_i64, take_u64,
};
use crate::syn::error::{IResult, ParseError};
use crate::syn::value::{expression, function_call};
use crate::sql::statements::{SelectStatement, SelectUnionStatement};
use crate::sql::{
	Cond, DropHint, Emitter, EmitterKind, Field, Fields, Groups, Having, Relation, RelationSource,
	SampleUnit, Sampling, Window,
};
use nom::branch::alt;
use nom::bytes::complete::tag_no_case;
use nom::character::complete::char;
use nom::combinator::{map, opt, value};
use nom::multi::separated_list1;

fn emitter_kind(i: &str) -> IResult<&str, EmitterKind> {
	alt((
		value(EmitterKind::IStream, keyword("ISTREAM")),
		value(EmitterKind::DStream, keyword("DSTREAM")),
		value(EmitterKind::RStream, keyword("RSTREAM")),
	))(i)
}

/// The optional ordinal suffix of a count, as in `2ND` or `3-RD`
fn ordinal_suffix(i: &str) -> IResult<&str, ()> {
	let (i, _) = opt(char('-'))(i)?;
	let (i, _) = alt((tag_no_case("ST"), tag_no_case("ND"), tag_no_case("RD"), tag_no_case("TH")))(i)?;
	Ok((i, ()))
}

fn sampling(i: &str) -> IResult<&str, Sampling> {
	alt((sample_percent, sample_every))(i)
}

fn sample_percent(i: &str) -> IResult<&str, Sampling> {
	let (i, _) = keyword("SAMPLE")(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, v) = crate::syn::literal::number(i)?;
	let (i, _) = char('%')(i)?;
	Ok((i, Sampling::Percent(v.to_float())))
}

fn sample_every(i: &str) -> IResult<&str, Sampling> {
	let (i, _) = keyword("EVERY")(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, n) = take_u64(i)?;
	// A count sample carries an ordinal suffix and the TUPLE keyword
	if let Ok((i, _)) = ordinal_suffix(i) {
		let (i, _) = shouldbespace(i)?;
		let (i, _) = expected("TUPLE", keyword("TUPLE"))(i)?;
		return Ok((i, Sampling::Count(n)));
	}
	let (i, _) = shouldbespace(i)?;
	let (i, unit) = alt((
		value(SampleUnit::Seconds, keyword("SECONDS")),
		value(SampleUnit::Milliseconds, keyword("MILLISECONDS")),
	))(i)?;
	Ok((i, Sampling::Every(n, unit)))
}

fn emitter(i: &str) -> IResult<&str, Emitter> {
	let (i, kind) = emitter_kind(i)?;
	let (i, limit) = opt(|i| {
		let (i, _) = shouldbespace(i)?;
		let (i, _) = keyword("LIMIT")(i)?;
		let (i, _) = shouldbespace(i)?;
		take_u64(i)
	})(i)?;
	let (i, sampling) = opt(|i| {
		let (i, _) = shouldbespace(i)?;
		sampling(i)
	})(i)?;
	Ok((
		i,
		Emitter {
			kind,
			limit,
			sampling,
		},
	))
}

fn field(i: &str) -> IResult<&str, Field> {
	if let Ok((i, _)) = char::<_, ParseError<&str>>('*')(i) {
		return Ok((i, Field::All));
	}
	let (i, expr) = expression(i)?;
	let (i, alias) = opt(|i| {
		let (i, _) = shouldbespace(i)?;
		let (i, _) = keyword("AS")(i)?;
		let (i, _) = shouldbespace(i)?;
		ident(i)
	})(i)?;
	Ok((
		i,
		Field::Single {
			expr,
			alias,
		},
	))
}

fn fields(i: &str) -> IResult<&str, Fields> {
	let (i, v) = separated_list1(commas, field)(i)?;
	Ok((i, Fields(v)))
}

fn relation(i: &str) -> IResult<&str, Relation> {
	let (i, source) = alt((
		map(function_call, RelationSource::Udsf),
		map(ident, RelationSource::Stream),
	))(i)?;
	// The alias may come before or after the window clause
	let (i, alias) = opt(alias_clause)(i)?;
	let (i, spec) = opt(window_clause)(i)?;
	let (i, alias) = match alias {
		Some(v) => (i, Some(v)),
		None => opt(alias_clause)(i)?,
	};
	let (window, capacity, policy) = spec.unwrap_or((Window::Tuples(1), None, None));
	Ok((
		i,
		Relation {
			source,
			window,
			capacity,
			policy,
			alias,
		},
	))
}

fn alias_clause(i: &str) -> IResult<&str, crate::sql::Ident> {
	let (i, _) = shouldbespace(i)?;
	let (i, _) = keyword("AS")(i)?;
	let (i, _) = shouldbespace(i)?;
	ident(i)
}

type WindowSpec = (Window, Option<i64>, Option<DropHint>);

fn window_clause(i: &str) -> IResult<&str, WindowSpec> {
	let (i, _) = mightbespace(i)?;
	let (i, _) = char('[')(i)?;
	let (i, _) = mightbespace(i)?;
	let (i, _) = expected("RANGE", keyword("RANGE"))(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, n) = take_i64(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, unit) = alt((
		value(WindowUnit::Tuples, keyword("TUPLES")),
		value(WindowUnit::Seconds, keyword("SECONDS")),
		value(WindowUnit::Milliseconds, keyword("MILLISECONDS")),
	))(i)?;
	let window = unit.build(n);
	let (i, capacity) = opt(|i| {
		let (i, _) = commas(i)?;
		let (i, _) = keyword2("BUFFER", "SIZE")(i)?;
		let (i, _) = shouldbespace(i)?;
		take_i64(i)
	})(i)?;
	let (i, policy) = opt(|i| {
		let (i, _) = commas(i)?;
		let (i, p) = alt((
			value(DropHint::Wait, keyword("WAIT")),
			value(DropHint::DropOldest, keyword2("DROP", "OLDEST")),
			value(DropHint::DropNewest, keyword2("DROP", "NEWEST")),
		))(i)?;
		let (i, _) = shouldbespace(i)?;
		let (i, _) = keyword2("IF", "FULL")(i)?;
		Ok((i, p))
	})(i)?;
	let (i, _) = mightbespace(i)?;
	let (i, _) = expected("a closing ']'", |i| map(char(']'), |_| ())(i))(i)?;
	Ok((i, (window, capacity, policy)))
}

#[derive(Clone, Copy)]
enum WindowUnit {
	Tuples,
	Seconds,
	Milliseconds,
}

impl WindowUnit {
	fn build(self, n: i64) -> Window {
		match self {
			Self::Tuples => Window::Tuples(n),
			Self::Seconds => Window::Seconds(n.max(0) as u64),
			Self::Milliseconds => Window::Milliseconds(n.max(0) as u64),
		}
	}
}

/// A single SELECT without any UNION branches
pub(super) fn select(i: &str) -> IResult<&str, SelectStatement> {
	let (i, _) = keyword("SELECT")(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, emitter) = expected("an emitter (ISTREAM, DSTREAM or RSTREAM)", emitter)(i)?;
	let (i, _) = shouldbespace(i)?;
	let (i, fields) = fields(i)?;
	let (i, from) = opt(|i| {
		let (i, _) = shouldbespace(i)?;
		let (i, _) = keyword("FROM")(i)?;
		let (i, _) = shouldbespace(i)?;
		separated_list1(commas, relation)(i)
	})(i)?;
	let (i, cond) = opt(|i| {
		let (i, _) = shouldbespace(i)?;
		let (i, _) = keyword("WHERE")(i)?;
		let (i, _) = shouldbespace(i)?;
		map(expression, Cond)(i)
	})(i)?;
	let (i, group) = opt(|i| {
		let (i, _) = shouldbespace(i)?;
		let (i, _) = keyword2("GROUP", "BY")(i)?;
		let (i, _) = shouldbespace(i)?;
		map(separated_list1(commas, expression), Groups)(i)
	})(i)?;
	let (i, having) = opt(|i| {
		let (i, _) = shouldbespace(i)?;
		let (i, _) = keyword("HAVING")(i)?;
		let (i, _) = shouldbespace(i)?;
		map(expression, Having)(i)
	})(i)?;
	Ok((
		i,
		SelectStatement {
			emitter,
			fields,
			from: from.unwrap_or_default(),
			cond,
			group,
			having,
		},
	))
}

/// One or more SELECTs joined with UNION ALL
pub(super) fn select_union(i: &str) -> IResult<&str, Vec<SelectStatement>> {
	separated_list1(
		|i| {
			let (i, _) = shouldbespace(i)?;
			let (i, _) = keyword2("UNION", "ALL")(i)?;
			let (i, _) = shouldbespace(i)?;
			Ok((i, ()))
		},
		select,
	)(i)
}

/// A top-level SELECT statement, possibly a union
pub(super) fn select_statement(i: &str) -> IResult<&str, crate::sql::Statement> {
	let (i, mut selects) = select_union(i)?;
	Ok((
		i,
		match selects.len() {
			1 => crate::sql::Statement::Select(selects.remove(0)),
			_ => crate::sql::Statement::SelectUnion(SelectUnionStatement {
				selects,
			}),
		},
	))
}
