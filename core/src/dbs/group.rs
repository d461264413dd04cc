use crate::dbs::result::ResultRow;
use crate::err::Error;
use crate::fnc::registry::Functions;
use crate::fnc::Env;
use crate::sql::{Array, Datetime, Field, Fields, Groups, Having, Object, Value};
use std::collections::BTreeMap;

/// One candidate row of the join cross-product: the buffered tuple of
/// every aliased input, plus the largest contributing event timestamp
#[derive(Clone)]
pub(crate) struct JoinedRow {
	pub(crate) cols: BTreeMap<String, Object>,
	pub(crate) time: Datetime,
}

/// Builds the output record of one projection evaluation
fn project_row(
	fields: &Fields,
	env: &Env,
	cols: &BTreeMap<String, Object>,
) -> Result<Object, Error> {
	let mut out = Object::new();
	for field in fields.iter() {
		match field {
			// A lone input spreads into the output; a join nests each
			// input under its alias
			Field::All => match cols.len() {
				1 => {
					if let Some(obj) = cols.values().next() {
						out.0.extend(obj.0.clone());
					}
				}
				_ => {
					for (alias, obj) in cols.iter() {
						out.insert(alias.clone(), Value::Object(obj.clone()));
					}
				}
			},
			Field::Single {
				expr,
				alias,
			} => {
				let name = match alias {
					Some(v) => v.to_raw(),
					None => expr.output_name(),
				};
				out.insert(name, expr.compute(env)?);
			}
		}
	}
	Ok(out)
}

/// Projects each surviving row on its own. Used when no aggregate and
/// no GROUP BY is present.
pub(crate) fn project_plain(
	fields: &Fields,
	rows: &[JoinedRow],
	fns: &Functions,
) -> Result<Vec<ResultRow>, Error> {
	let mut out = Vec::with_capacity(rows.len());
	for row in rows {
		let env = Env::on_rows(fns, &row.cols);
		out.push(ResultRow {
			data: project_row(fields, &env, &row.cols)?,
			time: row.time,
		});
	}
	Ok(out)
}

/// Partitions the surviving rows by the grouping-key vector, then
/// evaluates the projections and HAVING once per partition. Without a
/// GROUP BY clause, every row lands in one partition.
pub(crate) fn project_grouped(
	fields: &Fields,
	group: Option<&Groups>,
	having: Option<&Having>,
	rows: &[JoinedRow],
	fns: &Functions,
) -> Result<Vec<ResultRow>, Error> {
	let mut parts: BTreeMap<Array, Vec<&JoinedRow>> = BTreeMap::new();
	for row in rows {
		let key = match group {
			Some(group) => {
				let env = Env::on_rows(fns, &row.cols);
				let mut key = Array::with_capacity(group.len());
				for expr in group.iter() {
					key.push(expr.compute(&env)?);
				}
				key
			}
			None => Array::new(),
		};
		parts.entry(key).or_default().push(row);
	}
	let mut out = Vec::with_capacity(parts.len());
	for rows in parts.into_values() {
		let partition: Vec<BTreeMap<String, Object>> =
			rows.iter().map(|r| r.cols.clone()).collect();
		let Some(first) = partition.first() else {
			continue;
		};
		let env = Env::grouped(fns, first, &partition);
		if let Some(having) = having {
			if !having.compute(&env)?.is_true() {
				continue;
			}
		}
		let time = rows.iter().map(|r| r.time).max().unwrap_or_default();
		out.push(ResultRow {
			data: project_row(fields, &env, &rows[0].cols)?,
			time,
		});
	}
	Ok(out)
}
