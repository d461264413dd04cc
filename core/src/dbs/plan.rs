use crate::ctx::Context;
use crate::dbs::group::{project_grouped, project_plain, JoinedRow};
use crate::dbs::pipe::{DropPolicy, Outputs};
use crate::dbs::result::{bag_difference, ResultRow};
use crate::dbs::window::WindowBuffer;
use crate::dbs::Tuple;
use crate::err::Error;
use crate::fnc::registry::Functions;
use crate::fnc::Env;
use crate::sql::statements::SelectStatement;
use crate::sql::{
	Cond, Datetime, EmitterKind, Fields, Groups, Having, SampleUnit, Sampling, Window,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// One aliased, windowed input of a compiled plan
#[derive(Clone, Debug)]
pub(crate) struct InputDesc {
	/// The physical input label the feeding pipe carries
	pub(crate) label: String,
	/// The alias whose window buffer this input fills
	pub(crate) alias: String,
	pub(crate) window: Window,
	pub(crate) capacity: Option<usize>,
	pub(crate) policy: Option<DropPolicy>,
}

/// The windowed select operator: the compiled form of one SELECT. On
/// every arrival it refreshes the window buffers, recomputes the result
/// set, and emits under the configured stream semantics.
pub struct SelectPlan {
	inputs: Vec<InputDesc>,
	fields: Fields,
	cond: Option<Cond>,
	group: Option<Groups>,
	having: Option<Having>,
	grouped: bool,
	kind: EmitterKind,
	limit: Option<u64>,
	sampling: Option<Sampling>,
	fns: Functions,
	state: Mutex<PlanState>,
	done: AtomicBool,
}

struct PlanState {
	buffers: Vec<WindowBuffer>,
	prev: Vec<ResultRow>,
	/// Candidate emissions seen by count-based sampling
	sampled: u64,
	/// Tuples actually emitted, towards the LIMIT
	emitted: u64,
	last_emit: Option<Instant>,
	rng: StdRng,
}

impl SelectPlan {
	/// Compiles a parsed SELECT into a runnable plan over the given
	/// physical inputs
	pub(crate) fn compile(
		stmt: &SelectStatement,
		inputs: Vec<InputDesc>,
		fns: Functions,
	) -> Result<Self, Error> {
		for desc in inputs.iter() {
			match desc.window {
				Window::Tuples(n) if n <= 0 => return Err(Error::WindowInvalid(n)),
				Window::Seconds(0) => return Err(Error::WindowInvalid(0)),
				Window::Milliseconds(0) => return Err(Error::WindowInvalid(0)),
				_ => {}
			}
		}
		let buffers = inputs.iter().map(|d| WindowBuffer::new(d.window)).collect();
		// A HAVING clause always evaluates per group
		let grouped =
			stmt.group.is_some() || stmt.having.is_some() || stmt.fields.has_aggregate();
		Ok(Self {
			inputs,
			fields: stmt.fields.clone(),
			cond: stmt.cond.clone(),
			group: stmt.group.clone(),
			having: stmt.having.clone(),
			grouped,
			kind: stmt.emitter.kind,
			limit: stmt.emitter.limit,
			sampling: stmt.emitter.sampling,
			fns,
			state: Mutex::new(PlanState {
				buffers,
				prev: Vec::new(),
				sampled: 0,
				emitted: 0,
				last_emit: None,
				rng: StdRng::from_entropy(),
			}),
			done: AtomicBool::new(false),
		})
	}

	/// Runs the evaluation protocol for one arrival, returning the
	/// tuples to emit. Synchronous: nothing awaits while the plan state
	/// is held.
	fn on_tuple(&self, t: &Tuple) -> Result<Vec<Tuple>, Error> {
		let mut st = self.state.lock();
		let st = &mut *st;
		// Replicate the arrival into every window fed by its label,
		// then refresh the retention of every buffer
		for (desc, buf) in self.inputs.iter().zip(st.buffers.iter_mut()) {
			if desc.label == t.input_name {
				buf.push(t.data.clone(), t.time);
			} else {
				buf.evict();
			}
		}
		// The join cross-product across all window buffers
		let rows = self.cross_product(&st.buffers);
		// Filter, then project, grouped or row-wise
		let rows = self.filter(rows)?;
		let cur = match self.grouped {
			true => project_grouped(
				&self.fields,
				self.group.as_ref(),
				self.having.as_ref(),
				&rows,
				&self.fns,
			)?,
			false => project_plain(&self.fields, &rows, &self.fns)?,
		};
		// Emit under the configured stream semantics
		let out_rows = match self.kind {
			EmitterKind::IStream => bag_difference(&cur, &st.prev),
			EmitterKind::DStream => bag_difference(&st.prev, &cur),
			EmitterKind::RStream => cur.clone(),
		};
		st.prev = cur;
		// Sampling and LIMIT apply per emitted tuple
		let mut out = Vec::with_capacity(out_rows.len());
		for row in out_rows {
			if !Self::sample_passes(self.sampling.as_ref(), st) {
				continue;
			}
			out.push(Tuple {
				data: row.data,
				time: row.time,
				proc_time: Datetime::now(),
				input_name: String::new(),
				trace: Vec::new(),
			});
			st.emitted += 1;
			if let Some(limit) = self.limit {
				if st.emitted >= limit {
					self.done.store(true, Ordering::Release);
					break;
				}
			}
		}
		Ok(out)
	}

	fn cross_product(&self, buffers: &[WindowBuffer]) -> Vec<JoinedRow> {
		// An empty buffer empties the whole product
		if buffers.iter().any(|b| b.is_empty()) {
			return Vec::new();
		}
		let mut rows = vec![JoinedRow {
			cols: BTreeMap::new(),
			time: Datetime::default(),
		}];
		for (desc, buf) in self.inputs.iter().zip(buffers.iter()) {
			let mut next = Vec::with_capacity(rows.len() * buf.len());
			for row in rows.iter() {
				for entry in buf.iter() {
					let mut r = row.clone();
					r.cols.insert(desc.alias.clone(), entry.data.clone());
					r.time = r.time.max(entry.time);
					next.push(r);
				}
			}
			rows = next;
		}
		rows
	}

	fn filter(&self, rows: Vec<JoinedRow>) -> Result<Vec<JoinedRow>, Error> {
		let Some(cond) = self.cond.as_ref() else {
			return Ok(rows);
		};
		let mut out = Vec::with_capacity(rows.len());
		for row in rows {
			let env = Env::on_rows(&self.fns, &row.cols);
			// A Null condition never passes
			if cond.compute(&env)?.is_true() {
				out.push(row);
			}
		}
		Ok(out)
	}

	fn sample_passes(sampling: Option<&Sampling>, st: &mut PlanState) -> bool {
		match sampling {
			None => true,
			Some(Sampling::Count(k)) => {
				st.sampled += 1;
				*k > 0 && st.sampled % *k == 0
			}
			Some(Sampling::Percent(p)) => {
				let p = (p / 100.0).clamp(0.0, 1.0);
				st.rng.gen_bool(p)
			}
			Some(Sampling::Every(n, unit)) => {
				let interval = match unit {
					SampleUnit::Seconds => Duration::from_secs(*n),
					SampleUnit::Milliseconds => Duration::from_millis(*n),
				};
				let now = Instant::now();
				match st.last_emit {
					Some(last) if now.duration_since(last) < interval => false,
					_ => {
						st.last_emit = Some(now);
						true
					}
				}
			}
		}
	}
}

#[async_trait]
impl crate::dbs::Processor for SelectPlan {
	async fn process(&self, _: &Context, t: Tuple, w: &Outputs) -> Result<(), Error> {
		if self.done.load(Ordering::Acquire) {
			return Ok(());
		}
		let out = self.on_tuple(&t)?;
		for t in out {
			w.write(t).await?;
		}
		Ok(())
	}

	fn finished(&self) -> bool {
		self.done.load(Ordering::Acquire)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sql::{Object, Statement, Value};
	use crate::syn;

	fn compile(text: &str, inputs: Vec<InputDesc>) -> SelectPlan {
		let q = syn::parse(text).unwrap();
		let Statement::Select(sel) = &q[0] else {
			panic!("not a select")
		};
		SelectPlan::compile(sel, inputs, Functions::default()).unwrap()
	}

	fn input(label: &str, alias: &str, window: Window) -> InputDesc {
		InputDesc {
			label: label.into(),
			alias: alias.into(),
			window,
			capacity: None,
			policy: None,
		}
	}

	fn arrival(label: &str, n: i64, t: i64) -> Tuple {
		let mut tuple = Tuple::at(
			Object(map! { String::from("n") => Value::from(n) }),
			Datetime::from_nanos(t),
		);
		tuple.input_name = label.into();
		tuple
	}

	fn payloads(out: Vec<Tuple>) -> Vec<Value> {
		out.into_iter().map(|t| Value::Object(t.data)).collect()
	}

	#[test]
	fn istream_count_over_two_tuple_window() {
		let plan = compile(
			"SELECT ISTREAM count(*) AS c FROM x [RANGE 2 TUPLES]",
			vec![input("x", "x", Window::Tuples(2))],
		);
		let mut emitted = Vec::new();
		for (n, t) in [(1, 1), (2, 2), (3, 3)] {
			emitted.extend(payloads(plan.on_tuple(&arrival("x", n, t)).unwrap()));
		}
		let c = |v: i64| {
			Value::Object(Object(map! { String::from("c") => Value::from(v) }))
		};
		assert_eq!(emitted, vec![c(1), c(2), c(2)]);
	}

	#[test]
	fn self_join_fills_both_alias_buffers() {
		let plan = compile(
			"SELECT RSTREAM a:v + b:v AS s FROM x [RANGE 1 TUPLES] AS a, x [RANGE 1 TUPLES] AS b",
			vec![
				InputDesc {
					label: "x".into(),
					alias: "a".into(),
					window: Window::Tuples(1),
					capacity: None,
					policy: None,
				},
				InputDesc {
					label: "x".into(),
					alias: "b".into(),
					window: Window::Tuples(1),
					capacity: None,
					policy: None,
				},
			],
		);
		let mk = |n: i64, t: i64| {
			let mut tuple = Tuple::at(
				Object(map! { String::from("v") => Value::from(n) }),
				Datetime::from_nanos(t),
			);
			tuple.input_name = String::from("x");
			tuple
		};
		let first = payloads(plan.on_tuple(&mk(1, 1)).unwrap());
		let second = payloads(plan.on_tuple(&mk(2, 2)).unwrap());
		let s = |v: i64| {
			Value::Object(Object(map! { String::from("s") => Value::from(v) }))
		};
		assert_eq!(first, vec![s(2)]);
		assert_eq!(second, vec![s(4)]);
	}

	#[test]
	fn rstream_re_emits_the_whole_result_set() {
		let plan = compile(
			"SELECT RSTREAM n FROM x [RANGE 2 TUPLES]",
			vec![input("x", "x", Window::Tuples(2))],
		);
		assert_eq!(plan.on_tuple(&arrival("x", 1, 1)).unwrap().len(), 1);
		assert_eq!(plan.on_tuple(&arrival("x", 2, 2)).unwrap().len(), 2);
		assert_eq!(plan.on_tuple(&arrival("x", 3, 3)).unwrap().len(), 2);
	}

	#[test]
	fn istream_is_idempotent_under_identical_input() {
		let plan = compile(
			"SELECT ISTREAM n FROM x [RANGE 1 TUPLES]",
			vec![input("x", "x", Window::Tuples(1))],
		);
		// The same tuple twice, including its event timestamp
		assert_eq!(plan.on_tuple(&arrival("x", 5, 9)).unwrap().len(), 1);
		assert_eq!(plan.on_tuple(&arrival("x", 5, 9)).unwrap().len(), 0);
	}

	#[test]
	fn dstream_emits_leaving_rows() {
		let plan = compile(
			"SELECT DSTREAM n FROM x [RANGE 1 TUPLES]",
			vec![input("x", "x", Window::Tuples(1))],
		);
		assert_eq!(plan.on_tuple(&arrival("x", 1, 1)).unwrap().len(), 0);
		let out = plan.on_tuple(&arrival("x", 2, 2)).unwrap();
		assert_eq!(payloads(out), vec![Value::Object(Object(map! {
			String::from("n") => Value::from(1i64)
		}))]);
	}

	#[test]
	fn where_filters_rows_and_null_is_false() {
		let plan = compile(
			"SELECT RSTREAM n FROM x [RANGE 1 TUPLES] WHERE n > 2",
			vec![input("x", "x", Window::Tuples(1))],
		);
		assert_eq!(plan.on_tuple(&arrival("x", 1, 1)).unwrap().len(), 0);
		assert_eq!(plan.on_tuple(&arrival("x", 3, 2)).unwrap().len(), 1);
		// A tuple without the column compares as Null, which filters out
		let mut missing = Tuple::at(Object::new(), Datetime::from_nanos(3));
		missing.input_name = String::from("x");
		assert_eq!(plan.on_tuple(&missing).unwrap().len(), 0);
	}

	#[test]
	fn group_by_partitions_and_having_filters() {
		let plan = compile(
			"SELECT RSTREAM k, count(*) AS c FROM x [RANGE 4 TUPLES] GROUP BY k HAVING count(*) > 1",
			vec![input("x", "x", Window::Tuples(4))],
		);
		let mk = |k: &str, t: i64| {
			let mut tuple = Tuple::at(
				Object(map! { String::from("k") => Value::from(k) }),
				Datetime::from_nanos(t),
			);
			tuple.input_name = String::from("x");
			tuple
		};
		assert_eq!(plan.on_tuple(&mk("a", 1)).unwrap().len(), 0);
		assert_eq!(plan.on_tuple(&mk("b", 2)).unwrap().len(), 0);
		let out = plan.on_tuple(&mk("a", 3)).unwrap();
		assert_eq!(out.len(), 1);
		assert_eq!(out[0].data.0.get("c"), Some(&Value::from(2i64)));
		assert_eq!(out[0].data.0.get("k"), Some(&Value::from("a")));
	}

	#[test]
	fn limit_stops_the_plan() {
		let plan = compile(
			"SELECT RSTREAM LIMIT 2 n FROM x [RANGE 1 TUPLES]",
			vec![input("x", "x", Window::Tuples(1))],
		);
		assert_eq!(plan.on_tuple(&arrival("x", 1, 1)).unwrap().len(), 1);
		assert_eq!(plan.on_tuple(&arrival("x", 2, 2)).unwrap().len(), 1);
		assert!(plan.done.load(Ordering::Acquire));
	}

	#[test]
	fn count_sampling_passes_every_kth() {
		let plan = compile(
			"SELECT RSTREAM EVERY 2ND TUPLE n FROM x [RANGE 1 TUPLES]",
			vec![input("x", "x", Window::Tuples(1))],
		);
		let mut total = 0;
		for n in 1..=6 {
			total += plan.on_tuple(&arrival("x", n, n)).unwrap().len();
		}
		assert_eq!(total, 3);
	}

	#[test]
	fn zero_tuple_windows_are_rejected() {
		let q = syn::parse("SELECT ISTREAM n FROM x [RANGE 0 TUPLES]").unwrap();
		let Statement::Select(sel) = &q[0] else {
			panic!("not a select")
		};
		let r = SelectPlan::compile(
			sel,
			vec![input("x", "x", Window::Tuples(0))],
			Functions::default(),
		);
		assert!(matches!(r, Err(Error::WindowInvalid(0))));
	}

	#[test]
	fn emitted_timestamp_is_max_of_contributors() {
		let plan = compile(
			"SELECT RSTREAM a:n, b:n FROM x [RANGE 1 TUPLES] AS a, y [RANGE 1 TUPLES] AS b",
			vec![
				input("x", "a", Window::Tuples(1)),
				input("y", "b", Window::Tuples(1)),
			],
		);
		assert!(plan.on_tuple(&arrival("x", 1, 100)).unwrap().is_empty());
		let out = plan.on_tuple(&arrival("y", 2, 50)).unwrap();
		assert_eq!(out.len(), 1);
		assert_eq!(out[0].time, Datetime::from_nanos(100));
	}
}
