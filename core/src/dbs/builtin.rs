//! The built-in node and state types every registry starts with: the
//! `dummy` test source, the `null` sink, the `value` shared state, and
//! the `node_statuses` / `edge_statuses` diagnostic scan sources.

use crate::cnf::STATUS_SCAN_INTERVAL_MS;
use crate::ctx::Context;
use crate::dbs::sink::Sink;
use crate::dbs::source::{Source, SourceWriter};
use crate::dbs::state::{SharedState, ValueState};
use crate::dbs::Tuple;
use crate::err::Error;
use crate::registry::{Registry, SinkCreator, SourceCreator, StateCreator};
use crate::sql::{Datetime, Number, Object, Value};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Registers the built-in types into a registry
pub(crate) fn register(r: &mut Registry) {
	r.register_source_type("dummy", Arc::new(DummyCreator));
	r.register_source_type("node_statuses", Arc::new(NodeStatusesCreator));
	r.register_source_type("edge_statuses", Arc::new(EdgeStatusesCreator));
	r.register_sink_type("null", Arc::new(NullCreator));
	r.register_state_type("value", Arc::new(ValueStateCreator));
}

/// A scripted source emitting `{n: 1} .. {n: num}`, optionally spaced
/// by an interval. Rewindable, and updatable while running.
pub struct DummySource {
	num: AtomicU64,
	interval_ms: AtomicU64,
	pos: AtomicU64,
}

impl DummySource {
	pub fn new(num: u64, interval_ms: u64) -> Self {
		Self {
			num: AtomicU64::new(num),
			interval_ms: AtomicU64::new(interval_ms),
			pos: AtomicU64::new(0),
		}
	}
}

#[async_trait]
impl Source for DummySource {
	async fn generate_stream(&self, _: &Context, w: &SourceWriter) -> Result<(), Error> {
		loop {
			let n = self.pos.fetch_add(1, Ordering::Relaxed) + 1;
			if n > self.num.load(Ordering::Relaxed) {
				return Ok(());
			}
			let data = Object(map! {
				String::from("n") => Value::from(n as i64),
			});
			w.write(Tuple::at(data, Datetime::now())).await?;
			let pause = self.interval_ms.load(Ordering::Relaxed);
			if pause > 0 {
				tokio::time::sleep(Duration::from_millis(pause)).await;
			}
		}
	}

	fn rewindable(&self) -> bool {
		true
	}

	async fn rewind(&self, _: &Context) -> Result<(), Error> {
		self.pos.store(0, Ordering::Relaxed);
		Ok(())
	}

	async fn update(&self, _: &Context, params: &Object) -> Result<(), Error> {
		for (k, v) in params.0.iter() {
			match (k.as_str(), v) {
				("num", Value::Number(Number::Int(n))) => {
					self.num.store((*n).max(0) as u64, Ordering::Relaxed)
				}
				("interval_ms", Value::Number(Number::Int(n))) => {
					self.interval_ms.store((*n).max(0) as u64, Ordering::Relaxed)
				}
				(k, _) => {
					return Err(Error::InvalidArguments {
						name: String::from("dummy"),
						message: format!("unknown or mistyped parameter '{k}'"),
					})
				}
			}
		}
		Ok(())
	}
}

struct DummyCreator;

#[async_trait]
impl SourceCreator for DummyCreator {
	async fn create(&self, _: &Context, params: &Object) -> Result<Arc<dyn Source>, Error> {
		let num = match params.0.get("num") {
			Some(Value::Number(Number::Int(n))) => (*n).max(0) as u64,
			None => 4,
			Some(v) => {
				return Err(Error::InvalidArguments {
					name: String::from("dummy"),
					message: format!("num must be an int, not a {} value", v.kind_name()),
				})
			}
		};
		let interval_ms = match params.0.get("interval_ms") {
			Some(Value::Number(Number::Int(n))) => (*n).max(0) as u64,
			None => 0,
			Some(v) => {
				return Err(Error::InvalidArguments {
					name: String::from("dummy"),
					message: format!("interval_ms must be an int, not a {} value", v.kind_name()),
				})
			}
		};
		Ok(Arc::new(DummySource::new(num, interval_ms)))
	}
}

/// A sink which quietly discards everything
pub struct NullSink;

#[async_trait]
impl Sink for NullSink {
	async fn write(&self, _: &Context, _: Tuple) -> Result<(), Error> {
		Ok(())
	}
}

struct NullCreator;

#[async_trait]
impl SinkCreator for NullCreator {
	async fn create(&self, _: &Context, _: &Object) -> Result<Arc<dyn Sink>, Error> {
		Ok(Arc::new(NullSink))
	}
}

/// A sink handing every received tuple to a channel, for tests and
/// embedders which subscribe to a stream programmatically
pub struct CollectorSink {
	tx: channel::Sender<Tuple>,
}

impl CollectorSink {
	pub fn new() -> (Arc<Self>, channel::Receiver<Tuple>) {
		let (tx, rx) = channel::unbounded();
		(
			Arc::new(Self {
				tx,
			}),
			rx,
		)
	}
}

#[async_trait]
impl Sink for CollectorSink {
	async fn write(&self, _: &Context, t: Tuple) -> Result<(), Error> {
		self.tx.send(t).await.map_err(|_| Error::PipeClosed)
	}

	async fn close(&self, _: &Context) -> Result<(), Error> {
		self.tx.close();
		Ok(())
	}
}

struct ValueStateCreator;

#[async_trait]
impl StateCreator for ValueStateCreator {
	async fn create(&self, _: &Context, params: &Object) -> Result<Arc<dyn SharedState>, Error> {
		Ok(Arc::new(ValueState::from_params(params)))
	}

	async fn load(
		&self,
		_: &Context,
		data: Vec<u8>,
		_: &Object,
	) -> Result<Arc<dyn SharedState>, Error> {
		Ok(Arc::new(ValueState::load(&data)?))
	}
}

/// Emits one diagnostic tuple per node on every scan tick
struct NodeStatusesSource;

/// Emits one diagnostic tuple per pipe on every scan tick
struct EdgeStatusesSource;

async fn scan_loop(
	ctx: &Context,
	w: &SourceWriter,
	edges: bool,
) -> Result<(), Error> {
	let interval = Duration::from_millis(*STATUS_SCAN_INTERVAL_MS);
	loop {
		let Some(topology) = ctx.topology() else {
			return Ok(());
		};
		let records = match edges {
			true => topology.edge_statuses(),
			false => topology.node_statuses(),
		};
		drop(topology);
		for data in records {
			w.write(Tuple::at(data, Datetime::now())).await?;
		}
		tokio::time::sleep(interval).await;
	}
}

#[async_trait]
impl Source for NodeStatusesSource {
	async fn generate_stream(&self, ctx: &Context, w: &SourceWriter) -> Result<(), Error> {
		scan_loop(ctx, w, false).await
	}
}

#[async_trait]
impl Source for EdgeStatusesSource {
	async fn generate_stream(&self, ctx: &Context, w: &SourceWriter) -> Result<(), Error> {
		scan_loop(ctx, w, true).await
	}
}

struct NodeStatusesCreator;

#[async_trait]
impl SourceCreator for NodeStatusesCreator {
	async fn create(&self, _: &Context, _: &Object) -> Result<Arc<dyn Source>, Error> {
		Ok(Arc::new(NodeStatusesSource))
	}
}

struct EdgeStatusesCreator;

#[async_trait]
impl SourceCreator for EdgeStatusesCreator {
	async fn create(&self, _: &Context, _: &Object) -> Result<Arc<dyn Source>, Error> {
		Ok(Arc::new(EdgeStatusesSource))
	}
}
