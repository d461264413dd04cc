use crate::ctx::Context;
use crate::dbs::node::{NodeCore, NodeState};
use crate::dbs::processor::{InputEvent, Inputs};
use crate::dbs::source::panic_message;
use crate::dbs::{Tuple, TraceKind};
use crate::err::Error;
use crate::sql::Object;
use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::watch;

/// A stream consumer at the edge of the topology
#[async_trait]
pub trait Sink: Send + Sync + 'static {
	/// Handles one tuple
	async fn write(&self, ctx: &Context, t: Tuple) -> Result<(), Error>;

	/// Called once when the sink stops
	async fn close(&self, ctx: &Context) -> Result<(), Error> {
		let _ = ctx;
		Ok(())
	}

	/// Applies UPDATE SINK parameters
	async fn update(&self, ctx: &Context, params: &Object) -> Result<(), Error> {
		let (_, _) = (ctx, params);
		Err(Error::CapabilityMissing {
			name: String::from("this sink"),
			capability: "UPDATE",
		})
	}
}

/// A sink node: the public handle around a running sink worker
pub struct SinkNode {
	pub(crate) core: Arc<NodeCore>,
	pub(crate) sink: Arc<dyn Sink>,
	pub(crate) inputs: Arc<Inputs>,
	stop: watch::Sender<bool>,
	join: parking_lot::Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl SinkNode {
	pub(crate) fn spawn(ctx: Context, core: Arc<NodeCore>, sink: Arc<dyn Sink>) -> Arc<Self> {
		let inputs = Arc::new(Inputs::default());
		let (stop, stop_rx) = watch::channel(false);
		let node = Arc::new(Self {
			core: core.clone(),
			sink: sink.clone(),
			inputs: inputs.clone(),
			stop,
			join: parking_lot::Mutex::new(None),
		});
		let join = tokio::spawn(run(ctx, core, sink, inputs, stop_rx));
		*node.join.lock() = Some(join);
		node
	}

	/// Aborts the worker outright and marks the node stopped
	pub(crate) fn force_stop(&self) {
		let _ = self.stop.send(true);
		if let Some(join) = self.join.lock().take() {
			join.abort();
		}
		self.inputs.close_all();
		self.core.set_state(NodeState::Stopping);
		self.core.set_state(NodeState::Stopped);
	}

	pub fn name(&self) -> &str {
		self.core.name()
	}

	pub fn state(&self) -> NodeState {
		self.core.state()
	}

	pub fn stop(&self) {
		let _ = self.stop.send(true);
	}

	pub(crate) async fn wait_stopped(&self) {
		self.core.wait_stopped().await;
	}

	pub async fn update(&self, ctx: &Context, params: &Object) -> Result<(), Error> {
		self.sink.update(ctx, params).await.map_err(|e| match e {
			Error::CapabilityMissing {
				capability,
				..
			} => Error::CapabilityMissing {
				name: self.core.name().to_owned(),
				capability,
			},
			e => e,
		})
	}
}

async fn run(
	ctx: Context,
	core: Arc<NodeCore>,
	sink: Arc<dyn Sink>,
	inputs: Arc<Inputs>,
	mut stop_rx: watch::Receiver<bool>,
) {
	let name = core.name().to_owned();
	core.set_state(NodeState::Starting);
	core.set_state(NodeState::Running);
	let mut cursor = 0;
	loop {
		if *stop_rx.borrow() {
			break;
		}
		let ev = tokio::select! {
			ev = inputs.next(&mut cursor) => ev,
			_ = stop_rx.wait_for(|s| *s) => break,
		};
		match ev {
			InputEvent::Tuple(mut t, label) => {
				core.received.fetch_add(1, Ordering::Relaxed);
				t.input_name = label;
				if *crate::cnf::TRACE_TUPLES {
					t.trace(&name, TraceKind::Input);
				}
				let r = AssertUnwindSafe(sink.write(&ctx, *t)).catch_unwind().await;
				match r {
					Ok(Ok(())) => {}
					Ok(Err(Error::PipeClosed)) => break,
					Ok(Err(e)) => {
						core.errors.fetch_add(1, Ordering::Relaxed);
						warn!("Sink {name} failed to write a tuple: {e}");
					}
					Err(p) => {
						core.errors.fetch_add(1, Ordering::Relaxed);
						let e = Error::UserPanic {
							node: name.clone(),
							message: panic_message(p),
						};
						warn!("{e}");
						break;
					}
				}
			}
			InputEvent::Drained => {
				if core.stops_on_inbound() && inputs.ever_connected() {
					break;
				}
				tokio::select! {
					_ = inputs.wait_changed() => {}
					_ = stop_rx.wait_for(|s| *s) => break,
				}
			}
		}
	}
	core.set_state(NodeState::Stopping);
	inputs.close_all();
	if let Err(e) = sink.close(&ctx).await {
		warn!("Sink {name} failed to close cleanly: {e}");
	}
	core.set_state(NodeState::Stopped);
	debug!("Sink {name} stopped");
	if core.removes_on_stop() {
		if let Some(topo) = ctx.topology() {
			topo.unregister(&name);
		}
	}
}
