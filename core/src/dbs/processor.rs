use crate::ctx::Context;
use crate::dbs::node::{NodeCore, NodeState};
use crate::dbs::pipe::{Outputs, PipeCounters, PipeReceiver, TryRecv};
use crate::dbs::source::panic_message;
use crate::dbs::{Tuple, TraceKind};
use crate::err::Error;
use crate::sql::Object;
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Notify};

/// A stream operator: consumes tuples from its input pipes and writes
/// derived tuples downstream. Implementations use interior mutability;
/// the worker serializes `process` calls.
#[async_trait]
pub trait Processor: Send + Sync + 'static {
	/// Handles one tuple. Every downstream write performed here is
	/// visible before the next input tuple is consumed.
	async fn process(&self, ctx: &Context, t: Tuple, w: &Outputs) -> Result<(), Error>;

	/// Whether the operator has emitted everything it ever will, as
	/// with an exhausted LIMIT. The worker stops the node once true.
	fn finished(&self) -> bool {
		false
	}

	/// Applies UPDATE parameters
	async fn update(&self, ctx: &Context, params: &Object) -> Result<(), Error> {
		let (_, _) = (ctx, params);
		Err(Error::CapabilityMissing {
			name: String::from("this box"),
			capability: "UPDATE",
		})
	}
}

/// A box which forwards every input tuple unchanged. The final node of a
/// UNION ALL construction is one of these.
pub(crate) struct Forwarder;

#[async_trait]
impl Processor for Forwarder {
	async fn process(&self, _: &Context, mut t: Tuple, w: &Outputs) -> Result<(), Error> {
		t.input_name = String::new();
		w.write(t).await
	}
}

/// What the input collection hands the worker next
pub(crate) enum InputEvent {
	/// A tuple, with the label of the pipe it arrived on
	Tuple(Box<Tuple>, String),
	/// Every connected pipe is closed and drained
	Drained,
}

/// The dynamic set of input pipes of a box or sink
#[derive(Default)]
pub(crate) struct Inputs {
	pipes: Mutex<Vec<PipeReceiver>>,
	changed: Arc<Notify>,
	ever_connected: AtomicBool,
	counters: Mutex<Vec<(String, Arc<PipeCounters>)>>,
}

impl Inputs {
	pub(crate) fn add(&self, rx: PipeReceiver) {
		self.ever_connected.store(true, Ordering::Relaxed);
		self.counters.lock().push((rx.label().to_owned(), rx.counters()));
		self.pipes.lock().push(rx);
		// A single permit is enough: only the worker ever waits
		self.changed.notify_one();
	}

	pub(crate) fn has_label(&self, label: &str) -> bool {
		self.pipes.lock().iter().any(|p| p.label() == label)
	}

	pub(crate) fn ever_connected(&self) -> bool {
		self.ever_connected.load(Ordering::Relaxed)
	}

	pub(crate) fn close_all(&self) {
		for p in self.pipes.lock().iter() {
			p.close();
		}
	}

	pub(crate) fn counter_snapshot(&self) -> Vec<(String, Arc<PipeCounters>)> {
		self.counters.lock().clone()
	}

	/// Waits until a new pipe is connected
	pub(crate) async fn wait_changed(&self) {
		let changed = self.changed.clone();
		changed.notified().await;
	}

	/// Returns the next tuple, rotating fairly across the input pipes.
	/// Closed pipes are drained, then discarded.
	pub(crate) async fn next(&self, cursor: &mut usize) -> InputEvent {
		loop {
			let mut waits: Vec<BoxFuture<'static, ()>> = {
				let mut pipes = self.pipes.lock();
				let n = pipes.len();
				let mut closed = Vec::new();
				for k in 0..n {
					let i = (*cursor + k) % n;
					match pipes[i].try_recv() {
						TryRecv::Tuple(t) => {
							*cursor = (i + 1) % n;
							let label = pipes[i].label().to_owned();
							return InputEvent::Tuple(t, label);
						}
						TryRecv::Closed => closed.push(i),
						TryRecv::Empty => {}
					}
				}
				// Drop pipes whose writers are gone
				if !closed.is_empty() {
					let mut keep = 0usize;
					pipes.retain(|_| {
						let drop = closed.contains(&keep);
						keep += 1;
						!drop
					});
					*cursor = 0;
				}
				if pipes.is_empty() {
					return InputEvent::Drained;
				}
				pipes.iter().map(|p| p.wait_readable().boxed()).collect()
			};
			let changed = self.changed.clone();
			waits.push(async move { changed.notified().await }.boxed());
			futures::future::select_all(waits).await;
		}
	}
}

/// A box node: the public handle around a running operator worker
pub struct BoxNode {
	pub(crate) core: Arc<NodeCore>,
	pub(crate) processor: Arc<dyn Processor>,
	pub(crate) inputs: Arc<Inputs>,
	pub(crate) outputs: Arc<Outputs>,
	stop: watch::Sender<bool>,
	join: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl std::fmt::Debug for BoxNode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("BoxNode").field("name", &self.core.name()).finish()
	}
}

impl BoxNode {
	pub(crate) fn spawn(ctx: Context, core: Arc<NodeCore>, processor: Arc<dyn Processor>) -> Arc<Self> {
		let inputs = Arc::new(Inputs::default());
		let outputs = Arc::new(Outputs::default());
		let (stop, stop_rx) = watch::channel(false);
		let node = Arc::new(Self {
			core: core.clone(),
			processor: processor.clone(),
			inputs: inputs.clone(),
			outputs: outputs.clone(),
			stop,
			join: Mutex::new(None),
		});
		let join = tokio::spawn(run(ctx, core, processor, inputs, outputs, stop_rx));
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
		self.outputs.close_all();
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
		self.processor.update(ctx, params).await
	}
}

async fn run(
	ctx: Context,
	core: Arc<NodeCore>,
	processor: Arc<dyn Processor>,
	inputs: Arc<Inputs>,
	outputs: Arc<Outputs>,
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
				let r = AssertUnwindSafe(processor.process(&ctx, *t, &outputs))
					.catch_unwind()
					.await;
				match r {
					Ok(Ok(())) => {}
					Ok(Err(Error::PipeClosed)) => break,
					Ok(Err(e)) => {
						core.errors.fetch_add(1, Ordering::Relaxed);
						warn!("Box {name} failed to process a tuple: {e}");
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
				if processor.finished() {
					debug!("Box {name} has emitted its limit");
					break;
				}
				if core.stops_on_outbound() && outputs.ever_connected() && outputs.len() == 0 {
					break;
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
	outputs.close_all();
	core.set_state(NodeState::Stopped);
	debug!("Box {name} stopped");
	if core.removes_on_stop() {
		if let Some(topo) = ctx.topology() {
			topo.unregister(&name);
		}
	}
}
