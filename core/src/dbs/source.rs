use crate::ctx::Context;
use crate::dbs::node::{NodeCore, NodeState};
use crate::dbs::pipe::Outputs;
use crate::dbs::{Tuple, TraceKind};
use crate::err::Error;
use crate::sql::{Datetime, Object};
use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// A stream producer. Implementations use interior mutability for any
/// position or connection state, since the handle may call `update`
/// while the generator runs.
#[async_trait]
pub trait Source: Send + Sync + 'static {
	/// Produces the stream, writing each tuple through the writer.
	/// Returning signals end-of-stream.
	async fn generate_stream(&self, ctx: &Context, w: &SourceWriter) -> Result<(), Error>;

	/// Called once when the source is stopped
	async fn stop(&self, ctx: &Context) -> Result<(), Error> {
		let _ = ctx;
		Ok(())
	}

	/// Whether this source supports rewinding to its start position
	fn rewindable(&self) -> bool {
		false
	}

	/// Resets the internal position. Only called on rewindable sources,
	/// between two runs of the generator.
	async fn rewind(&self, ctx: &Context) -> Result<(), Error> {
		let _ = ctx;
		Err(Error::CapabilityMissing {
			name: String::from("this source"),
			capability: "rewinding",
		})
	}

	/// Applies UPDATE SOURCE parameters
	async fn update(&self, ctx: &Context, params: &Object) -> Result<(), Error> {
		let (_, _) = (ctx, params);
		Err(Error::CapabilityMissing {
			name: String::from("this source"),
			capability: "UPDATE",
		})
	}
}

/// How a source starts up
#[derive(Clone, Copy, Debug, Default)]
#[non_exhaustive]
pub struct SourceConfig {
	/// Start in the Paused state, emitting nothing until RESUME
	pub paused_on_startup: bool,
}

/// The writer handed to a source generator. Writing stamps the ingress
/// processing timestamp and fans the tuple out to every connected
/// downstream pipe. The write call is also the cooperative pause
/// checkpoint.
pub struct SourceWriter {
	name: String,
	outputs: Arc<Outputs>,
	gate: watch::Receiver<bool>,
	stopped: Arc<AtomicBool>,
	core: Arc<NodeCore>,
}

impl SourceWriter {
	pub async fn write(&self, mut t: Tuple) -> Result<(), Error> {
		if self.stopped.load(Ordering::Acquire) {
			return Err(Error::SourceStopped);
		}
		// Hold here while the source is paused
		let mut gate = self.gate.clone();
		if gate.wait_for(|open| *open).await.is_err() {
			return Err(Error::SourceStopped);
		}
		if self.stopped.load(Ordering::Acquire) {
			return Err(Error::SourceStopped);
		}
		t.proc_time = Datetime::now();
		if *crate::cnf::TRACE_TUPLES {
			t.trace(&self.name, TraceKind::Output);
		}
		self.outputs.write(t).await?;
		// A sticky outbound-disconnect flag ends the stream once the
		// last consumer detaches
		if self.core.stops_on_outbound()
			&& self.outputs.ever_connected()
			&& self.outputs.len() == 0
		{
			return Err(Error::SourceStopped);
		}
		Ok(())
	}
}

pub(crate) enum SourceCommand {
	Rewind,
	Stop,
}

/// A source node: the public handle around a running source worker
pub struct SourceNode {
	pub(crate) core: Arc<NodeCore>,
	pub(crate) source: Arc<dyn Source>,
	pub(crate) outputs: Arc<Outputs>,
	gate: watch::Sender<bool>,
	ctl: mpsc::Sender<SourceCommand>,
	stopped: Arc<AtomicBool>,
	join: parking_lot::Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl SourceNode {
	pub(crate) fn spawn(
		ctx: Context,
		core: Arc<NodeCore>,
		source: Arc<dyn Source>,
		cfg: SourceConfig,
	) -> Arc<Self> {
		let outputs = Arc::new(Outputs::default());
		let (gate, gate_rx) = watch::channel(!cfg.paused_on_startup);
		let (ctl, ctl_rx) = mpsc::channel(4);
		let stopped = Arc::new(AtomicBool::new(false));
		let node = Arc::new(Self {
			core: core.clone(),
			source: source.clone(),
			outputs: outputs.clone(),
			gate,
			ctl,
			stopped: stopped.clone(),
			join: parking_lot::Mutex::new(None),
		});
		let writer = SourceWriter {
			name: core.name().to_owned(),
			outputs: outputs.clone(),
			gate: gate_rx,
			stopped: stopped.clone(),
			core: core.clone(),
		};
		core.set_state(NodeState::Starting);
		core.set_state(match cfg.paused_on_startup {
			true => NodeState::Paused,
			false => NodeState::Running,
		});
		let join = tokio::spawn(run(ctx, core, source, outputs, writer, ctl_rx, stopped));
		*node.join.lock() = Some(join);
		node
	}

	/// Aborts the worker outright and marks the node stopped
	pub(crate) fn force_stop(&self) {
		self.stopped.store(true, Ordering::Release);
		if let Some(join) = self.join.lock().take() {
			join.abort();
		}
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

	/// Suspends emission at the writer checkpoint
	pub fn pause(&self) -> Result<(), Error> {
		match self.core.state() {
			NodeState::Running | NodeState::Paused => {
				let _ = self.gate.send(false);
				self.core.set_state(NodeState::Paused);
				Ok(())
			}
			s => Err(Error::InvalidLifecycle {
				node: self.core.name().to_owned(),
				action: "pause",
				state: s.to_string(),
			}),
		}
	}

	/// Releases a paused source
	pub fn resume(&self) -> Result<(), Error> {
		match self.core.state() {
			NodeState::Running | NodeState::Paused => {
				let _ = self.gate.send(true);
				self.core.set_state(NodeState::Running);
				Ok(())
			}
			s => Err(Error::InvalidLifecycle {
				node: self.core.name().to_owned(),
				action: "resume",
				state: s.to_string(),
			}),
		}
	}

	/// Tears the generator down and restarts it from the beginning,
	/// preserving output wiring
	pub async fn rewind(&self) -> Result<(), Error> {
		if !self.source.rewindable() {
			return Err(Error::CapabilityMissing {
				name: self.core.name().to_owned(),
				capability: "REWIND",
			});
		}
		match self.core.state() {
			NodeState::Running | NodeState::Paused => {
				let _ = self.ctl.send(SourceCommand::Rewind).await;
				Ok(())
			}
			s => Err(Error::InvalidLifecycle {
				node: self.core.name().to_owned(),
				action: "rewind",
				state: s.to_string(),
			}),
		}
	}

	/// Initiates a stop. The node reaches Stopped asynchronously.
	pub async fn stop(&self) {
		self.stopped.store(true, Ordering::Release);
		// Release a paused generator so it can observe the stop
		let _ = self.gate.send(true);
		let _ = self.ctl.send(SourceCommand::Stop).await;
	}

	pub(crate) async fn wait_stopped(&self) {
		self.core.wait_stopped().await;
	}

	pub async fn update(&self, ctx: &Context, params: &Object) -> Result<(), Error> {
		self.source.update(ctx, params).await.map_err(|e| match e {
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
	source: Arc<dyn Source>,
	outputs: Arc<Outputs>,
	writer: SourceWriter,
	mut ctl: mpsc::Receiver<SourceCommand>,
	stopped: Arc<AtomicBool>,
) {
	let name = core.name().to_owned();
	let mut restart = true;
	while restart {
		restart = false;
		let gen = AssertUnwindSafe(source.generate_stream(&ctx, &writer)).catch_unwind();
		tokio::pin!(gen);
		loop {
			tokio::select! {
				r = &mut gen => {
					match r {
						Ok(Ok(())) => debug!("Source {name} reached end of stream"),
						Ok(Err(Error::SourceStopped)) | Ok(Err(Error::PipeClosed)) => {
							debug!("Source {name} terminated")
						}
						Ok(Err(e)) => {
							core.errors.fetch_add(1, Ordering::Relaxed);
							warn!("Source {name} failed: {e}");
						}
						Err(p) => {
							core.errors.fetch_add(1, Ordering::Relaxed);
							let e = Error::UserPanic {
								node: name.clone(),
								message: panic_message(p),
							};
							warn!("{e}");
						}
					}
					break;
				}
				cmd = ctl.recv() => match cmd {
					Some(SourceCommand::Rewind) => {
						// Drop the generator and start a fresh run
						debug!("Source {name} rewinding");
						restart = true;
						break;
					}
					Some(SourceCommand::Stop) | None => break,
				}
			}
		}
		if restart {
			if let Err(e) = source.rewind(&ctx).await {
				warn!("Source {name} failed to rewind: {e}");
				restart = false;
			}
		}
	}
	if stopped.load(Ordering::Acquire) {
		if let Err(e) = source.stop(&ctx).await {
			warn!("Source {name} failed to stop cleanly: {e}");
		}
	}
	core.set_state(NodeState::Stopping);
	outputs.close_all();
	core.set_state(NodeState::Stopped);
	debug!("Source {name} stopped");
	if core.removes_on_stop() {
		if let Some(topo) = ctx.topology() {
			topo.unregister(&name);
		}
	}
}

pub(crate) fn panic_message(p: Box<dyn std::any::Any + Send>) -> String {
	match p.downcast_ref::<&str>() {
		Some(s) => (*s).to_owned(),
		None => match p.downcast_ref::<String>() {
			Some(s) => s.clone(),
			None => String::from("panic of unknown type"),
		},
	}
}
