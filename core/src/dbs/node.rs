use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::watch;

/// The lifecycle state of a node
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum NodeState {
	Initial,
	Starting,
	Running,
	Paused,
	Stopping,
	Stopped,
}

impl NodeState {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Initial => "initial",
			Self::Starting => "starting",
			Self::Running => "running",
			Self::Paused => "paused",
			Self::Stopping => "stopping",
			Self::Stopped => "stopped",
		}
	}
}

impl Display for NodeState {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// The kind of a node
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum NodeKind {
	Source,
	Box,
	Sink,
}

impl NodeKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Source => "source",
			Self::Box => "box",
			Self::Sink => "sink",
		}
	}
}

impl Display for NodeKind {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Which connection direction a StopOnDisconnect flag watches
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Disconnect {
	Inbound,
	Outbound,
	Both,
}

/// The bookkeeping shared between a node's public handle and its worker
pub(crate) struct NodeCore {
	name: String,
	kind: NodeKind,
	state: watch::Sender<NodeState>,
	stop_on_inbound: AtomicBool,
	stop_on_outbound: AtomicBool,
	remove_on_stop: AtomicBool,
	pub(crate) received: AtomicU64,
	pub(crate) errors: AtomicU64,
}

impl NodeCore {
	pub(crate) fn new(name: String, kind: NodeKind) -> Self {
		Self {
			name,
			kind,
			state: watch::channel(NodeState::Initial).0,
			stop_on_inbound: AtomicBool::new(false),
			stop_on_outbound: AtomicBool::new(false),
			remove_on_stop: AtomicBool::new(false),
			received: AtomicU64::new(0),
			errors: AtomicU64::new(0),
		}
	}

	pub(crate) fn name(&self) -> &str {
		&self.name
	}

	pub(crate) fn kind(&self) -> NodeKind {
		self.kind
	}

	pub(crate) fn state(&self) -> NodeState {
		*self.state.borrow()
	}

	/// A Stopped node never transitions again
	pub(crate) fn set_state(&self, next: NodeState) {
		self.state.send_if_modified(|s| {
			if *s == NodeState::Stopped || *s == next {
				return false;
			}
			*s = next;
			true
		});
	}

	/// Waits until the node reaches the Stopped state
	pub(crate) async fn wait_stopped(&self) {
		let mut rx = self.state.subscribe();
		// An error means the sender is gone, which only happens at drop
		let _ = rx.wait_for(|s| *s == NodeState::Stopped).await;
	}

	pub(crate) fn stop_on_disconnect(&self, dir: Disconnect) {
		match dir {
			Disconnect::Inbound => self.stop_on_inbound.store(true, Ordering::Relaxed),
			Disconnect::Outbound => self.stop_on_outbound.store(true, Ordering::Relaxed),
			Disconnect::Both => {
				self.stop_on_inbound.store(true, Ordering::Relaxed);
				self.stop_on_outbound.store(true, Ordering::Relaxed);
			}
		}
	}

	pub(crate) fn stops_on_inbound(&self) -> bool {
		self.stop_on_inbound.load(Ordering::Relaxed)
	}

	pub(crate) fn stops_on_outbound(&self) -> bool {
		self.stop_on_outbound.load(Ordering::Relaxed)
	}

	pub(crate) fn remove_on_stop(&self, v: bool) {
		self.remove_on_stop.store(v, Ordering::Relaxed);
	}

	pub(crate) fn removes_on_stop(&self) -> bool {
		self.remove_on_stop.load(Ordering::Relaxed)
	}
}
