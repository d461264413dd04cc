use crate::sql::{Datetime, Object};
use serde::{Deserialize, Serialize};

/// The kind of a trace event
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TraceKind {
	/// The tuple entered a node
	Input,
	/// The tuple left a node
	Output,
	/// Anything else a node wants to record
	Other,
}

/// One step of a tuple's journey through the topology, for diagnostics
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct TraceEvent {
	pub when: Datetime,
	pub node: String,
	pub kind: TraceKind,
}

/// A timestamped record flowing through the topology. Tuples are cloned
/// on fan-out, so a downstream node never observes another consumer's
/// mutations.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Tuple {
	/// The payload
	pub data: Object,
	/// The event-time instant
	pub time: Datetime,
	/// The wall-clock instant at source ingress
	pub proc_time: Datetime,
	/// The logical input port at which the current node received this
	/// tuple. Multi-input boxes use it to route into the right window.
	pub input_name: String,
	/// The optional trace of nodes this tuple passed through
	pub trace: Vec<TraceEvent>,
}

impl Tuple {
	/// A tuple carrying the given payload, stamped with the current
	/// wall clock for both timestamps
	pub fn new(data: Object) -> Self {
		let now = Datetime::now();
		Self {
			data,
			time: now,
			proc_time: now,
			input_name: String::new(),
			trace: Vec::new(),
		}
	}

	/// A tuple with an explicit event time
	pub fn at(data: Object, time: Datetime) -> Self {
		Self {
			data,
			time,
			proc_time: Datetime::now(),
			input_name: String::new(),
			trace: Vec::new(),
		}
	}

	pub(crate) fn trace(&mut self, node: &str, kind: TraceKind) {
		self.trace.push(TraceEvent {
			when: Datetime::now(),
			node: node.to_owned(),
			kind,
		});
	}
}
