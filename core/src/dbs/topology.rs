use crate::cnf::DRAIN_TIMEOUT_SECS;
use crate::ctx::Context;
use crate::dbs::node::{Disconnect, NodeCore, NodeKind, NodeState};
use crate::dbs::pipe::{pipe, PipeConfig, PipeSender};
use crate::dbs::processor::{BoxNode, Processor};
use crate::dbs::sink::{Sink, SinkNode};
use crate::dbs::source::{Source, SourceConfig, SourceNode};
use crate::err::Error;
use crate::sql::{is_plain_ident, Object, Value};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

/// A node handle of any kind
#[derive(Clone)]
#[non_exhaustive]
pub enum Node {
	Source(Arc<SourceNode>),
	Box(Arc<BoxNode>),
	Sink(Arc<SinkNode>),
}

impl Node {
	pub fn name(&self) -> &str {
		self.core().name()
	}

	pub fn kind(&self) -> NodeKind {
		self.core().kind()
	}

	pub fn state(&self) -> NodeState {
		self.core().state()
	}

	pub(crate) fn core(&self) -> &Arc<NodeCore> {
		match self {
			Node::Source(n) => &n.core,
			Node::Box(n) => &n.core,
			Node::Sink(n) => &n.core,
		}
	}

	/// Marks the node to stop once the given connection direction has
	/// fully disconnected
	pub fn stop_on_disconnect(&self, dir: Disconnect) {
		self.core().stop_on_disconnect(dir);
	}

	/// Marks the node for removal from the registry once Stopped
	pub fn remove_on_stop(&self) {
		self.core().remove_on_stop(true);
	}

	async fn stop(&self) {
		match self {
			Node::Source(n) => n.stop().await,
			Node::Box(n) => n.stop(),
			Node::Sink(n) => n.stop(),
		}
	}

	pub(crate) async fn wait_stopped(&self) {
		match self {
			Node::Source(n) => n.wait_stopped().await,
			Node::Box(n) => n.wait_stopped().await,
			Node::Sink(n) => n.wait_stopped().await,
		}
	}

	/// Aborts the worker and marks the node stopped, for nodes which
	/// did not drain within the stop bound
	fn force_stop(&self) {
		match self {
			Node::Source(n) => n.force_stop(),
			Node::Box(n) => n.force_stop(),
			Node::Sink(n) => n.force_stop(),
		}
	}
}

/// One pipe between two nodes
pub(crate) struct Edge {
	pub(crate) from: String,
	pub(crate) to: String,
	pub(crate) label: String,
	sender: PipeSender,
}

/// The named collection of running nodes and their connections
pub struct Topology {
	name: String,
	ctx: Context,
	nodes: RwLock<BTreeMap<String, Node>>,
	edges: RwLock<Vec<Edge>>,
}

impl Topology {
	/// Creates an empty topology
	pub fn new(name: impl Into<String>) -> Arc<Self> {
		let name = name.into();
		Arc::new_cyclic(|weak| Self {
			ctx: Context::for_topology(name.clone(), weak.clone()),
			name,
			nodes: RwLock::new(BTreeMap::new()),
			edges: RwLock::new(Vec::new()),
		})
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn context(&self) -> &Context {
		&self.ctx
	}

	fn check_name(&self, name: &str) -> Result<(), Error> {
		if !is_plain_ident(name) {
			return Err(Error::InvalidName(name.to_owned()));
		}
		Ok(())
	}

	/// Registers and starts a source node
	pub fn add_source(
		&self,
		name: impl Into<String>,
		source: Arc<dyn Source>,
		cfg: SourceConfig,
	) -> Result<Arc<SourceNode>, Error> {
		let name = name.into();
		self.check_name(&name)?;
		let mut nodes = self.nodes.write();
		if nodes.contains_key(&name) {
			return Err(Error::NameInUse(name));
		}
		let core = Arc::new(NodeCore::new(name.clone(), NodeKind::Source));
		let node = SourceNode::spawn(self.ctx.clone(), core, source, cfg);
		nodes.insert(name, Node::Source(node.clone()));
		Ok(node)
	}

	/// Registers and starts a box node
	pub fn add_box(
		&self,
		name: impl Into<String>,
		processor: Arc<dyn Processor>,
	) -> Result<Arc<BoxNode>, Error> {
		let name = name.into();
		self.check_name(&name)?;
		let mut nodes = self.nodes.write();
		if nodes.contains_key(&name) {
			return Err(Error::NameInUse(name));
		}
		let core = Arc::new(NodeCore::new(name.clone(), NodeKind::Box));
		let node = BoxNode::spawn(self.ctx.clone(), core, processor);
		nodes.insert(name, Node::Box(node.clone()));
		Ok(node)
	}

	/// Registers and starts a sink node
	pub fn add_sink(
		&self,
		name: impl Into<String>,
		sink: Arc<dyn Sink>,
	) -> Result<Arc<SinkNode>, Error> {
		let name = name.into();
		self.check_name(&name)?;
		let mut nodes = self.nodes.write();
		if nodes.contains_key(&name) {
			return Err(Error::NameInUse(name));
		}
		let core = Arc::new(NodeCore::new(name.clone(), NodeKind::Sink));
		let node = SinkNode::spawn(self.ctx.clone(), core, sink);
		nodes.insert(name, Node::Sink(node.clone()));
		Ok(node)
	}

	/// Looks a node up by name
	pub fn node(&self, name: &str) -> Result<Node, Error> {
		self.nodes.read().get(name).cloned().ok_or_else(|| Error::NotFound(name.to_owned()))
	}

	/// Looks a source up by name
	pub fn source(&self, name: &str) -> Result<Arc<SourceNode>, Error> {
		match self.node(name)? {
			Node::Source(n) => Ok(n),
			n => Err(Error::WrongKind {
				name: name.to_owned(),
				expected: "source",
				actual: n.kind().as_str(),
			}),
		}
	}

	/// Looks a box up by name
	pub fn box_node(&self, name: &str) -> Result<Arc<BoxNode>, Error> {
		match self.node(name)? {
			Node::Box(n) => Ok(n),
			n => Err(Error::WrongKind {
				name: name.to_owned(),
				expected: "box",
				actual: n.kind().as_str(),
			}),
		}
	}

	/// Looks a sink up by name
	pub fn sink(&self, name: &str) -> Result<Arc<SinkNode>, Error> {
		match self.node(name)? {
			Node::Sink(n) => Ok(n),
			n => Err(Error::WrongKind {
				name: name.to_owned(),
				expected: "sink",
				actual: n.kind().as_str(),
			}),
		}
	}

	/// The names of every registered node
	pub fn node_names(&self) -> Vec<String> {
		self.nodes.read().keys().cloned().collect()
	}

	/// Connects a producing node to a consuming node with a new pipe
	/// carrying the given input label
	pub fn connect(
		&self,
		from: &str,
		to: &str,
		label: &str,
		cfg: PipeConfig,
	) -> Result<(), Error> {
		let from_node = self.node(from)?;
		let to_node = self.node(to)?;
		// Sinks produce nothing and sources consume nothing
		let outputs = match &from_node {
			Node::Source(n) => n.outputs.clone(),
			Node::Box(n) => n.outputs.clone(),
			Node::Sink(_) => {
				return Err(Error::WrongDirection {
					from: from.to_owned(),
					to: to.to_owned(),
					message: "a sink has no outputs",
				})
			}
		};
		let inputs = match &to_node {
			Node::Box(n) => n.inputs.clone(),
			Node::Sink(n) => n.inputs.clone(),
			Node::Source(_) => {
				return Err(Error::WrongDirection {
					from: from.to_owned(),
					to: to.to_owned(),
					message: "a source has no inputs",
				})
			}
		};
		if inputs.has_label(label) {
			return Err(Error::DuplicateInput {
				node: to.to_owned(),
				label: label.to_owned(),
			});
		}
		// Reject wiring which would close a cycle
		if self.reaches(to, from) {
			return Err(Error::CyclicConnection {
				from: from.to_owned(),
				to: to.to_owned(),
			});
		}
		let (tx, rx) = pipe(label, cfg);
		let edge = Edge {
			from: from.to_owned(),
			to: to.to_owned(),
			label: label.to_owned(),
			sender: tx.clone(),
		};
		inputs.add(rx);
		outputs.add(edge_key(to, label), tx);
		self.edges.write().push(edge);
		debug!("Connected {from} to {to} as input '{label}'");
		Ok(())
	}

	/// Whether tuples can flow from one node to another over the
	/// current edges
	fn reaches(&self, from: &str, to: &str) -> bool {
		if from == to {
			return true;
		}
		let edges = self.edges.read();
		let mut stack = vec![from.to_owned()];
		let mut seen = vec![from.to_owned()];
		while let Some(cur) = stack.pop() {
			for e in edges.iter().filter(|e| e.from == cur) {
				if e.to == to {
					return true;
				}
				if !seen.contains(&e.to) {
					seen.push(e.to.clone());
					stack.push(e.to.clone());
				}
			}
		}
		false
	}

	/// Stops a node, waits until it is fully stopped, and unregisters
	/// it. Removing an absent node is not an error.
	pub async fn remove(&self, name: &str) -> Result<(), Error> {
		let node = match self.nodes.read().get(name).cloned() {
			Some(n) => n,
			None => return Ok(()),
		};
		node.stop().await;
		node.wait_stopped().await;
		self.unregister(name);
		Ok(())
	}

	/// Drops a node from the registry and severs its remaining edges.
	/// The node must already be stopped, or stopping on its own.
	pub(crate) fn unregister(&self, name: &str) {
		let upstream: Vec<(String, String, String)> = {
			let mut edges = self.edges.write();
			let severed: Vec<_> = edges
				.iter()
				.filter(|e| e.from == name || e.to == name)
				.map(|e| (e.from.clone(), e.to.clone(), e.label.clone()))
				.collect();
			edges.retain(|e| e.from != name && e.to != name);
			severed
		};
		// Close the feeding pipes held by upstream nodes
		for (from, to, label) in upstream.iter().filter(|(_, to, _)| to == name) {
			if let Ok(node) = self.node(from) {
				match node {
					Node::Source(n) => n.outputs.remove(&edge_key(to, label)),
					Node::Box(n) => n.outputs.remove(&edge_key(to, label)),
					Node::Sink(_) => {}
				}
			}
		}
		self.nodes.write().remove(name);
		debug!("Unregistered node {name}");
	}

	/// One diagnostic record per node
	pub fn node_statuses(&self) -> Vec<Object> {
		let nodes = self.nodes.read();
		let edges = self.edges.read();
		let mut out = Vec::with_capacity(nodes.len());
		for (name, node) in nodes.iter() {
			let mut input_counts = Object::new();
			let snapshot = match node {
				Node::Box(n) => n.inputs.counter_snapshot(),
				Node::Sink(n) => n.inputs.counter_snapshot(),
				Node::Source(_) => Vec::new(),
			};
			for (label, c) in snapshot {
				input_counts.insert(label, Value::from(c.delivered.load(Ordering::Relaxed) as i64));
			}
			let mut output_counts = Object::new();
			let mut dropped_counts = Object::new();
			for e in edges.iter().filter(|e| &e.from == name) {
				let c = e.sender.counters();
				output_counts
					.insert(e.to.clone(), Value::from(c.enqueued.load(Ordering::Relaxed) as i64));
				dropped_counts
					.insert(e.to.clone(), Value::from(c.dropped.load(Ordering::Relaxed) as i64));
			}
			out.push(Object(map! {
				String::from("node_name") => Value::from(name.clone()),
				String::from("node_type") => Value::from(node.kind().as_str()),
				String::from("state") => Value::from(node.state().as_str()),
				String::from("input_counts") => Value::Object(input_counts),
				String::from("output_counts") => Value::Object(output_counts),
				String::from("dropped_counts") => Value::Object(dropped_counts),
			}));
		}
		out
	}

	/// One diagnostic record per pipe
	pub fn edge_statuses(&self) -> Vec<Object> {
		let edges = self.edges.read();
		let mut out = Vec::with_capacity(edges.len());
		for e in edges.iter() {
			let c = e.sender.counters();
			out.push(Object(map! {
				String::from("node_name") => Value::from(format!("{}->{}", e.from, e.to)),
				String::from("node_type") => Value::from("pipe"),
				String::from("state") => Value::from(match e.sender.is_closed() {
					true => "closed",
					false => "open",
				}),
				String::from("input_counts") => Value::from(c.enqueued.load(Ordering::Relaxed) as i64),
				String::from("output_counts") => Value::from(c.delivered.load(Ordering::Relaxed) as i64),
				String::from("dropped_counts") => Value::from(c.dropped.load(Ordering::Relaxed) as i64),
			}));
		}
		out
	}

	/// Stops the whole topology: sources first, then a bounded wait for
	/// the dataflow to drain. Past the bound, remaining nodes are
	/// forcibly marked stopped.
	pub async fn stop(&self) {
		let nodes: Vec<Node> = self.nodes.read().values().cloned().collect();
		// Stop every source so no new tuples enter the dataflow
		for node in nodes.iter() {
			if let Node::Source(n) = node {
				n.stop().await;
			}
		}
		// Everything else drains and stops once its inputs close
		for node in nodes.iter() {
			node.stop_on_disconnect(Disconnect::Inbound);
		}
		let drain = async {
			for node in nodes.iter() {
				node.wait_stopped().await;
			}
		};
		let bound = Duration::from_secs(*DRAIN_TIMEOUT_SECS);
		if tokio::time::timeout(bound, drain).await.is_err() {
			warn!("{}", Error::DrainTimedOut(*DRAIN_TIMEOUT_SECS));
			for node in nodes.iter() {
				node.force_stop();
			}
		}
	}
}

fn edge_key(to: &str, label: &str) -> String {
	format!("{to}/{label}")
}
