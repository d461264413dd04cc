//! The process-wide creator registries. Each process holds one global
//! registry of scalar functions, UDSFs, and source, sink and state
//! creators; a topology builder copies it at construction, so that later
//! global registrations never affect a running topology.

use crate::ctx::Context;
use crate::dbs::{Processor, SharedState, Sink, Source};
use crate::err::Error;
use crate::sql::{Object, Value};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A user-defined scalar function
pub type ScalarFn = Arc<dyn Fn(Vec<Value>) -> Result<Value, Error> + Send + Sync>;

/// The scalar function registry. Built-in functions are consulted after
/// user registrations, so a user function may shadow a built-in name.
#[derive(Clone, Default)]
pub struct Functions {
	scalars: BTreeMap<String, ScalarFn>,
}

impl Functions {
	pub fn register(&mut self, name: impl Into<String>, f: ScalarFn) {
		self.scalars.insert(name.into(), f);
	}

	pub(crate) fn run(&self, name: &str, args: Vec<Value>) -> Result<Value, Error> {
		match self.scalars.get(name) {
			Some(f) => f(args),
			None => crate::fnc::synchronous(name, args),
		}
	}
}

/// What a UDSF reference in a FROM clause instantiates into
pub enum Udsf {
	/// A source-mode UDSF produces tuples from its arguments alone
	Source(Arc<dyn Source>),
	/// A box-mode UDSF consumes the input streams it declares
	Box {
		processor: Arc<dyn Processor>,
		inputs: Vec<String>,
	},
}

/// Instantiates a user-defined stream function per FROM-clause reference
#[async_trait]
pub trait UdsfCreator: Send + Sync {
	async fn create(&self, ctx: &Context, args: Vec<Value>) -> Result<Udsf, Error>;
}

/// Instantiates a source from its CREATE SOURCE parameters
#[async_trait]
pub trait SourceCreator: Send + Sync {
	async fn create(&self, ctx: &Context, params: &Object) -> Result<Arc<dyn Source>, Error>;
}

/// Instantiates a sink from its CREATE SINK parameters
#[async_trait]
pub trait SinkCreator: Send + Sync {
	async fn create(&self, ctx: &Context, params: &Object) -> Result<Arc<dyn Sink>, Error>;
}

/// Instantiates a shared state from its CREATE STATE parameters, and
/// optionally reconstructs one from a saved snapshot
#[async_trait]
pub trait StateCreator: Send + Sync {
	async fn create(&self, ctx: &Context, params: &Object)
		-> Result<Arc<dyn SharedState>, Error>;

	/// Reconstructs a state from snapshot bytes. Creators without this
	/// capability reject LOAD STATE.
	async fn load(
		&self,
		ctx: &Context,
		data: Vec<u8>,
		params: &Object,
	) -> Result<Arc<dyn SharedState>, Error> {
		let (_, _, _) = (ctx, data, params);
		Err(Error::CapabilityMissing {
			name: String::from("this state type"),
			capability: "loading saved snapshots",
		})
	}
}

/// One immutable snapshot of every creator registry
#[derive(Clone, Default)]
pub struct Registry {
	pub(crate) functions: Functions,
	pub(crate) udsfs: BTreeMap<String, Arc<dyn UdsfCreator>>,
	pub(crate) sources: BTreeMap<String, Arc<dyn SourceCreator>>,
	pub(crate) sinks: BTreeMap<String, Arc<dyn SinkCreator>>,
	pub(crate) states: BTreeMap<String, Arc<dyn StateCreator>>,
}

impl Registry {
	/// A registry holding only the built-in types
	pub fn base() -> Self {
		let mut r = Registry::default();
		crate::dbs::builtin::register(&mut r);
		r
	}

	/// Copies the current process-wide registry
	pub fn snapshot() -> Self {
		GLOBAL.read().clone()
	}

	pub fn register_function(&mut self, name: impl Into<String>, f: ScalarFn) {
		self.functions.register(name, f);
	}

	pub fn register_udsf(&mut self, name: impl Into<String>, c: Arc<dyn UdsfCreator>) {
		self.udsfs.insert(name.into(), c);
	}

	pub fn register_source_type(&mut self, name: impl Into<String>, c: Arc<dyn SourceCreator>) {
		self.sources.insert(name.into(), c);
	}

	pub fn register_sink_type(&mut self, name: impl Into<String>, c: Arc<dyn SinkCreator>) {
		self.sinks.insert(name.into(), c);
	}

	pub fn register_state_type(&mut self, name: impl Into<String>, c: Arc<dyn StateCreator>) {
		self.states.insert(name.into(), c);
	}
}

static GLOBAL: Lazy<RwLock<Registry>> = Lazy::new(|| RwLock::new(Registry::base()));

/// Registers a scalar function in the process-wide registry
pub fn register_function(name: impl Into<String>, f: ScalarFn) {
	GLOBAL.write().register_function(name, f)
}

/// Registers a UDSF creator in the process-wide registry
pub fn register_udsf(name: impl Into<String>, c: Arc<dyn UdsfCreator>) {
	GLOBAL.write().register_udsf(name, c)
}

/// Registers a source type in the process-wide registry
pub fn register_source_type(name: impl Into<String>, c: Arc<dyn SourceCreator>) {
	GLOBAL.write().register_source_type(name, c)
}

/// Registers a sink type in the process-wide registry
pub fn register_sink_type(name: impl Into<String>, c: Arc<dyn SinkCreator>) {
	GLOBAL.write().register_sink_type(name, c)
}

/// Registers a state type in the process-wide registry
pub fn register_state_type(name: impl Into<String>, c: Arc<dyn StateCreator>) {
	GLOBAL.write().register_state_type(name, c)
}
