use crate::cnf::{MAX_PIPE_CAPACITY, TEMP_NODE_PREFIX};
use crate::ctx::Context;
use crate::dbs::node::Disconnect;
use crate::dbs::pipe::PipeConfig;
use crate::dbs::plan::{InputDesc, SelectPlan};
use crate::dbs::processor::Forwarder;
use crate::dbs::source::SourceConfig;
use crate::dbs::store::{MemoryStore, SnapshotStore, DEFAULT_TAG};
use crate::dbs::topology::Topology;
use crate::err::Error;
use crate::registry::{Registry, Udsf};
use crate::sql::statements::{
	CreateFallback, CreateSinkStatement, CreateSourceStatement, CreateStateStatement,
	CreateStreamStatement, CreateTrigger, DropStatement, DropTarget, EvalStatement,
	InsertStatement, LoadStateStatement, SaveStateStatement, SelectStatement, UpdateStatement,
	UpdateTarget,
};
use crate::sql::{Assignments, Function, Object, Query, Statement, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use trice::Instant;

/// The result of one applied statement
#[derive(Debug)]
#[non_exhaustive]
pub struct Response {
	/// How long the statement took to apply
	pub time: Duration,
	/// The statement result; a plain Null for statements which produce
	/// no value
	pub result: Result<Value, Error>,
}

/// The process-wide counter behind temporary node names. Uniqueness is
/// only needed within one process lifetime.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

fn temp_name() -> String {
	format!("{}{}", TEMP_NODE_PREFIX, TEMP_COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// The list of node names created while applying one statement. A
/// failed statement unwinds them in reverse order, so a statement is
/// applied all-or-nothing.
struct Rollback {
	created: Vec<String>,
}

impl Rollback {
	fn new() -> Self {
		Self {
			created: Vec::new(),
		}
	}

	fn add(&mut self, name: impl Into<String>) {
		self.created.push(name.into());
	}

	async fn undo(self, topology: &Topology) {
		for name in self.created.iter().rev() {
			if let Err(e) = topology.remove(name).await {
				warn!("Failed to roll back node '{name}': {e}");
			}
		}
	}

	fn commit(mut self) {
		self.created.clear();
	}
}

/// The topology builder: maps each parsed statement onto construction
/// or mutation actions against the topology registry.
pub struct Executor {
	topology: Arc<Topology>,
	registry: Registry,
	store: Arc<dyn SnapshotStore>,
}

impl Executor {
	/// Creates a builder over a topology, copying the process-wide
	/// creator registries and using the in-memory snapshot store
	pub fn new(topology: Arc<Topology>) -> Self {
		Self {
			topology,
			registry: Registry::snapshot(),
			store: Arc::new(MemoryStore::new()),
		}
	}

	/// Replaces the creator registries used by this builder
	pub fn with_registry(mut self, registry: Registry) -> Self {
		self.registry = registry;
		self
	}

	/// Replaces the snapshot store used by SAVE STATE and LOAD STATE
	pub fn with_store(mut self, store: Arc<dyn SnapshotStore>) -> Self {
		self.store = store;
		self
	}

	pub fn topology(&self) -> &Arc<Topology> {
		&self.topology
	}

	fn ctx(&self) -> &Context {
		self.topology.context()
	}

	/// Parses a script and applies each statement in order
	pub async fn execute_str(&self, input: &str) -> Result<Vec<Response>, Error> {
		let query = crate::syn::parse(input)?;
		self.execute(query).await
	}

	/// Applies each statement of a parsed query in order. A failed
	/// statement is fully rolled back, but earlier statements remain
	/// applied.
	pub async fn execute(&self, query: Query) -> Result<Vec<Response>, Error> {
		let mut out = Vec::with_capacity(query.len());
		for stm in query {
			debug!("Executing: {stm}");
			let now = Instant::now();
			let result = self.apply(stm).await;
			out.push(Response {
				time: now.elapsed(),
				result,
			});
		}
		Ok(out)
	}

	/// Applies a single statement
	pub async fn apply(&self, stm: Statement) -> Result<Value, Error> {
		match stm {
			Statement::CreateSource(stm) => self.create_source(stm).await,
			Statement::CreateSink(stm) => self.create_sink(stm).await,
			Statement::CreateState(stm) => self.create_state(stm).await,
			Statement::CreateStream(stm) => self.create_stream(stm).await,
			Statement::Update(stm) => self.update(stm).await,
			Statement::Drop(stm) => self.drop(stm).await,
			Statement::Insert(stm) => self.insert(stm).await,
			Statement::PauseSource(stm) => {
				self.topology.source(&stm.name)?.pause()?;
				Ok(Value::Null)
			}
			Statement::ResumeSource(stm) => {
				self.topology.source(&stm.name)?.resume()?;
				Ok(Value::Null)
			}
			Statement::RewindSource(stm) => {
				self.topology.source(&stm.name)?.rewind().await?;
				Ok(Value::Null)
			}
			Statement::SaveState(stm) => self.save_state(stm).await,
			Statement::LoadState(stm) => self.load_state(stm).await,
			Statement::Eval(stm) => self.eval(stm),
			// Statements with no topology meaning fail loudly
			stm => Err(Error::NotImplemented(stm.variant_name().to_owned())),
		}
	}

	/// Folds a WITH or SET clause into a parameter record
	fn fold_params(&self, params: &Assignments) -> Result<Object, Error> {
		let mut obj = Object::new();
		for (k, v) in params.iter() {
			obj.insert(k.to_raw(), v.compute_foldable(&self.registry.functions)?);
		}
		Ok(obj)
	}

	async fn create_source(&self, stm: CreateSourceStatement) -> Result<Value, Error> {
		let creator = self
			.registry
			.sources
			.get(stm.kind.as_str())
			.ok_or_else(|| Error::NotFound(format!("source type '{}'", stm.kind)))?;
		let params = self.fold_params(&stm.params)?;
		let source = creator.create(self.ctx(), &params).await?;
		self.topology.add_source(
			stm.name.to_raw(),
			source,
			SourceConfig {
				paused_on_startup: stm.paused == Some(true),
			},
		)?;
		Ok(Value::Null)
	}

	async fn create_sink(&self, stm: CreateSinkStatement) -> Result<Value, Error> {
		let creator = self
			.registry
			.sinks
			.get(stm.kind.as_str())
			.ok_or_else(|| Error::NotFound(format!("sink type '{}'", stm.kind)))?;
		let params = self.fold_params(&stm.params)?;
		let sink = creator.create(self.ctx(), &params).await?;
		self.topology.add_sink(stm.name.to_raw(), sink)?;
		Ok(Value::Null)
	}

	async fn create_state(&self, stm: CreateStateStatement) -> Result<Value, Error> {
		let creator = self
			.registry
			.states
			.get(stm.kind.as_str())
			.ok_or_else(|| Error::NotFound(format!("state type '{}'", stm.kind)))?;
		let params = self.fold_params(&stm.params)?;
		let state = creator.create(self.ctx(), &params).await?;
		self.ctx().states().add(stm.name.to_raw(), state)?;
		Ok(Value::Null)
	}

	async fn create_stream(&self, stm: CreateStreamStatement) -> Result<Value, Error> {
		let mut rollback = Rollback::new();
		let result = match stm.selects.len() {
			1 => self.create_stream_select(&stm.name, &stm.selects[0], &mut rollback).await,
			_ => self.create_stream_union(&stm.name, &stm.selects, &mut rollback).await,
		};
		match result {
			Ok(()) => {
				rollback.commit();
				Ok(Value::Null)
			}
			Err(e) => {
				rollback.undo(&self.topology).await;
				Err(e)
			}
		}
	}

	/// Builds a single select box carrying the stream name
	async fn create_stream_select(
		&self,
		name: &str,
		stm: &SelectStatement,
		rollback: &mut Rollback,
	) -> Result<(), Error> {
		let node = self.build_select_box(name, stm, rollback).await?;
		node.core.stop_on_disconnect(Disconnect::Inbound);
		Ok(())
	}

	/// Builds one temporary box per sub-select plus a forwarder box
	/// carrying the stream name
	async fn create_stream_union(
		&self,
		name: &str,
		selects: &[SelectStatement],
		rollback: &mut Rollback,
	) -> Result<(), Error> {
		let mut temps = Vec::with_capacity(selects.len());
		for stm in selects {
			let tmp = temp_name();
			let node = self.build_select_box(&tmp, stm, rollback).await?;
			node.core.stop_on_disconnect(Disconnect::Both);
			node.core.remove_on_stop(true);
			temps.push(tmp);
		}
		let fwd = self.topology.add_box(name, Arc::new(Forwarder))?;
		rollback.add(name);
		fwd.core.stop_on_disconnect(Disconnect::Inbound);
		// Distinct composite labels keep the forwarder inputs apart
		for (i, tmp) in temps.iter().enumerate() {
			self.topology.connect(tmp, name, &format!("{tmp}/{i}"), PipeConfig::default())?;
		}
		Ok(())
	}

	/// Compiles a SELECT into a plan, adds its box, and wires every
	/// declared input. Aliases over the same upstream node share one
	/// physical input pipe.
	async fn build_select_box(
		&self,
		name: &str,
		stm: &SelectStatement,
		rollback: &mut Rollback,
	) -> Result<Arc<crate::dbs::BoxNode>, Error> {
		let mut descs: Vec<InputDesc> = Vec::with_capacity(stm.from.len());
		let mut deferred: Vec<String> = Vec::new();
		for rel in stm.from.iter() {
			let upstream = match &rel.source {
				crate::sql::RelationSource::Stream(id) => {
					// The upstream node must already exist
					self.topology.node(id)?;
					id.to_raw()
				}
				crate::sql::RelationSource::Udsf(fc) => {
					// Temporary sources start paused so nothing is
					// emitted before the wiring below is in place
					let (name, is_source) = self.instantiate_udsf(fc, rollback).await?;
					if is_source {
						deferred.push(name.clone());
					}
					name
				}
			};
			let capacity = match rel.capacity {
				Some(c) if c <= 0 || c > MAX_PIPE_CAPACITY => {
					return Err(Error::CapacityInvalid(c))
				}
				Some(c) => Some(c as usize),
				None => None,
			};
			let policy = rel.policy.map(Into::into);
			descs.push(InputDesc {
				label: upstream,
				alias: rel.alias_name(),
				window: rel.window,
				capacity,
				policy,
			});
		}
		// A self-join resolves to a single physical connection per
		// upstream; the first declaration's pipe options win
		let mut connects: Vec<(String, PipeConfig)> = Vec::new();
		for desc in descs.iter() {
			if connects.iter().any(|(u, _)| u == &desc.label) {
				continue;
			}
			let mut cfg = PipeConfig::default();
			if let Some(c) = desc.capacity {
				cfg.capacity = c;
			}
			if let Some(p) = desc.policy {
				cfg.policy = p;
			}
			connects.push((desc.label.clone(), cfg));
		}
		let plan = SelectPlan::compile(stm, descs, self.registry.functions.clone())?;
		let node = self.topology.add_box(name, Arc::new(plan))?;
		rollback.add(name);
		for (upstream, cfg) in connects {
			self.topology.connect(&upstream, name, &upstream, cfg)?;
		}
		// Release the temporary sources now that they are wired up
		for tmp in deferred {
			self.topology.source(&tmp)?.resume()?;
		}
		Ok(node)
	}

	/// Instantiates a UDSF reference as a temporary node. Returns the
	/// node name and whether it is a source, which the caller resumes
	/// once it is connected.
	async fn instantiate_udsf(
		&self,
		fc: &Function,
		rollback: &mut Rollback,
	) -> Result<(String, bool), Error> {
		let creator = self
			.registry
			.udsfs
			.get(fc.name.as_str())
			.ok_or_else(|| Error::UnknownFunction(fc.name.to_raw()))?;
		let mut args = Vec::with_capacity(fc.args.len());
		for a in fc.args.iter() {
			args.push(a.compute_foldable(&self.registry.functions)?);
		}
		let name = temp_name();
		let mut is_source = false;
		match creator.create(self.ctx(), args).await? {
			Udsf::Source(source) => {
				let node = self.topology.add_source(
					&name,
					source,
					SourceConfig {
						paused_on_startup: true,
					},
				)?;
				rollback.add(&name);
				node.core.stop_on_disconnect(Disconnect::Outbound);
				node.core.remove_on_stop(true);
				is_source = true;
			}
			Udsf::Box {
				processor,
				inputs,
			} => {
				let node = self.topology.add_box(&name, processor)?;
				rollback.add(&name);
				node.core.stop_on_disconnect(Disconnect::Both);
				node.core.remove_on_stop(true);
				// Wire the input streams the UDSF declares
				for input in inputs {
					self.topology.node(&input)?;
					self.topology.connect(&input, &name, &input, PipeConfig::default())?;
				}
			}
		}
		Ok((name, is_source))
	}

	async fn update(&self, stm: UpdateStatement) -> Result<Value, Error> {
		let params = self.fold_params(&stm.params)?;
		let name = stm.name.as_str();
		match stm.target {
			UpdateTarget::State => {
				let state = self.ctx().states().get(name)?;
				state.update(self.ctx(), &params).await.map_err(|e| named_capability(e, name))?;
			}
			UpdateTarget::Source => {
				self.topology.source(name)?.update(self.ctx(), &params).await?;
			}
			UpdateTarget::Sink => {
				self.topology.sink(name)?.update(self.ctx(), &params).await?;
			}
		}
		Ok(Value::Null)
	}

	async fn drop(&self, stm: DropStatement) -> Result<Value, Error> {
		let name = stm.name.as_str();
		match stm.target {
			DropTarget::Source => {
				self.topology.source(name)?;
				self.topology.remove(name).await?;
			}
			DropTarget::Stream => {
				self.topology.box_node(name)?;
				self.topology.remove(name).await?;
			}
			DropTarget::Sink => {
				self.topology.sink(name)?;
				self.topology.remove(name).await?;
			}
			DropTarget::State => {
				self.ctx().states().remove(self.ctx(), name).await?;
			}
		}
		Ok(Value::Null)
	}

	async fn insert(&self, stm: InsertStatement) -> Result<Value, Error> {
		// The producing node and the receiving sink must both exist
		let from = self.topology.node(&stm.from)?;
		self.topology.sink(&stm.sink)?;
		self.topology.connect(from.name(), &stm.sink, from.name(), PipeConfig::default())?;
		Ok(Value::Null)
	}

	async fn save_state(&self, stm: SaveStateStatement) -> Result<Value, Error> {
		let name = stm.name.as_str();
		let state = self.ctx().states().get(name)?;
		let Some(savable) = state.as_savable() else {
			return Err(Error::CapabilityMissing {
				name: name.to_owned(),
				capability: "SAVE STATE",
			});
		};
		let tag = stm.tag.as_ref().map(|t| t.to_raw()).unwrap_or_else(|| DEFAULT_TAG.to_owned());
		let mut writer = self.store.save(self.topology.name(), name, &tag).await?;
		let data = match savable.save(self.ctx()).await {
			Ok(data) => data,
			Err(e) => {
				let _ = writer.abort().await;
				return Err(e);
			}
		};
		if let Err(e) = writer.write_all(&data).await {
			let _ = writer.abort().await;
			return Err(e);
		}
		writer.commit().await?;
		Ok(Value::Null)
	}

	async fn load_state(&self, stm: LoadStateStatement) -> Result<Value, Error> {
		let params = self.fold_params(&stm.params)?;
		match self.try_load_state(&stm, &params).await? {
			true => Ok(Value::Null),
			// The snapshot does not exist; fall through to CREATE STATE
			// when a fallback clause was given
			false => match &stm.create {
				Some(fallback) => self.load_state_fallback(&stm, fallback).await,
				None => Err(Error::SnapshotNotFound {
					topology: self.topology.name().to_owned(),
					state: stm.name.to_raw(),
					tag: stm.tag.as_ref().map(|t| t.to_raw()).unwrap_or_else(|| {
						DEFAULT_TAG.to_owned()
					}),
				}),
			},
		}
	}

	/// Attempts to restore a state from its snapshot. A missing
	/// snapshot is reported separately from real failures, so callers
	/// may retry with defaults.
	async fn try_load_state(
		&self,
		stm: &LoadStateStatement,
		params: &Object,
	) -> Result<bool, Error> {
		let name = stm.name.as_str();
		// A registered state under the same name must keep its type
		if let Ok(existing) = self.ctx().states().get(name) {
			if existing.type_name() != stm.kind.as_str() {
				return Err(Error::TypeMismatch {
					message: format!(
						"the state '{name}' is a {}, not a {}",
						existing.type_name(),
						stm.kind
					),
				});
			}
		}
		let tag = stm.tag.as_ref().map(|t| t.to_raw()).unwrap_or_else(|| DEFAULT_TAG.to_owned());
		let mut reader = match self.store.load(self.topology.name(), name, &tag).await {
			Ok(r) => r,
			Err(Error::SnapshotNotFound {
				..
			}) => return Ok(false),
			Err(e) => return Err(e),
		};
		let data = reader.read_all().await?;
		let creator = self
			.registry
			.states
			.get(stm.kind.as_str())
			.ok_or_else(|| Error::NotFound(format!("state type '{}'", stm.kind)))?;
		let state = creator.load(self.ctx(), data, params).await?;
		// Replacement is atomic; terminating the old instance is logged
		// by the registry and never undoes the replace
		match self.ctx().states().contains(name) {
			true => self.ctx().states().replace(self.ctx(), name, state).await?,
			false => self.ctx().states().add(name, state)?,
		}
		Ok(true)
	}

	async fn load_state_fallback(
		&self,
		stm: &LoadStateStatement,
		fallback: &CreateFallback,
	) -> Result<Value, Error> {
		let name = stm.name.as_str();
		let registered = self.ctx().states().contains(name);
		// IF NOT EXISTS leaves an already-registered state untouched
		if fallback.trigger == CreateTrigger::NotExists && registered {
			return Ok(Value::Null);
		}
		let creator = self
			.registry
			.states
			.get(stm.kind.as_str())
			.ok_or_else(|| Error::NotFound(format!("state type '{}'", stm.kind)))?;
		let params = self.fold_params(&fallback.params)?;
		let state = creator.create(self.ctx(), &params).await?;
		match registered {
			true => self.ctx().states().replace(self.ctx(), name, state).await?,
			false => self.ctx().states().add(name, state)?,
		}
		Ok(Value::Null)
	}

	fn eval(&self, stm: EvalStatement) -> Result<Value, Error> {
		match stm.on {
			None => stm.expr.compute_foldable(&self.registry.functions),
			Some(on) => {
				let map = on.compute_foldable(&self.registry.functions)?;
				let Value::Object(obj) = map else {
					return Err(Error::TypeMismatch {
						message: format!(
							"EVAL ... ON expects a map, not a {} value",
							map.kind_name()
						),
					});
				};
				let rows = map! { String::from("input") => obj };
				stm.expr.compute_on(&rows, &self.registry.functions)
			}
		}
	}
}

/// Rewrites a generic capability error with the real object name
fn named_capability(e: Error, name: &str) -> Error {
	match e {
		Error::CapabilityMissing {
			capability,
			..
		} => Error::CapabilityMissing {
			name: name.to_owned(),
			capability,
		},
		e => e,
	}
}
