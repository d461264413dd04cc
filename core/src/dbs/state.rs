use crate::ctx::Context;
use crate::err::Error;
use crate::sql::{Object, Value};
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::Value as Json;
use std::sync::Arc;

/// A named, typed, concurrency-safe object living outside the tuple
/// stream. States are addressed by name through the context registry.
#[async_trait]
pub trait SharedState: Send + Sync + 'static {
	/// The immutable type tag of this state
	fn type_name(&self) -> &'static str;

	/// The concrete instance, for callers which know the type behind
	/// the name
	fn as_any(&self) -> &dyn std::any::Any;

	/// Called when the state is removed or replaced
	async fn terminate(&self, ctx: &Context) -> Result<(), Error> {
		let _ = ctx;
		Ok(())
	}

	/// Applies UPDATE STATE parameters
	async fn update(&self, ctx: &Context, params: &Object) -> Result<(), Error> {
		let (_, _) = (ctx, params);
		Err(Error::CapabilityMissing {
			name: String::from("this state"),
			capability: "UPDATE",
		})
	}

	/// The savable view of this state, when its implementation permits
	/// snapshots
	fn as_savable(&self) -> Option<&dyn SavableSharedState> {
		None
	}
}

/// A shared state which can encode itself into a snapshot
#[async_trait]
pub trait SavableSharedState: SharedState {
	/// Encodes the current contents for the snapshot store
	async fn save(&self, ctx: &Context) -> Result<Vec<u8>, Error>;
}

/// The per-topology registry of shared states. Lookup is O(1) expected;
/// replacement is atomic and terminates the prior instance.
#[derive(Clone, Default)]
pub struct SharedStates {
	map: Arc<DashMap<String, Arc<dyn SharedState>>>,
}

impl SharedStates {
	pub fn get(&self, name: &str) -> Result<Arc<dyn SharedState>, Error> {
		self.map
			.get(name)
			.map(|e| e.value().clone())
			.ok_or_else(|| Error::NotFound(name.to_owned()))
	}

	pub fn contains(&self, name: &str) -> bool {
		self.map.contains_key(name)
	}

	pub fn add(&self, name: impl Into<String>, state: Arc<dyn SharedState>) -> Result<(), Error> {
		let name = name.into();
		match self.map.entry(name.clone()) {
			dashmap::mapref::entry::Entry::Occupied(_) => Err(Error::NameInUse(name)),
			dashmap::mapref::entry::Entry::Vacant(e) => {
				e.insert(state);
				Ok(())
			}
		}
	}

	/// Atomically replaces the state registered under a name, keeping
	/// the type tag stable, and terminates the prior instance. Errors
	/// from the old instance's termination are logged, not surfaced.
	pub async fn replace(
		&self,
		ctx: &Context,
		name: &str,
		state: Arc<dyn SharedState>,
	) -> Result<(), Error> {
		let old = {
			let mut e = match self.map.get_mut(name) {
				Some(e) => e,
				None => return Err(Error::NotFound(name.to_owned())),
			};
			if e.value().type_name() != state.type_name() {
				return Err(Error::TypeMismatch {
					message: format!(
						"the state '{name}' is a {}, not a {}",
						e.value().type_name(),
						state.type_name()
					),
				});
			}
			std::mem::replace(e.value_mut(), state)
		};
		if let Err(e) = old.terminate(ctx).await {
			warn!("Failed to terminate the replaced state '{name}': {e}");
		}
		Ok(())
	}

	/// Removes and terminates a state
	pub async fn remove(&self, ctx: &Context, name: &str) -> Result<(), Error> {
		let (name, old) =
			self.map.remove(name).ok_or_else(|| Error::NotFound(name.to_owned()))?;
		if let Err(e) = old.terminate(ctx).await {
			warn!("Failed to terminate the removed state '{name}': {e}");
		}
		Ok(())
	}

	pub fn names(&self) -> Vec<String> {
		self.map.iter().map(|e| e.key().clone()).collect()
	}
}

/// A general-purpose shared state holding one mutable value. It supports
/// UPDATE, SAVE STATE and LOAD STATE, and is the built-in `value` state
/// type.
pub struct ValueState {
	value: RwLock<Value>,
}

impl ValueState {
	pub fn new(value: Value) -> Self {
		Self {
			value: RwLock::new(value),
		}
	}

	/// The initial contents described by CREATE STATE parameters: the
	/// `value` parameter if present, otherwise the whole parameter map
	pub fn from_params(params: &Object) -> Self {
		let value = match params.0.get("value") {
			Some(v) => v.clone(),
			None => Value::Object(params.clone()),
		};
		Self::new(value)
	}

	pub fn value(&self) -> Value {
		self.value.read().clone()
	}

	pub fn set(&self, v: Value) {
		*self.value.write() = v;
	}
}

#[async_trait]
impl SharedState for ValueState {
	fn type_name(&self) -> &'static str {
		"value"
	}

	fn as_any(&self) -> &dyn std::any::Any {
		self
	}

	async fn update(&self, _: &Context, params: &Object) -> Result<(), Error> {
		for (k, v) in params.0.iter() {
			match k.as_str() {
				// Setting `value` swaps the whole contents
				"value" => *self.value.write() = v.clone(),
				k => {
					let mut value = self.value.write();
					value.put(&[crate::sql::Part::Field(k.into())], v.clone())?;
				}
			}
		}
		Ok(())
	}

	fn as_savable(&self) -> Option<&dyn SavableSharedState> {
		Some(self)
	}
}

#[async_trait]
impl SavableSharedState for ValueState {
	async fn save(&self, _: &Context) -> Result<Vec<u8>, Error> {
		let json = Json::from(self.value());
		Ok(serde_json::to_vec(&json)?)
	}
}

impl ValueState {
	/// Reconstructs the state from snapshot bytes
	pub fn load(data: &[u8]) -> Result<Self, Error> {
		let json: Json = serde_json::from_slice(data)?;
		Ok(Self::new(Value::from(json)))
	}
}
