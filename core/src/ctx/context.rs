use crate::dbs::{SharedStates, Topology};
use std::fmt::{self, Debug};
use std::sync::{Arc, Weak};

/// The per-topology context: the shared-state registry and a handle back
/// to the owning topology. Contexts are cheap to clone and are handed to
/// every node worker and user callback.
#[derive(Clone)]
pub struct Context {
	inner: Arc<Inner>,
}

struct Inner {
	/// The name of the owning topology
	topology: String,
	/// The shared-state registry
	states: SharedStates,
	/// The owning topology, when one exists. Weak, since the topology
	/// owns the nodes which hold this context.
	topo: Weak<Topology>,
}

impl Debug for Context {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("Context").field("topology", &self.inner.topology).finish()
	}
}

impl Context {
	/// Create a context not attached to any topology, for standalone
	/// expression evaluation and tests
	pub fn background() -> Self {
		Self {
			inner: Arc::new(Inner {
				topology: String::new(),
				states: SharedStates::default(),
				topo: Weak::new(),
			}),
		}
	}

	pub(crate) fn for_topology(name: String, topo: Weak<Topology>) -> Self {
		Self {
			inner: Arc::new(Inner {
				topology: name,
				states: SharedStates::default(),
				topo,
			}),
		}
	}

	/// The name of the owning topology
	pub fn topology_name(&self) -> &str {
		&self.inner.topology
	}

	/// The shared-state registry
	pub fn states(&self) -> &SharedStates {
		&self.inner.states
	}

	/// The owning topology, unless it has been dropped
	pub fn topology(&self) -> Option<Arc<Topology>> {
		self.inner.topo.upgrade()
	}
}
