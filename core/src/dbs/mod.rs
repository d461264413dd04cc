//! The dataflow runtime: tuples, bounded pipes, node workers, the
//! topology registry, the windowed select plan, and the statement
//! executor which builds topologies out of parsed BQL.

mod executor;
mod group;
mod node;
mod pipe;
mod plan;
mod processor;
mod result;
mod sink;
mod source;
mod state;
mod store;
mod topology;
mod tuple;
mod window;

pub mod builtin;

pub use self::executor::{Executor, Response};
pub use self::node::{Disconnect, NodeKind, NodeState};
pub use self::pipe::{pipe, DropPolicy, Outputs, PipeConfig, PipeReceiver, PipeSender, TryRecv};
pub use self::plan::SelectPlan;
pub use self::processor::{BoxNode, Processor};
pub use self::sink::{Sink, SinkNode};
pub use self::source::{Source, SourceConfig, SourceNode, SourceWriter};
pub use self::state::{SavableSharedState, SharedState, SharedStates, ValueState};
pub use self::store::{
	MemoryStore, SnapshotReader, SnapshotStore, SnapshotWriter, DEFAULT_TAG,
};
pub use self::topology::{Node, Topology};
pub use self::tuple::{TraceEvent, TraceKind, Tuple};
