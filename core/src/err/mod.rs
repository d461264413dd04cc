use thiserror::Error;

/// The errors which can occur while parsing statements, building a
/// topology, or running a dataflow.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
	/// The statement text could not be parsed
	#[error("Parse error at line {line}, column {col}: {message}")]
	Syntax {
		line: usize,
		col: usize,
		message: String,
	},

	/// The submitted statement text was empty
	#[error("The query was empty")]
	QueryEmpty,

	/// The node name is already registered in the topology
	#[error("The name '{0}' is already in use")]
	NameInUse(String),

	/// The node name is not a valid identifier
	#[error("The name '{0}' is not a valid node name")]
	InvalidName(String),

	/// No node or state with this name exists
	#[error("No node or state named '{0}' exists")]
	NotFound(String),

	/// A node exists under this name, but it is of a different kind
	#[error("The node '{name}' is a {actual}, not a {expected}")]
	WrongKind {
		name: String,
		expected: &'static str,
		actual: &'static str,
	},

	/// A connection was attempted against the flow direction
	#[error("Cannot connect '{from}' to '{to}': {message}")]
	WrongDirection {
		from: String,
		to: String,
		message: &'static str,
	},

	/// The input label is already connected on the destination node
	#[error("The node '{node}' already has an input labelled '{label}'")]
	DuplicateInput {
		node: String,
		label: String,
	},

	/// The connection would introduce a cycle into the topology
	#[error("Connecting '{from}' to '{to}' would create a cycle")]
	CyclicConnection {
		from: String,
		to: String,
	},

	/// Two values of incompatible types met in an expression
	#[error("Type mismatch: {message}")]
	TypeMismatch {
		message: String,
	},

	/// A value could not be cast to the requested type
	#[error("Cannot cast {from} to {into}")]
	CastFailure {
		from: String,
		into: &'static str,
	},

	/// The expression references a column and cannot be folded
	#[error("The expression '{0}' references an input column and is not foldable")]
	NotFoldable(String),

	/// A column reference did not name its input and more than one is in scope
	#[error("The column reference '{0}' is ambiguous across multiple inputs")]
	AmbiguousColumn(String),

	/// The referenced object does not implement the required capability
	#[error("'{name}' does not support {capability}")]
	CapabilityMissing {
		name: String,
		capability: &'static str,
	},

	/// The declared buffer capacity is out of range
	#[error("The buffer capacity {0} is out of range")]
	CapacityInvalid(i64),

	/// The window range is out of range
	#[error("The window range {0} is invalid")]
	WindowInvalid(i64),

	/// The statement variant is recognised but not supported here
	#[error("The statement '{0}' is not implemented by the topology builder")]
	NotImplemented(String),

	/// The receiving end of a pipe is gone; a normal termination marker
	#[error("The downstream pipe is closed")]
	PipeClosed,

	/// The source was stopped; a normal termination marker
	#[error("The source has been stopped")]
	SourceStopped,

	/// A panic escaped from user-provided node code
	#[error("Panic in node '{node}': {message}")]
	UserPanic {
		node: String,
		message: String,
	},

	/// No snapshot exists under the requested name and tag
	#[error("No saved state for '{state}' with tag '{tag}' in topology '{topology}'")]
	SnapshotNotFound {
		topology: String,
		state: String,
		tag: String,
	},

	/// The snapshot storage layer failed
	#[error("Snapshot storage error: {0}")]
	SnapshotIo(String),

	/// There is no function registered under this name
	#[error("There is no function named '{0}'")]
	UnknownFunction(String),

	/// The function was called with the wrong arguments
	#[error("Invalid arguments for {name}(): {message}")]
	InvalidArguments {
		name: String,
		message: String,
	},

	/// The node is in a state from which the transition is not legal
	#[error("The node '{node}' cannot {action} while {state}")]
	InvalidLifecycle {
		node: String,
		action: &'static str,
		state: String,
	},

	/// The topology did not drain within the configured bound
	#[error("The topology did not drain within {0} seconds")]
	DrainTimedOut(u64),

	/// A serialization or deserialization problem with a state snapshot
	#[error("State encoding error: {0}")]
	StateEncoding(String),
}

impl From<serde_json::Error> for Error {
	fn from(e: serde_json::Error) -> Error {
		Error::StateEncoding(e.to_string())
	}
}
