use once_cell::sync::Lazy;

/// Specifies how many tuples an input pipe buffers when no explicit
/// BUFFER SIZE clause is given.
pub static DEFAULT_PIPE_CAPACITY: Lazy<usize> =
	lazy_env_parse!("RIVULET_DEFAULT_PIPE_CAPACITY", usize, 1024);

/// The largest pipe capacity accepted by the topology builder. Capacities
/// must also be strictly positive.
pub const MAX_PIPE_CAPACITY: i64 = i32::MAX as i64;

/// Specifies how long a topology stop waits for the dataflow to drain
/// before remaining nodes are forcibly marked as stopped.
pub static DRAIN_TIMEOUT_SECS: Lazy<u64> = lazy_env_parse!("RIVULET_DRAIN_TIMEOUT_SECS", u64, 30);

/// The interval, in milliseconds, between two scans of the built-in
/// `node_statuses` and `edge_statuses` diagnostic sources.
pub static STATUS_SCAN_INTERVAL_MS: Lazy<u64> =
	lazy_env_parse!("RIVULET_STATUS_SCAN_INTERVAL_MS", u64, 1000);

/// The prefix used when the topology builder generates names for temporary
/// intermediate nodes. The numeric part comes from a process-wide counter.
pub const TEMP_NODE_PREFIX: &str = "rivulet_tmp_";

/// Whether nodes record trace events on the tuples they handle.
pub static TRACE_TUPLES: Lazy<bool> = lazy_env_parse!("RIVULET_TRACE_TUPLES", bool, false);
