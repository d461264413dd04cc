//! End-to-end scenarios: BQL statements applied through the executor
//! against a live topology.

use rivulet_core::dbs::builtin::CollectorSink;
use rivulet_core::dbs::{Executor, NodeState, Topology, Tuple};
use rivulet_core::err::Error;
use rivulet_core::registry::Registry;
use rivulet_core::sql::Value;
use std::time::Duration;

fn executor(name: &str) -> Executor {
	Executor::new(Topology::new(name)).with_registry(Registry::base())
}

async fn apply_all(exe: &Executor, script: &str) {
	for r in exe.execute_str(script).await.unwrap() {
		r.result.unwrap();
	}
}

async fn collect(rx: &rivulet_core::channel::Receiver<Tuple>, n: usize) -> Vec<Tuple> {
	let mut out = Vec::with_capacity(n);
	for _ in 0..n {
		let t = tokio::time::timeout(Duration::from_secs(5), rx.recv())
			.await
			.expect("timed out waiting for a tuple")
			.expect("the collector channel closed early");
		out.push(t);
	}
	out
}

fn field(t: &Tuple, name: &str) -> Value {
	t.data.0.get(name).cloned().unwrap_or(Value::Null)
}

#[test_log::test(tokio::test)]
async fn istream_count_over_sliding_window() {
	let exe = executor("istream_count");
	let (sink, rx) = CollectorSink::new();
	exe.topology().add_sink("out", sink).unwrap();
	apply_all(
		&exe,
		"CREATE SOURCE PAUSED x TYPE dummy WITH num = 3, interval_ms = 1;
		 CREATE STREAM y AS SELECT ISTREAM count(*) AS c FROM x [RANGE 2 TUPLES];
		 INSERT INTO out FROM y;
		 RESUME SOURCE x;",
	)
	.await;
	let got: Vec<Value> = collect(&rx, 3).await.iter().map(|t| field(t, "c")).collect();
	assert_eq!(got, vec![Value::from(1i64), Value::from(2i64), Value::from(2i64)]);
}

#[test_log::test(tokio::test)]
async fn self_join_uses_one_physical_input() {
	let exe = executor("self_join");
	let (sink, rx) = CollectorSink::new();
	exe.topology().add_sink("out", sink).unwrap();
	apply_all(
		&exe,
		"CREATE SOURCE PAUSED x TYPE dummy WITH num = 2, interval_ms = 1;
		 CREATE STREAM y AS SELECT RSTREAM a:n + b:n AS s \
		     FROM x AS a [RANGE 1 TUPLES], x AS b [RANGE 1 TUPLES];
		 INSERT INTO out FROM y;",
	)
	.await;
	// The box has exactly one physical input, labelled with the
	// upstream node's name
	let statuses = exe.topology().node_statuses();
	let y = statuses
		.iter()
		.find(|s| s.0.get("node_name") == Some(&Value::from("y")))
		.expect("y not in node statuses");
	match y.0.get("input_counts") {
		Some(Value::Object(counts)) => {
			assert_eq!(counts.0.keys().collect::<Vec<_>>(), vec!["x"]);
		}
		v => panic!("unexpected input_counts: {v:?}"),
	}
	apply_all(&exe, "RESUME SOURCE x;").await;
	let got: Vec<Value> = collect(&rx, 2).await.iter().map(|t| field(t, "s")).collect();
	// Both alias buffers observe each arrival
	assert_eq!(got, vec![Value::from(2i64), Value::from(4i64)]);
}

#[test_log::test(tokio::test)]
async fn union_failure_rolls_back_every_node() {
	let exe = executor("union_rollback");
	apply_all(&exe, "CREATE SOURCE PAUSED x TYPE dummy WITH num = 1;").await;
	let before = exe.topology().node_names();
	let err = exe
		.execute_str(
			"CREATE STREAM z AS SELECT ISTREAM a FROM missing \
			 UNION ALL SELECT ISTREAM a FROM x",
		)
		.await
		.unwrap()
		.remove(0)
		.result
		.unwrap_err();
	assert!(matches!(err, Error::NotFound(_)), "unexpected error: {err}");
	// No orphan temporaries remain
	assert_eq!(exe.topology().node_names(), before);
}

#[test_log::test(tokio::test)]
async fn union_merges_both_branches() {
	let exe = executor("union_merge");
	let (sink, rx) = CollectorSink::new();
	exe.topology().add_sink("out", sink).unwrap();
	apply_all(
		&exe,
		"CREATE SOURCE PAUSED x TYPE dummy WITH num = 2, interval_ms = 1;
		 CREATE STREAM z AS SELECT RSTREAM n FROM x [RANGE 1 TUPLES] \
		     UNION ALL SELECT RSTREAM n * 10 AS n FROM x [RANGE 1 TUPLES];
		 INSERT INTO out FROM z;
		 RESUME SOURCE x;",
	)
	.await;
	let mut got: Vec<i64> = collect(&rx, 4)
		.await
		.iter()
		.map(|t| match field(t, "n") {
			Value::Number(v) => v.to_int(),
			v => panic!("unexpected value: {v}"),
		})
		.collect();
	got.sort();
	assert_eq!(got, vec![1, 2, 10, 20]);
}

#[test_log::test(tokio::test)]
async fn invalid_buffer_capacity_is_rejected() {
	let exe = executor("capacity");
	apply_all(&exe, "CREATE SOURCE PAUSED x TYPE dummy;").await;
	for bad in ["0", "2147483648"] {
		let err = exe
			.execute_str(&format!(
				"CREATE STREAM y AS SELECT ISTREAM n \
				 FROM x [RANGE 1 TUPLES, BUFFER SIZE {bad}]"
			))
			.await
			.unwrap()
			.remove(0)
			.result
			.unwrap_err();
		assert!(matches!(err, Error::CapacityInvalid(_)), "unexpected error: {err}");
		assert!(!exe.topology().node_names().contains(&String::from("y")));
	}
}

#[test_log::test(tokio::test)]
async fn pause_resume_and_rewind() {
	let exe = executor("lifecycle");
	let (sink, rx) = CollectorSink::new();
	exe.topology().add_sink("out", sink).unwrap();
	apply_all(
		&exe,
		"CREATE SOURCE PAUSED x TYPE dummy WITH num = 2, interval_ms = 1;
		 CREATE STREAM y AS SELECT RSTREAM n FROM x [RANGE 1 TUPLES];
		 INSERT INTO out FROM y;",
	)
	.await;
	// Rewinding a paused source is legal and resets its position
	apply_all(&exe, "REWIND SOURCE x; RESUME SOURCE x;").await;
	assert_eq!(collect(&rx, 2).await.len(), 2);
	// The dummy source stops at end-of-stream, after which lifecycle
	// commands are rejected
	let source = exe.topology().source("x").unwrap();
	tokio::time::timeout(Duration::from_secs(5), async {
		while source.state() != NodeState::Stopped {
			tokio::time::sleep(Duration::from_millis(5)).await;
		}
	})
	.await
	.expect("the source never stopped");
	let err = exe.execute_str("PAUSE SOURCE x").await.unwrap().remove(0).result.unwrap_err();
	assert!(matches!(err, Error::InvalidLifecycle { .. }), "unexpected error: {err}");
}

#[test_log::test(tokio::test)]
async fn drop_statements_verify_the_node_kind() {
	let exe = executor("drops");
	apply_all(
		&exe,
		"CREATE SOURCE PAUSED x TYPE dummy;
		 CREATE SINK s TYPE null;
		 CREATE STREAM y AS SELECT ISTREAM n FROM x [RANGE 1 TUPLES];",
	)
	.await;
	let err = exe.execute_str("DROP SOURCE y").await.unwrap().remove(0).result.unwrap_err();
	assert!(matches!(err, Error::WrongKind { .. }), "unexpected error: {err}");
	apply_all(&exe, "DROP STREAM y; DROP SOURCE x; DROP SINK s;").await;
	assert!(exe.topology().node_names().is_empty());
	// Dropping a missing node reports the absence
	let err = exe.execute_str("DROP STREAM y").await.unwrap().remove(0).result.unwrap_err();
	assert!(matches!(err, Error::NotFound(_)), "unexpected error: {err}");
}

#[test_log::test(tokio::test)]
async fn update_source_parameters() {
	let exe = executor("updates");
	apply_all(&exe, "CREATE SOURCE PAUSED x TYPE dummy WITH num = 1;").await;
	apply_all(&exe, "UPDATE SOURCE x SET num = 3;").await;
	// The null sink carries no update capability
	apply_all(&exe, "CREATE SINK s TYPE null;").await;
	let err =
		exe.execute_str("UPDATE SINK s SET anything = 1").await.unwrap().remove(0).result.unwrap_err();
	assert!(matches!(err, Error::CapabilityMissing { .. }), "unexpected error: {err}");
}

#[test_log::test(tokio::test)]
async fn eval_statements() {
	let exe = executor("eval");
	let v = exe.execute_str("EVAL 1 + 2 * 3").await.unwrap().remove(0).result.unwrap();
	assert_eq!(v, Value::from(7i64));
	// Two evaluations of a foldable expression agree
	let w = exe.execute_str("EVAL 1 + 2 * 3").await.unwrap().remove(0).result.unwrap();
	assert_eq!(v, w);
	let v = exe
		.execute_str(r#"EVAL a + 1 ON {"a": 41}"#)
		.await
		.unwrap()
		.remove(0)
		.result
		.unwrap();
	assert_eq!(v, Value::from(42i64));
	let err = exe.execute_str("EVAL a + 1").await.unwrap().remove(0).result.unwrap_err();
	assert!(matches!(err, Error::NotFoldable(_)), "unexpected error: {err}");
}

#[test_log::test(tokio::test)]
async fn statement_errors_carry_their_variant() {
	let exe = executor("not_implemented");
	// A bare SELECT has no topology meaning
	let err = exe.execute_str("SELECT ISTREAM a").await.unwrap().remove(0).result.unwrap_err();
	assert!(matches!(err, Error::NotImplemented(_)), "unexpected error: {err}");
}

#[test_log::test(tokio::test)]
async fn diagnostic_scans_carry_stable_keys() {
	let exe = executor("diagnostics");
	apply_all(
		&exe,
		"CREATE SOURCE PAUSED x TYPE dummy;
		 CREATE STREAM y AS SELECT ISTREAM n FROM x [RANGE 1 TUPLES];",
	)
	.await;
	let keys =
		["node_name", "node_type", "state", "input_counts", "output_counts", "dropped_counts"];
	for record in exe.topology().node_statuses() {
		for key in keys {
			assert!(record.0.contains_key(key), "node status misses {key}");
		}
	}
	let edges = exe.topology().edge_statuses();
	assert_eq!(edges.len(), 1);
	for key in keys {
		assert!(edges[0].0.contains_key(key), "edge status misses {key}");
	}
}

#[test_log::test(tokio::test)]
async fn dstream_emits_rows_leaving_the_window() {
	let exe = executor("dstream");
	let (sink, rx) = CollectorSink::new();
	exe.topology().add_sink("out", sink).unwrap();
	apply_all(
		&exe,
		"CREATE SOURCE PAUSED x TYPE dummy WITH num = 3, interval_ms = 1;
		 CREATE STREAM y AS SELECT DSTREAM n FROM x [RANGE 1 TUPLES];
		 INSERT INTO out FROM y;
		 RESUME SOURCE x;",
	)
	.await;
	// Each arrival expels the previous window occupant
	let got: Vec<Value> = collect(&rx, 2).await.iter().map(|t| field(t, "n")).collect();
	assert_eq!(got, vec![Value::from(1i64), Value::from(2i64)]);
}

#[test_log::test(tokio::test)]
async fn the_node_statuses_source_scans_the_topology() {
	let exe = executor("status_scan");
	let (sink, rx) = CollectorSink::new();
	exe.topology().add_sink("out", sink).unwrap();
	apply_all(
		&exe,
		"CREATE SOURCE PAUSED x TYPE dummy;
		 CREATE SOURCE monitor TYPE node_statuses;
		 CREATE STREAM y AS SELECT RSTREAM * FROM monitor [RANGE 1 TUPLES];
		 INSERT INTO out FROM y;",
	)
	.await;
	// One scan covers every node, including the monitor itself
	let mut seen = std::collections::BTreeSet::new();
	while seen.len() < 3 {
		let t = tokio::time::timeout(Duration::from_secs(5), rx.recv())
			.await
			.expect("timed out waiting for a scan")
			.expect("the collector channel closed early");
		if let Value::Strand(name) = field(&t, "node_name") {
			seen.insert(name.to_raw());
		}
	}
	for name in ["x", "monitor", "y"] {
		assert!(seen.contains(name), "{name} never appeared in a scan");
	}
}

#[test_log::test(tokio::test)]
async fn topology_stop_drains_and_stops_everything() {
	let exe = executor("stop_all");
	let (sink, _rx) = CollectorSink::new();
	exe.topology().add_sink("out", sink).unwrap();
	apply_all(
		&exe,
		"CREATE SOURCE x TYPE dummy WITH num = 1000000, interval_ms = 1;
		 CREATE STREAM y AS SELECT RSTREAM n FROM x [RANGE 1 TUPLES];
		 INSERT INTO out FROM y;",
	)
	.await;
	exe.topology().stop().await;
	for name in exe.topology().node_names() {
		let node = exe.topology().node(&name).unwrap();
		assert_eq!(node.state(), NodeState::Stopped, "{name} did not stop");
	}
}
