//! Runtime behaviour exercised through the public topology API: wiring
//! rules, panic recovery, and user-defined stream functions.

use async_trait::async_trait;
use rivulet_core::ctx::Context;
use rivulet_core::dbs::builtin::{CollectorSink, DummySource};
use rivulet_core::dbs::{
	Executor, NodeState, Outputs, PipeConfig, Processor, Source, SourceConfig, SourceWriter,
	Topology, Tuple,
};
use rivulet_core::err::Error;
use rivulet_core::registry::{Registry, Udsf, UdsfCreator};
use rivulet_core::sql::{Datetime, Object, Value};
use std::sync::Arc;
use std::time::Duration;

/// A box which forwards its input unchanged
struct PassThrough;

#[async_trait]
impl Processor for PassThrough {
	async fn process(&self, _: &Context, t: Tuple, w: &Outputs) -> Result<(), Error> {
		w.write(t).await
	}
}

/// A box which panics on every tuple
struct Exploding;

#[async_trait]
impl Processor for Exploding {
	async fn process(&self, _: &Context, _: Tuple, _: &Outputs) -> Result<(), Error> {
		panic!("boom");
	}
}

async fn wait_for_state(topology: &Topology, name: &str, state: NodeState) {
	tokio::time::timeout(Duration::from_secs(5), async {
		loop {
			match topology.node(name) {
				Ok(n) if n.state() == state => break,
				_ => tokio::time::sleep(Duration::from_millis(5)).await,
			}
		}
	})
	.await
	.unwrap_or_else(|_| panic!("{name} never reached {state}"));
}

async fn wait_for_removal(topology: &Topology, name: &str) {
	tokio::time::timeout(Duration::from_secs(5), async {
		while topology.node(name).is_ok() {
			tokio::time::sleep(Duration::from_millis(5)).await;
		}
	})
	.await
	.unwrap_or_else(|_| panic!("{name} was never removed"));
}

#[test_log::test(tokio::test)]
async fn connect_rejects_bad_wiring() {
	let topology = Topology::new("wiring");
	topology.add_source("src", Arc::new(DummySource::new(0, 0)), SourceConfig::default()).unwrap();
	topology.add_box("a", Arc::new(PassThrough)).unwrap();
	topology.add_box("b", Arc::new(PassThrough)).unwrap();
	let (sink, _rx) = CollectorSink::new();
	topology.add_sink("out", sink).unwrap();

	// Direction rules
	let err = topology.connect("out", "a", "out", PipeConfig::default()).unwrap_err();
	assert!(matches!(err, Error::WrongDirection { .. }), "unexpected error: {err}");
	let err = topology.connect("a", "src", "a", PipeConfig::default()).unwrap_err();
	assert!(matches!(err, Error::WrongDirection { .. }), "unexpected error: {err}");

	// Labels are unique per consumer
	topology.connect("src", "a", "src", PipeConfig::default()).unwrap();
	let err = topology.connect("src", "a", "src", PipeConfig::default()).unwrap_err();
	assert!(matches!(err, Error::DuplicateInput { .. }), "unexpected error: {err}");

	// Cycles are rejected at connect time
	topology.connect("a", "b", "a", PipeConfig::default()).unwrap();
	let err = topology.connect("b", "a", "back", PipeConfig::default()).unwrap_err();
	assert!(matches!(err, Error::CyclicConnection { .. }), "unexpected error: {err}");

	// Unknown names are reported
	let err = topology.connect("missing", "a", "missing", PipeConfig::default()).unwrap_err();
	assert!(matches!(err, Error::NotFound(_)), "unexpected error: {err}");
}

#[test_log::test(tokio::test)]
async fn duplicate_and_invalid_names_are_rejected() {
	let topology = Topology::new("names");
	topology.add_box("a", Arc::new(PassThrough)).unwrap();
	let err = topology.add_box("a", Arc::new(PassThrough)).unwrap_err();
	assert!(matches!(err, Error::NameInUse(_)), "unexpected error: {err}");
	let err = topology.add_box("1bad", Arc::new(PassThrough)).unwrap_err();
	assert!(matches!(err, Error::InvalidName(_)), "unexpected error: {err}");
}

#[test_log::test(tokio::test)]
async fn a_panicking_box_stops_instead_of_crashing() {
	let topology = Topology::new("panics");
	topology
		.add_source("src", Arc::new(DummySource::new(3, 1)), SourceConfig::default())
		.unwrap();
	topology.add_box("bomb", Arc::new(Exploding)).unwrap();
	topology.connect("src", "bomb", "src", PipeConfig::default()).unwrap();
	wait_for_state(&topology, "bomb", NodeState::Stopped).await;
}

/// A source-mode UDSF: emits the numbers its argument asks for
struct SequenceUdsf;

struct SequenceSource {
	n: i64,
}

#[async_trait]
impl Source for SequenceSource {
	async fn generate_stream(&self, _: &Context, w: &SourceWriter) -> Result<(), Error> {
		for n in 1..=self.n {
			// Leave the builder time to finish wiring the consumers
			tokio::time::sleep(Duration::from_millis(20)).await;
			let data: Object =
				[(String::from("n"), Value::from(n))].into_iter().collect();
			w.write(Tuple::at(data, Datetime::now())).await?;
		}
		Ok(())
	}
}

#[async_trait]
impl UdsfCreator for SequenceUdsf {
	async fn create(&self, _: &Context, args: Vec<Value>) -> Result<Udsf, Error> {
		let n = match args.first() {
			Some(Value::Number(v)) => v.to_int(),
			_ => {
				return Err(Error::InvalidArguments {
					name: String::from("seq"),
					message: String::from("expected a tuple count"),
				})
			}
		};
		Ok(Udsf::Source(Arc::new(SequenceSource {
			n,
		})))
	}
}

#[test_log::test(tokio::test)]
async fn a_source_mode_udsf_is_a_temporary_node() {
	let mut registry = Registry::base();
	registry.register_udsf("seq", Arc::new(SequenceUdsf));
	let exe = Executor::new(Topology::new("udsf")).with_registry(registry);
	let (sink, rx) = CollectorSink::new();
	exe.topology().add_sink("out", sink).unwrap();
	for r in exe
		.execute_str(
			"CREATE STREAM y AS SELECT RSTREAM n FROM seq(3) [RANGE 1 TUPLES];
			 INSERT INTO out FROM y;",
		)
		.await
		.unwrap()
	{
		r.result.unwrap();
	}
	// A temporary source node exists while the stream runs
	let temp: Vec<String> = exe
		.topology()
		.node_names()
		.into_iter()
		.filter(|n| n.starts_with("rivulet_tmp_"))
		.collect();
	assert_eq!(temp.len(), 1);
	for want in 1..=3i64 {
		let t = tokio::time::timeout(Duration::from_secs(5), rx.recv())
			.await
			.expect("timed out")
			.expect("channel closed");
		assert_eq!(t.data.0.get("n"), Some(&Value::from(want)));
	}
	// Dropping the consumer disconnects the temporary, which stops and
	// removes itself
	exe.execute_str("DROP STREAM y").await.unwrap().remove(0).result.unwrap();
	wait_for_removal(exe.topology(), &temp[0]).await;
}

#[test_log::test(tokio::test)]
async fn registry_snapshots_ignore_later_registrations() {
	let registry = Registry::base();
	let exe = Executor::new(Topology::new("snapshot")).with_registry(registry.clone());
	// A registration after builder construction is invisible to it
	let mut late = registry;
	late.register_udsf("seq", Arc::new(SequenceUdsf));
	let err = exe
		.execute_str("CREATE STREAM y AS SELECT RSTREAM n FROM seq(3) [RANGE 1 TUPLES]")
		.await
		.unwrap()
		.remove(0)
		.result
		.unwrap_err();
	assert!(matches!(err, Error::UnknownFunction(_)), "unexpected error: {err}");
}

#[test_log::test(tokio::test)]
#[serial_test::serial]
async fn the_global_registry_feeds_new_builders() {
	rivulet_core::registry::register_udsf("global_seq", Arc::new(SequenceUdsf));
	// A builder created afterwards sees the registration
	let exe = Executor::new(Topology::new("global_registry"));
	exe.execute_str("CREATE STREAM y AS SELECT RSTREAM n FROM global_seq(1) [RANGE 1 TUPLES]")
		.await
		.unwrap()
		.remove(0)
		.result
		.unwrap();
}

#[test_log::test(tokio::test)]
async fn removing_a_node_is_idempotent() {
	let topology = Topology::new("removal");
	topology.add_box("a", Arc::new(PassThrough)).unwrap();
	topology.remove("a").await.unwrap();
	assert!(topology.node("a").is_err());
	topology.remove("a").await.unwrap();
}
