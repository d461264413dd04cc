//! Shared-state statements: CREATE, UPDATE, SAVE and LOAD, with the
//! OR CREATE fallback.

use rivulet_core::dbs::{Executor, Topology, ValueState};
use rivulet_core::err::Error;
use rivulet_core::registry::Registry;
use rivulet_core::sql::Value;

fn executor(name: &str) -> Executor {
	Executor::new(Topology::new(name)).with_registry(Registry::base())
}

async fn apply_all(exe: &Executor, script: &str) {
	for r in exe.execute_str(script).await.unwrap() {
		r.result.unwrap();
	}
}

fn value_of(exe: &Executor, name: &str) -> Value {
	let state = exe.topology().context().states().get(name).unwrap();
	state.as_any().downcast_ref::<ValueState>().expect("not a value state").value()
}

#[test_log::test(tokio::test)]
async fn create_update_and_drop() {
	let exe = executor("states");
	apply_all(&exe, "CREATE STATE st TYPE value WITH value = 7;").await;
	assert_eq!(value_of(&exe, "st"), Value::from(7i64));
	apply_all(&exe, "UPDATE STATE st SET value = 9;").await;
	assert_eq!(value_of(&exe, "st"), Value::from(9i64));
	// The name is taken
	let err = exe
		.execute_str("CREATE STATE st TYPE value")
		.await
		.unwrap()
		.remove(0)
		.result
		.unwrap_err();
	assert!(matches!(err, Error::NameInUse(_)), "unexpected error: {err}");
	apply_all(&exe, "DROP STATE st;").await;
	assert!(exe.topology().context().states().get("st").is_err());
}

#[test_log::test(tokio::test)]
async fn save_then_load_restores_the_value() {
	let exe = executor("save_load");
	apply_all(
		&exe,
		"CREATE STATE st TYPE value WITH value = 9;
		 SAVE STATE st TAG v1;
		 UPDATE STATE st SET value = 100;",
	)
	.await;
	assert_eq!(value_of(&exe, "st"), Value::from(100i64));
	// Loading replaces the instance with the snapshot contents
	apply_all(&exe, "LOAD STATE st TYPE value TAG v1;").await;
	assert_eq!(value_of(&exe, "st"), Value::from(9i64));
}

#[test_log::test(tokio::test)]
async fn load_without_snapshot_reports_not_found() {
	let exe = executor("load_missing");
	let err = exe
		.execute_str("LOAD STATE st TYPE value TAG nope")
		.await
		.unwrap()
		.remove(0)
		.result
		.unwrap_err();
	assert!(matches!(err, Error::SnapshotNotFound { .. }), "unexpected error: {err}");
}

#[test_log::test(tokio::test)]
async fn load_or_create_falls_back_to_defaults() {
	let exe = executor("load_or_create");
	apply_all(
		&exe,
		"LOAD STATE st TYPE value OR CREATE IF NOT SAVED WITH value = 42;",
	)
	.await;
	assert_eq!(value_of(&exe, "st"), Value::from(42i64));
	// The round trip: save, mutate, load restores the saved value
	apply_all(
		&exe,
		"SAVE STATE st;
		 UPDATE STATE st SET value = 0;
		 LOAD STATE st TYPE value;",
	)
	.await;
	assert_eq!(value_of(&exe, "st"), Value::from(42i64));
}

#[test_log::test(tokio::test)]
async fn load_keeps_the_type_tag_stable() {
	let exe = executor("load_type");
	apply_all(&exe, "CREATE STATE st TYPE value WITH value = 1;").await;
	let err = exe
		.execute_str("LOAD STATE st TYPE other OR CREATE IF NOT SAVED")
		.await
		.unwrap()
		.remove(0)
		.result
		.unwrap_err();
	// A registered state under a different type is an error, never a
	// "not found"
	assert!(matches!(err, Error::TypeMismatch { .. }), "unexpected error: {err}");
}

#[test_log::test(tokio::test)]
async fn save_requires_the_capability() {
	let exe = executor("save_capability");
	let err = exe
		.execute_str("SAVE STATE missing")
		.await
		.unwrap()
		.remove(0)
		.result
		.unwrap_err();
	assert!(matches!(err, Error::NotFound(_)), "unexpected error: {err}");
}
