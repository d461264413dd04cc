use crate::sql::statements::*;
use crate::sql::*;

fn ident(v: &str) -> Ident {
	Ident::from(v)
}

fn column(v: &str) -> Value {
	Value::from(Idiom::new(None, vec![Part::Field(ident(v))]))
}

#[test]
fn create_source_renders_pause_modes() {
	let mut stm = CreateSourceStatement {
		paused: None,
		name: ident("x"),
		kind: ident("dummy"),
		params: Assignments(vec![(ident("num"), Value::from(10i64))]),
	};
	assert_eq!(stm.to_string(), "CREATE SOURCE x TYPE dummy WITH num = 10");
	stm.paused = Some(true);
	assert_eq!(stm.to_string(), "CREATE SOURCE PAUSED x TYPE dummy WITH num = 10");
	stm.paused = Some(false);
	assert_eq!(stm.to_string(), "CREATE SOURCE UNPAUSED x TYPE dummy WITH num = 10");
}

#[test]
fn select_renders_all_clauses() {
	let stm = SelectStatement {
		emitter: Emitter {
			kind: EmitterKind::IStream,
			limit: Some(3),
			sampling: Some(Sampling::Count(2)),
		},
		fields: Fields(vec![Field::Single {
			expr: Value::from(Function {
				name: ident("count"),
				args: vec![],
				star: true,
			}),
			alias: Some(ident("c")),
		}]),
		from: vec![Relation {
			source: RelationSource::Stream(ident("x")),
			window: Window::Tuples(2),
			capacity: Some(8),
			policy: Some(DropHint::DropOldest),
			alias: Some(ident("a")),
		}],
		cond: Some(Cond(column("ok"))),
		group: Some(Groups(vec![column("k")])),
		having: Some(Having(column("keep"))),
	};
	assert_eq!(
		stm.to_string(),
		"SELECT ISTREAM LIMIT 3 EVERY 2ND TUPLE count(*) AS c \
		 FROM x [RANGE 2 TUPLES, BUFFER SIZE 8, DROP OLDEST IF FULL] AS a \
		 WHERE ok GROUP BY k HAVING keep",
	);
}

#[test]
fn union_statements_join_with_union_all() {
	let select = SelectStatement {
		emitter: Emitter::default(),
		fields: Fields(vec![Field::All]),
		from: vec![],
		cond: None,
		group: None,
		having: None,
	};
	let stm = CreateStreamStatement {
		name: ident("z"),
		selects: vec![select.clone(), select],
	};
	assert_eq!(
		stm.to_string(),
		"CREATE STREAM z AS SELECT ISTREAM * UNION ALL SELECT ISTREAM *",
	);
}

#[test]
fn state_statements_render() {
	let stm = SaveStateStatement {
		name: ident("st"),
		tag: Some(ident("v1")),
	};
	assert_eq!(stm.to_string(), "SAVE STATE st TAG v1");
	let stm = LoadStateStatement {
		name: ident("st"),
		kind: ident("value"),
		tag: None,
		params: Assignments::default(),
		create: Some(CreateFallback {
			trigger: CreateTrigger::NotSaved,
			params: Assignments(vec![(ident("value"), Value::from(0i64))]),
		}),
	};
	assert_eq!(
		stm.to_string(),
		"LOAD STATE st TYPE value OR CREATE IF NOT SAVED WITH value = 0",
	);
}

#[test]
fn control_statements_render() {
	assert_eq!(
		PauseSourceStatement {
			name: ident("x")
		}
		.to_string(),
		"PAUSE SOURCE x",
	);
	assert_eq!(
		DropStatement {
			target: DropTarget::Stream,
			name: ident("y"),
		}
		.to_string(),
		"DROP STREAM y",
	);
	assert_eq!(
		InsertStatement {
			sink: ident("snk"),
			from: ident("y"),
		}
		.to_string(),
		"INSERT INTO snk FROM y",
	);
	assert_eq!(
		UpdateStatement {
			target: UpdateTarget::Source,
			name: ident("x"),
			params: Assignments(vec![(ident("num"), Value::from(5i64))]),
		}
		.to_string(),
		"UPDATE SOURCE x SET num = 5",
	);
}
