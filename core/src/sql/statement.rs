use crate::sql::fmt::Fmt;
use crate::sql::statements::{
	CreateSinkStatement, CreateSourceStatement, CreateStateStatement, CreateStreamStatement,
	DropStatement, EvalStatement, InsertStatement, LoadStateStatement, PauseSourceStatement,
	ResumeSourceStatement, RewindSourceStatement, SaveStateStatement, SelectStatement,
	SelectUnionStatement, UpdateStatement,
};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::ops::Deref;

/// A sequence of parsed statements
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Statements(pub Vec<Statement>);

impl Deref for Statements {
	type Target = Vec<Statement>;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl IntoIterator for Statements {
	type Item = Statement;
	type IntoIter = std::vec::IntoIter<Self::Item>;
	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

impl Display for Statements {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		Display::fmt(
			&Fmt::one_line_separated(self.0.iter().map(|v| Fmt::new(v, |v, f| write!(f, "{v};")))),
			f,
		)
	}
}

/// A single parsed statement
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Statement {
	Select(SelectStatement),
	SelectUnion(SelectUnionStatement),
	CreateSource(CreateSourceStatement),
	CreateSink(CreateSinkStatement),
	CreateState(CreateStateStatement),
	CreateStream(CreateStreamStatement),
	Update(UpdateStatement),
	Drop(DropStatement),
	Insert(InsertStatement),
	PauseSource(PauseSourceStatement),
	ResumeSource(ResumeSourceStatement),
	RewindSource(RewindSourceStatement),
	SaveState(SaveStateStatement),
	LoadState(LoadStateStatement),
	Eval(EvalStatement),
}

impl Statement {
	/// The keyword form of this statement's variant, for diagnostics
	pub fn variant_name(&self) -> &'static str {
		match self {
			Self::Select(_) => "SELECT",
			Self::SelectUnion(_) => "SELECT UNION",
			Self::CreateSource(_) => "CREATE SOURCE",
			Self::CreateSink(_) => "CREATE SINK",
			Self::CreateState(_) => "CREATE STATE",
			Self::CreateStream(_) => "CREATE STREAM",
			Self::Update(_) => "UPDATE",
			Self::Drop(_) => "DROP",
			Self::Insert(_) => "INSERT INTO",
			Self::PauseSource(_) => "PAUSE SOURCE",
			Self::ResumeSource(_) => "RESUME SOURCE",
			Self::RewindSource(_) => "REWIND SOURCE",
			Self::SaveState(_) => "SAVE STATE",
			Self::LoadState(_) => "LOAD STATE",
			Self::Eval(_) => "EVAL",
		}
	}
}

impl Display for Statement {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match self {
			Self::Select(v) => Display::fmt(v, f),
			Self::SelectUnion(v) => Display::fmt(v, f),
			Self::CreateSource(v) => Display::fmt(v, f),
			Self::CreateSink(v) => Display::fmt(v, f),
			Self::CreateState(v) => Display::fmt(v, f),
			Self::CreateStream(v) => Display::fmt(v, f),
			Self::Update(v) => Display::fmt(v, f),
			Self::Drop(v) => Display::fmt(v, f),
			Self::Insert(v) => Display::fmt(v, f),
			Self::PauseSource(v) => Display::fmt(v, f),
			Self::ResumeSource(v) => Display::fmt(v, f),
			Self::RewindSource(v) => Display::fmt(v, f),
			Self::SaveState(v) => Display::fmt(v, f),
			Self::LoadState(v) => Display::fmt(v, f),
			Self::Eval(v) => Display::fmt(v, f),
		}
	}
}
