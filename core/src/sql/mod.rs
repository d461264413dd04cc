//! The BQL abstract syntax tree and the value model shared between
//! parsed statements and running tuples.

pub(crate) mod fmt;

mod array;
mod assignment;
mod bytes;
mod case;
mod cast;
mod cond;
mod datetime;
mod emit;
mod escape;
mod expression;
mod field;
mod function;
mod group;
mod having;
mod ident;
mod idiom;
mod kind;
mod number;
mod object;
mod operator;
mod part;
mod query;
mod relation;
mod statement;
mod strand;
mod value;
mod window;

pub mod statements;

pub use self::array::Array;
pub use self::assignment::Assignments;
pub use self::bytes::Bytes;
pub use self::case::Case;
pub use self::cast::Cast;
pub use self::cond::Cond;
pub use self::datetime::Datetime;
pub use self::emit::{Emitter, EmitterKind, SampleUnit, Sampling};
pub use self::escape::{is_plain_ident, quote_str};
pub use self::expression::Expression;
pub use self::field::{Field, Fields};
pub use self::function::Function;
pub use self::group::Groups;
pub use self::having::Having;
pub use self::ident::Ident;
pub use self::idiom::Idiom;
pub use self::kind::Kind;
pub use self::number::Number;
pub use self::object::Object;
pub use self::operator::Operator;
pub use self::part::Part;
pub use self::query::Query;
pub use self::relation::{DropHint, Relation, RelationSource};
pub use self::statement::{Statement, Statements};
pub use self::strand::Strand;
pub use self::value::Value;
pub use self::window::Window;
