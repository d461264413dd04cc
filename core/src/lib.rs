#[macro_use]
extern crate tracing;

#[macro_use]
mod mac;

mod fnc;

pub mod sql;

#[doc(hidden)]
pub mod cnf;
#[doc(hidden)]
pub mod ctx;
#[doc(hidden)]
pub mod dbs;
#[doc(hidden)]
pub mod err;
#[doc(hidden)]
pub mod syn;

pub use self::fnc::registry;

#[doc(hidden)]
/// Channels for receiving tuples emitted by a running topology
pub mod channel {
	pub use channel::bounded;
	pub use channel::unbounded;
	pub use channel::Receiver;
	pub use channel::Sender;
}
