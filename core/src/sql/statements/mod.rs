pub mod control;
pub mod create_sink;
pub mod create_source;
pub mod create_state;
pub mod create_stream;
pub mod drop;
pub mod eval;
pub mod insert;
pub mod load_state;
pub mod save_state;
pub mod select;
pub mod update;

#[cfg(test)]
mod tests;

pub use self::control::{PauseSourceStatement, ResumeSourceStatement, RewindSourceStatement};
pub use self::create_sink::CreateSinkStatement;
pub use self::create_source::CreateSourceStatement;
pub use self::create_state::CreateStateStatement;
pub use self::create_stream::CreateStreamStatement;
pub use self::drop::{DropStatement, DropTarget};
pub use self::eval::EvalStatement;
pub use self::insert::InsertStatement;
pub use self::load_state::{CreateFallback, CreateTrigger, LoadStateStatement};
pub use self::save_state::SaveStateStatement;
pub use self::select::{SelectStatement, SelectUnionStatement};
pub use self::update::{UpdateStatement, UpdateTarget};
