pub mod context;
pub mod request_state;
pub mod translate;

pub use context::ParserContext;
pub use request_state::RequestState;
pub use translate::{BattleEvent, EventKind, translate};
