use thiserror::Error;

pub mod ident;
pub mod line;
pub mod request;
pub mod wire;

pub use ident::{HpStatus, Position, SideAxis};
pub use line::{KwArgs, ProtocolLine, tokenize};
pub use request::{ActiveSlot, BattleRequest, MoveSlot, SideInfo, SidePokemon};
pub use wire::{EngineCommand, PlayerSpec};


#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid message format: {0}")]
    InvalidFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}
