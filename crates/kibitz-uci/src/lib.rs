//! UCI client: drives an external chess engine process.

pub mod command;
pub mod engine;
pub mod error;
pub mod message;
pub mod provider;

pub use command::{Command, GoParams, PositionSpec};
pub use engine::{EngineConfig, UciEngine, default_engine_path};
pub use error::UciError;
pub use message::{BestMove, EngineMessage, Score, SearchInfo, parse_message};
pub use provider::EngineProvider;
