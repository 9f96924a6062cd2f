//! The seam between a game session and whatever picks the AI's moves.

use crate::command::{GoParams, PositionSpec};
use crate::error::UciError;
use crate::message::BestMove;

/// Something that chooses moves for a position.
///
/// [`UciEngine`](crate::UciEngine) is the production implementation; tests
/// substitute scripted providers.
pub trait EngineProvider {
    /// Human-readable engine name.
    fn name(&self) -> &str;

    /// Tell the provider a new game starts; previous positions are unrelated.
    fn new_game(&mut self) -> Result<(), UciError>;

    /// Search `position` within `limits` and return the chosen move.
    ///
    /// Blocks until the engine answers. The returned move is unvalidated.
    fn best_move(&mut self, position: &PositionSpec, limits: &GoParams)
    -> Result<BestMove, UciError>;
}

impl<E: EngineProvider + ?Sized> EngineProvider for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn new_game(&mut self) -> Result<(), UciError> {
        (**self).new_game()
    }

    fn best_move(
        &mut self,
        position: &PositionSpec,
        limits: &GoParams,
    ) -> Result<BestMove, UciError> {
        (**self).best_move(position, limits)
    }
}
