//! Click selection: turns presses and releases on squares into move attempts.

use kibitz_core::Square;

/// What a press or release did to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    /// A piece was selected (or re-selected) as a move origin.
    Selected(Square),
    /// The selection was dropped without a move.
    Cleared,
    /// The user asked to move the selected piece. The selection is cleared.
    Attempt {
        /// The selected origin.
        from: Square,
        /// The clicked destination.
        to: Square,
    },
    /// Nothing changed.
    Ignored,
}

/// At most one selected origin square, pending a destination.
///
/// Supports both click-click and press-drag-release input: a release on a
/// different square directly after selecting completes the move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<Square>,
    dragging: bool,
}

impl Selection {
    pub fn new() -> Selection {
        Selection::default()
    }

    /// The currently selected square.
    #[inline]
    pub fn selected(&self) -> Option<Square> {
        self.selected
    }

    /// Handle a press on `square`.
    ///
    /// `own_piece` is `true` when the square holds a piece the user may
    /// move right now (their color, their turn).
    pub fn press(&mut self, square: Square, own_piece: bool) -> SelectionEvent {
        match self.selected {
            None if own_piece => self.select(square),
            None => SelectionEvent::Ignored,
            Some(selected) if selected == square => {
                self.clear();
                SelectionEvent::Cleared
            }
            Some(_) if own_piece => self.select(square),
            Some(from) => {
                self.clear();
                SelectionEvent::Attempt { from, to: square }
            }
        }
    }

    /// Handle a release on `square`.
    pub fn release(&mut self, square: Square) -> SelectionEvent {
        let was_dragging = std::mem::take(&mut self.dragging);
        match self.selected {
            Some(from) if was_dragging && from != square => {
                self.clear();
                SelectionEvent::Attempt { from, to: square }
            }
            _ => SelectionEvent::Ignored,
        }
    }

    /// Drop the selection.
    pub fn clear(&mut self) {
        self.selected = None;
        self.dragging = false;
    }

    fn select(&mut self, square: Square) -> SelectionEvent {
        self.selected = Some(square);
        self.dragging = true;
        SelectionEvent::Selected(square)
    }
}
