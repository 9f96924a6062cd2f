//! Mapping between screen cells and board squares.

use kibitz_core::{Color, File, Rank, Square};

/// Which side is drawn at the bottom of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Rank 1 at the bottom, a-file on the left.
    #[default]
    WhiteBottom,
    /// Rank 8 at the bottom, h-file on the left.
    BlackBottom,
}

impl Orientation {
    /// Orientation for someone playing `side`.
    #[inline]
    pub const fn for_side(side: Color) -> Orientation {
        match side {
            Color::White => Orientation::WhiteBottom,
            Color::Black => Orientation::BlackBottom,
        }
    }
}

/// Placement of the board on screen.
///
/// Coordinates are in whatever unit the frontend uses (terminal cells,
/// pixels); each square is `cell_width` x `cell_height` of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardGeometry {
    pub origin_x: u16,
    pub origin_y: u16,
    pub cell_width: u16,
    pub cell_height: u16,
    pub orientation: Orientation,
}

impl BoardGeometry {
    /// Board at `(origin_x, origin_y)` with the given square size.
    pub const fn new(
        origin_x: u16,
        origin_y: u16,
        cell_width: u16,
        cell_height: u16,
        orientation: Orientation,
    ) -> BoardGeometry {
        BoardGeometry {
            origin_x,
            origin_y,
            cell_width,
            cell_height,
            orientation,
        }
    }

    /// Total board width.
    #[inline]
    pub const fn width(&self) -> u16 {
        self.cell_width * 8
    }

    /// Total board height.
    #[inline]
    pub const fn height(&self) -> u16 {
        self.cell_height * 8
    }

    /// The square under screen position `(x, y)`, if it is on the board.
    pub fn square_at(&self, x: u16, y: u16) -> Option<Square> {
        if x < self.origin_x || y < self.origin_y || self.cell_width == 0 || self.cell_height == 0 {
            return None;
        }
        let col = (x - self.origin_x) / self.cell_width;
        let row = (y - self.origin_y) / self.cell_height;
        if col >= 8 || row >= 8 {
            return None;
        }
        Some(self.square_at_cell(row, col))
    }

    /// The square drawn at display `row` (0 = top) and `col` (0 = left).
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is 8 or more.
    pub fn square_at_cell(&self, row: u16, col: u16) -> Square {
        let (file, rank) = match self.orientation {
            Orientation::WhiteBottom => (col, 7 - row),
            Orientation::BlackBottom => (7 - col, row),
        };
        Square::from_coords(File::new(u32::from(file)), Rank::new(u32::from(rank)))
    }

    /// Display `(row, col)` of `square`; the inverse of [`square_at_cell`](Self::square_at_cell).
    pub fn cell_of(&self, square: Square) -> (u16, u16) {
        let file = u32::from(square.file()) as u16;
        let rank = u32::from(square.rank()) as u16;
        match self.orientation {
            Orientation::WhiteBottom => (7 - rank, file),
            Orientation::BlackBottom => (rank, 7 - file),
        }
    }

    /// Top-left screen position of `square`.
    pub fn origin_of(&self, square: Square) -> (u16, u16) {
        let (row, col) = self.cell_of(square);
        (
            self.origin_x + col * self.cell_width,
            self.origin_y + row * self.cell_height,
        )
    }
}
