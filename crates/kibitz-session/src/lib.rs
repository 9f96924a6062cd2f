//! Game session control and the input state behind the board view.
//!
//! A [`Session`] mediates between human input, the rules provider and the
//! engine. The remaining modules hold frontend-independent presentation
//! state: menus, click selection, board geometry and transient notices.

pub mod error;
pub mod geometry;
pub mod menu;
pub mod mode;
pub mod notice;
pub mod selection;
pub mod session;

pub use error::{Rejection, SessionError};
pub use geometry::{BoardGeometry, Orientation};
pub use menu::{Button, Menu, MenuOutcome, MenuScreen};
pub use mode::{GameMode, SideChoice};
pub use notice::{NOTICE_LIFETIME, Notice, NoticeBoard};
pub use selection::{Selection, SelectionEvent};
pub use session::{Session, SessionResult, SessionSettings};
