//! Client UI for the user table.
//!
//! The view is modelled as an immutable [`UiState`] that is replaced on
//! every [`Event`], a pure [`render`] function, and a [`Session`] that turns
//! user actions into API calls and events. The browser page under
//! `public/` follows the same model.

mod render;
mod session;
mod state;

pub use render::render;
pub use session::Session;
pub use state::{Event, FormFields, FormMode, Phase, Status, UiState, PAGE_SIZE};
