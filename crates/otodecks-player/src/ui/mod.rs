//! UI module for the Otodecks player
//!
//! Built with iced. The app owns the shared engine handle and one `DeckGui`
//! per deck, and locks the engine briefly for each message it applies.

pub mod app;
pub mod deck_gui;
pub mod drop;
pub mod message;

pub use app::OtodecksApp;
pub use message::Message;
