//! Input vocabulary shared by every widget engine.
//!
//! Hosts translate their native events into [`KeyCombo`] and
//! [`PointerEvent`]; the crossterm conversions are provided.

pub mod events;
pub mod keys;

pub use events::{PointerButton, PointerEvent, PointerKind};
pub use keys::{Key, KeyCombo, Modifiers};
