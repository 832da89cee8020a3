//! Row-based engines and the pieces they share.
//!
//! [`grid::Grid`], [`list::List`] and [`tree::Tree`] each pair a store with
//! a [`scroll::ScrollController`] and a [`selection::Selection`]. Hosts feed
//! them input through [`events::WidgetEvents`] and paint the frames
//! produced by [`render::Renderable`].

pub mod events;
pub mod grid;
pub mod list;
pub mod render;
pub mod scroll;
pub mod selection;
pub mod traits;
pub mod tree;

pub use events::EventResult;
pub use events::WidgetEvents;
pub use grid::Grid;
pub use list::List;
pub use render::Renderable;
pub use scroll::ScrollController;
pub use selection::Selection;
pub use tree::Tree;
