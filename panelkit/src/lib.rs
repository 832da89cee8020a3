//! Data-dense admin widgets
//!
//! Grid, list and tree engines over the stores of [`panelkit_data`], with
//! momentum scrolling, column layout, focus and selection. The engines are
//! headless: they consume pointer and key input and produce frames for a
//! host to paint.

pub mod input;
pub mod registry;
pub mod widgets;

pub use panelkit_data as data;

pub mod prelude {
    pub use crate::input::{Key, KeyCombo, Modifiers, PointerButton, PointerEvent, PointerKind};
    pub use crate::registry::{Component, ComponentKind, ComponentRegistry, Handle};
    pub use crate::widgets::events::{EventResult, WidgetEvents};
    pub use crate::widgets::grid::{ColumnConfig, Grid, GridConfig, GridEvent, GridEventKind};
    pub use crate::widgets::list::{List, ListConfig, ListEvent, ListEventKind};
    pub use crate::widgets::render::{Renderable, render_if_dirty};
    pub use crate::widgets::scroll::{Axis, Point, ScrollConfig, ScrollController, Size, WheelMode};
    pub use crate::widgets::selection::{SelectionConfig, SelectionDisplay};
    pub use crate::widgets::traits::{Focusable, Scrollable, Selectable};
    pub use crate::widgets::tree::{Tree, TreeConfig, TreeEvent, TreeEventKind};

    pub use panelkit_data::{DataStore, TreeDataStore};
}
