//! imgnotate - item page for an image annotation tool
//!
//! Shows one image of a folder, lets the user select and delete line, box and
//! polygon annotations, manages time-range actions and switches the canvas
//! tool from hotkeys. Rendering is left to observers of the page's events.

pub mod config;
pub mod events;
pub mod keybindings;
pub mod model;
pub mod page;
pub mod state;

pub use events::{EventBus, PageEvent, SubscriptionId};
pub use page::{ItemPage, NavParams, Platform, Session};
