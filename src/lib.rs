//! Auto-advancing media carousel for a project showcase.
//!
//! A [`Showreel`] plays the current item's media while its element is on
//! screen and the page is in the foreground, waits out a short debounce
//! after each clip ends and then rotates to the next item. The rendering
//! host is injected through the traits in [`host`].

pub mod carousel;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod fade;
pub mod host;
pub mod indicator;
pub mod item;
pub mod playback;
pub mod scheduler;
pub mod simulate;
pub mod state;
pub mod visibility;

#[cfg(feature = "window")]
pub mod window;

pub use config::ShowreelConfig;
pub use engine::{Advance, Showreel};
pub use error::{HostError, ShowreelError};
pub use item::RotationItem;
