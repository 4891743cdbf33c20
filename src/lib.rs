//! basilisk: desktop input/window toolkit built around an in-process event spool.
//!
//! Input backends publish [`Event`]s into a [`Spool`], which fans them out to
//! every subscribed [`Publisher`] on a bounded worker pool. A [`Topic`] gives
//! filtered, synchronous fan-out and can itself be subscribed to the spool.

pub mod bus;
pub mod config;
pub mod error;
pub mod events;
pub mod mappings;
pub mod services;
pub mod utils;
pub mod window;

pub use bus::{handler_fn, PublishSubscriber, Publisher, Spool, SpoolConfig, Subscriber, Topic};
pub use error::{BasiliskError, Result};
pub use events::{Event, KeyCode, KeyEvent, KeyState, Modifiers, WindowRef};
pub use window::{HeadlessWindow, Window};
