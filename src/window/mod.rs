//! Window collaborator: responsibility and boundaries
//!
//! A window backend owns geometry, title and the graphics context, and runs
//! an input loop that turns raw input into [`Event`](crate::events::Event)s
//! published into a distribution point. The distribution subsystem never
//! calls into a window; only handlers do, through the origin-window
//! reference carried by each event.

mod headless;
mod raw;

pub use headless::{HeadlessWindow, InputSender};
pub use raw::{RawInput, WM_DELETE_WINDOW};

use crate::error::Result;
use crate::events::WindowId;

/// Interface every window backend exposes to application code
pub trait Window: Send + Sync {
    fn id(&self) -> WindowId;

    fn position(&self) -> Result<(i32, i32)>;
    fn set_position(&self, position: (i32, i32)) -> Result<()>;

    fn dimensions(&self) -> Result<(u32, u32)>;
    fn set_dimensions(&self, dimensions: (u32, u32)) -> Result<()>;

    fn title(&self) -> Result<String>;
    fn set_title(&self, title: &str) -> Result<()>;

    /// Make the window's graphics context current
    fn bind(&self) -> Result<()>;
    fn unbind(&self) -> Result<()>;
    fn swap(&self) -> Result<()>;
}
