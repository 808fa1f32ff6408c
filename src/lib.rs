pub mod buffer;
pub mod config;
pub mod editor;
pub mod event;
pub mod logger;
pub mod shared;

pub use buffer::{Axis, BufferError, TextBuffer};
pub use shared::SharedBuffer;
