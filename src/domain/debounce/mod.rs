//! Message debouncing.
//!
//! Coalesces bursts of messages for the same session into a single combined
//! request, so an agent sees "Hello\nHow are you?" once instead of two
//! fragments a few hundred milliseconds apart.
//!
//! - [`MessageBuffer`] - per-session sliding-window buffer
//! - [`FlushHandler`] - callback receiving each flushed batch

mod buffer;
mod dispatch;

pub use buffer::{BufferConfig, MessageBuffer, DEFAULT_SEPARATOR, DEFAULT_WINDOW};
pub use dispatch::{flush_fn, DispatchError, FlushHandler, FnFlushHandler};
