//! Item persistence

mod fs_sink;
mod traits;

pub use fs_sink::FileSink;
pub use traits::{Sink, SinkError, SinkResult};
