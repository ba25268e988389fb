//! Rendering sinks and the helpers they share.

pub mod fanout;
pub mod format;
pub mod recorder;
pub mod scale;
pub mod terminal;

pub use fanout::FanoutSink;
pub use recorder::RecordingSink;
pub use terminal::TerminalSink;
