//! Streaming runtime: the single-buffered push stream and the tier-paced
//! tick loop that feeds it.

pub mod stream;
pub mod ticker;

pub use stream::{StreamEnd, StreamSink, WatchStream};
pub use ticker::{cadence, run_ticks};
