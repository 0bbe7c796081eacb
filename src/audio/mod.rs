pub mod playback;

pub use playback::{AudioSink, CpalSink, NullSink};
