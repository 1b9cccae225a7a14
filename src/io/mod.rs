// Purpose - external interfaces: sample input, visualisation taps, WAV files

pub mod source;
pub mod tap;
pub mod wav;

pub use source::{LoopingBuffer, SampleSource};
pub use tap::{tap, TapReader, TapWriter};
