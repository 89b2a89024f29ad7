//! VE.Direct Decode Engine
//!
//! Streaming engine that turns raw serial bytes from a VE.Direct device into
//! discrete (output path, value) samples. The pipeline:
//!
//! 1. [`FrameAssembler`] classifies the byte stream into text lines and
//!    checksum-valid HEX frames, resynchronizing across corrupt frames
//! 2. a lock-free SPSC queue hands assembled units from the reading thread
//!    to the decoding thread with bounded buffering and no backpressure
//! 3. [`Decoder`] resolves each unit against the register and parameter
//!    catalogs, scales the value, and fires the `on_data`/`on_change` hooks
//!
//! [`Engine::start`] wires the three together over any `Read` source;
//! [`replay_log`] feeds captured text logs through the same decode path for
//! offline fixtures.

mod assembler;
mod cache;
mod decoder;
mod engine;
mod queue;

pub use assembler::*;
pub use cache::*;
pub use decoder::*;
pub use engine::*;
pub use queue::*;
