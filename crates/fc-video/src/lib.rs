//! Frame storage and the producer/consumer frame exchange
//!
//! The frame pump renders into owned [`FrameBuffer`]s and hands them to the
//! presenter through a lock-free exchange. Whole buffers change hands, so a
//! presented frame is always one complete engine output.

pub mod exchange;
pub mod framebuffer;

pub use exchange::{FrameConsumer, FrameProducer, create_frame_exchange};
pub use framebuffer::{BYTES_PER_PIXEL, FRAME_BYTES, FRAME_HEIGHT, FRAME_WIDTH, FrameBuffer};
