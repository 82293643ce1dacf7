//! Lock-free frame hand-off between the pump and the presenter
//!
//! Three buffers circulate through two queues: a free pool the producer
//! draws from, and a single-slot ready queue. Publishing into an occupied
//! slot displaces the stale frame back into the pool, so the presenter
//! always sees the newest complete frame and a slow presenter never stalls
//! the pump.

use crate::framebuffer::FrameBuffer;
use crossbeam::queue::ArrayQueue;
use std::sync::Arc;

/// Buffers in circulation per exchange
const POOL_FRAMES: usize = 3;

/// Producer half of the frame exchange, owned by the frame pump
pub struct FrameProducer {
    free: Arc<ArrayQueue<FrameBuffer>>,
    ready: Arc<ArrayQueue<FrameBuffer>>,
    next_sequence: u64,
}

/// Consumer half of the frame exchange, owned by the presenter
pub struct FrameConsumer {
    free: Arc<ArrayQueue<FrameBuffer>>,
    ready: Arc<ArrayQueue<FrameBuffer>>,
    current: Option<FrameBuffer>,
}

/// Create a connected producer/consumer pair with its buffer pool
pub fn create_frame_exchange() -> (FrameProducer, FrameConsumer) {
    let free = Arc::new(ArrayQueue::new(POOL_FRAMES));
    let ready = Arc::new(ArrayQueue::new(1));

    for _ in 0..POOL_FRAMES {
        let _ = free.push(FrameBuffer::new());
    }

    (
        FrameProducer {
            free: Arc::clone(&free),
            ready: Arc::clone(&ready),
            next_sequence: 1,
        },
        FrameConsumer {
            free,
            ready,
            current: None,
        },
    )
}

impl FrameProducer {
    /// Take a buffer to render into
    ///
    /// Falls back to a fresh allocation if the pool is momentarily dry; the
    /// surplus buffer is dropped again the next time the pool overflows.
    pub fn acquire(&mut self) -> FrameBuffer {
        self.free.pop().unwrap_or_default()
    }

    /// Publish a rendered frame, displacing any unconsumed predecessor
    pub fn publish(&mut self, mut frame: FrameBuffer) {
        frame.set_sequence(self.next_sequence);
        self.next_sequence += 1;

        if let Some(stale) = self.ready.force_push(frame) {
            let _ = self.free.push(stale);
        }
    }

    /// Return an unpublished buffer to the pool
    pub fn release(&mut self, frame: FrameBuffer) {
        let _ = self.free.push(frame);
    }

    /// Number of frames published so far
    pub fn published(&self) -> u64 {
        self.next_sequence - 1
    }
}

impl FrameConsumer {
    /// Newest complete frame, if any has ever been published
    ///
    /// Repeated calls return the same frame until a newer one arrives, so
    /// the presenter keeps showing the last output while the pump is idle.
    pub fn latest(&mut self) -> Option<&FrameBuffer> {
        if let Some(frame) = self.ready.pop() {
            if let Some(old) = self.current.take() {
                let _ = self.free.push(old);
            }
            self.current = Some(frame);
        }
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_frame_before_first_publish() {
        let (_producer, mut consumer) = create_frame_exchange();
        assert!(consumer.latest().is_none());
    }

    #[test]
    fn test_publish_then_latest() {
        let (mut producer, mut consumer) = create_frame_exchange();

        let mut frame = producer.acquire();
        frame.fill([7; 4]);
        producer.publish(frame);

        let seen = consumer.latest().unwrap();
        assert_eq!(seen.sequence(), 1);
        assert_eq!(seen.pixels()[0], 7);
    }

    #[test]
    fn test_latest_wins_when_consumer_lags() {
        let (mut producer, mut consumer) = create_frame_exchange();

        for tag in 1..=3u8 {
            let mut frame = producer.acquire();
            frame.fill([tag; 4]);
            producer.publish(frame);
        }

        let seen = consumer.latest().unwrap();
        assert_eq!(seen.sequence(), 3);
        assert_eq!(seen.pixels()[0], 3);
    }

    #[test]
    fn test_latest_is_stable_between_publishes() {
        let (mut producer, mut consumer) = create_frame_exchange();
        let frame = producer.acquire();
        producer.publish(frame);

        assert_eq!(consumer.latest().unwrap().sequence(), 1);
        assert_eq!(consumer.latest().unwrap().sequence(), 1);

        let frame = producer.acquire();
        producer.publish(frame);
        assert_eq!(consumer.latest().unwrap().sequence(), 2);
    }

    #[test]
    fn test_pool_survives_sustained_publishing() {
        let (mut producer, mut consumer) = create_frame_exchange();

        for round in 1..=100u64 {
            let frame = producer.acquire();
            producer.publish(frame);
            if round % 3 == 0 {
                consumer.latest();
            }
        }
        assert_eq!(producer.published(), 100);
        assert_eq!(consumer.latest().unwrap().sequence(), 100);
    }

    #[test]
    fn test_release_returns_buffer_to_pool() {
        let (mut producer, _consumer) = create_frame_exchange();

        for _ in 0..10 {
            let frame = producer.acquire();
            producer.release(frame);
        }
        assert_eq!(producer.free.len(), POOL_FRAMES);
    }

    #[test]
    fn test_threaded_frames_never_torn() {
        let (mut producer, mut consumer) = create_frame_exchange();

        let writer = std::thread::spawn(move || {
            for tag in 0..100u64 {
                let mut frame = producer.acquire();
                frame.fill([tag as u8; 4]);
                producer.publish(frame);
            }
        });

        let mut last_sequence = 0;
        while last_sequence < 100 {
            if let Some(frame) = consumer.latest() {
                let first = frame.pixels()[0];
                assert!(
                    frame.pixels().iter().all(|&b| b == first),
                    "torn frame at sequence {}",
                    frame.sequence()
                );
                assert!(frame.sequence() >= last_sequence);
                last_sequence = frame.sequence();
            }
        }
        writer.join().unwrap();
    }
}
