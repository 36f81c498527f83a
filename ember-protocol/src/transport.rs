//! Byte transport between the byte-arrival context and the main loop
//!
//! Each direction is a `heapless::spsc` queue split into a producer and a
//! consumer half. Every shared counter has exactly one writer:
//!
//! - receive: the producer runs the [`FrameDetector`] on each byte and bumps
//!   `frames_completed` / `dropped`; the consumer keeps its own
//!   `frames_consumed` and compares.
//! - transmit: the main loop enqueues whole frames and arms the drain; the
//!   serial side pops bytes until the ring is empty.

use heapless::spsc::{Consumer, Producer, Queue};
use portable_atomic::{AtomicU32, Ordering};

use crate::detector::{FrameDetector, Observation};

/// Transport errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Not enough room in the transmit ring for the whole frame
    TxFull { needed: usize, free: usize },
}

struct RxStats {
    frames_completed: AtomicU32,
    dropped: AtomicU32,
}

/// Receive ring, split once at startup
///
/// Holds `N - 1` bytes.
pub struct RxChannel<const N: usize> {
    queue: Queue<u8, N>,
    stats: RxStats,
}

impl<const N: usize> Default for RxChannel<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RxChannel<N> {
    pub const fn new() -> Self {
        Self {
            queue: Queue::new(),
            stats: RxStats {
                frames_completed: AtomicU32::new(0),
                dropped: AtomicU32::new(0),
            },
        }
    }

    /// Split into the byte-arrival half and the main-loop half
    pub fn split(&mut self) -> (RxProducer<'_, N>, RxConsumer<'_, N>) {
        let Self { queue, stats } = self;
        let stats: &RxStats = stats;
        let (producer, consumer) = queue.split();
        (
            RxProducer {
                queue: producer,
                stats,
                detector: FrameDetector::new(),
            },
            RxConsumer {
                queue: consumer,
                stats,
                frames_consumed: 0,
                dropped_seen: 0,
            },
        )
    }
}

/// Byte-arrival half of the receive ring
pub struct RxProducer<'a, const N: usize> {
    queue: Producer<'a, u8, N>,
    stats: &'a RxStats,
    detector: FrameDetector,
}

impl<const N: usize> RxProducer<'_, N> {
    /// Push one received byte
    ///
    /// Bytes outside a frame are discarded. When the ring is full the byte
    /// is dropped and counted. Returns true if this byte completed a frame.
    pub fn push(&mut self, byte: u8) -> bool {
        let observation = self.detector.observe(byte);
        if observation == Observation::Outside {
            return false;
        }

        if self.queue.enqueue(byte).is_err() {
            self.stats.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        if observation == Observation::FrameEnd {
            self.stats.frames_completed.fetch_add(1, Ordering::Release);
            return true;
        }
        false
    }

    /// Returns true while a frame has started but not ended
    pub fn in_frame(&self) -> bool {
        self.detector.in_frame()
    }
}

/// Main-loop half of the receive ring
pub struct RxConsumer<'a, const N: usize> {
    queue: Consumer<'a, u8, N>,
    stats: &'a RxStats,
    frames_consumed: u32,
    dropped_seen: u32,
}

impl<const N: usize> RxConsumer<'_, N> {
    /// Returns true if at least one complete frame is waiting
    pub fn frame_ready(&self) -> bool {
        self.stats.frames_completed.load(Ordering::Acquire) != self.frames_consumed
    }

    /// Take the next raw byte
    pub fn pop(&mut self) -> Option<u8> {
        self.queue.dequeue()
    }

    /// Bytes waiting in the ring
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.len() == 0
    }

    /// Bytes dropped on overflow since the last call
    pub fn take_dropped(&mut self) -> u32 {
        let total = self.stats.dropped.load(Ordering::Relaxed);
        let fresh = total.wrapping_sub(self.dropped_seen);
        self.dropped_seen = total;
        fresh
    }

    /// Copy the next frame into `buf`
    ///
    /// Skips bytes until STX and stops after the first unescaped ETX.
    /// A frame longer than `buf` is truncated and its remainder discarded.
    /// Returns the number of bytes written, 0 if no frame start was found.
    pub fn read_frame(&mut self, buf: &mut [u8]) -> usize {
        let completed = self.stats.frames_completed.load(Ordering::Acquire);
        let mut detector = FrameDetector::new();
        let mut len = 0;

        while let Some(byte) = self.queue.dequeue() {
            let observation = detector.observe(byte);
            if observation == Observation::Outside {
                continue;
            }
            if let Some(slot) = buf.get_mut(len) {
                *slot = byte;
                len += 1;
            }
            if observation == Observation::FrameEnd {
                self.frames_consumed = self.frames_consumed.wrapping_add(1);
                return len;
            }
        }

        // Ring ran dry: every frame counted before the load has been drained
        self.frames_consumed = completed;
        len
    }
}

/// Transmit ring, split once at startup
pub struct TxChannel<const N: usize> {
    queue: Queue<u8, N>,
}

impl<const N: usize> Default for TxChannel<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> TxChannel<N> {
    pub const fn new() -> Self {
        Self { queue: Queue::new() }
    }

    /// Split into the main-loop half and the serial half
    ///
    /// `arm` is called after every enqueued frame to wake the drain.
    pub fn split(&mut self, arm: Option<fn()>) -> (TxProducer<'_, N>, TxConsumer<'_, N>) {
        let (producer, consumer) = self.queue.split();
        (
            TxProducer {
                queue: producer,
                arm,
            },
            TxConsumer { queue: consumer },
        )
    }
}

/// Main-loop half of the transmit ring
pub struct TxProducer<'a, const N: usize> {
    queue: Producer<'a, u8, N>,
    arm: Option<fn()>,
}

impl<const N: usize> TxProducer<'_, N> {
    /// Free space in bytes
    pub fn free(&self) -> usize {
        self.queue.capacity() - self.queue.len()
    }

    /// Queue a complete frame and arm the drain
    ///
    /// Frames are never partially queued.
    pub fn enqueue(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let free = self.free();
        if bytes.len() > free {
            return Err(TransportError::TxFull {
                needed: bytes.len(),
                free,
            });
        }
        for &byte in bytes {
            // Space checked above
            let _ = self.queue.enqueue(byte);
        }
        if let Some(arm) = self.arm {
            arm();
        }
        Ok(())
    }
}

/// Serial half of the transmit ring
pub struct TxConsumer<'a, const N: usize> {
    queue: Consumer<'a, u8, N>,
}

impl<const N: usize> TxConsumer<'_, N> {
    /// Pop one byte, `None` means the drain can disarm
    pub fn drain_one(&mut self) -> Option<u8> {
        self.queue.dequeue()
    }

    /// Pop as many bytes as fit in `buf`
    pub fn drain_into(&mut self, buf: &mut [u8]) -> usize {
        let mut count = 0;
        for slot in buf.iter_mut() {
            match self.queue.dequeue() {
                Some(byte) => {
                    *slot = byte;
                    count += 1;
                }
                None => break,
            }
        }
        count
    }

    pub fn is_empty(&self) -> bool {
        self.queue.len() == 0
    }
}
