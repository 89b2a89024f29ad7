//! Lock-free single-producer/single-consumer handoff queue.
//!
//! A bounded ring buffer that carries assembled lines and frames from the
//! byte-reading context to the decoding context. The producer never blocks:
//! pushing onto a full queue fails and hands the item back, and the caller
//! drops it. Popping from an empty queue returns `None`.
//!
//! The queue is strictly SPSC. The producer and consumer ends are separate
//! owned types, so each end can only ever be driven from one thread at a
//! time; the ring itself needs no locks, only one release/acquire pair per
//! transfer.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Default queue capacity, sized for several seconds of one-per-second text
/// blocks plus bursts of async frames.
pub const DEFAULT_QUEUE_CAPACITY: usize = 240;

struct Ring<T> {
    /// `capacity + 1` slots; one slot stays empty to distinguish full from
    /// empty without a separate counter.
    slots: Box<[UnsafeCell<Option<T>>]>,
    /// Next slot the consumer will take. Written only by the consumer.
    head: AtomicUsize,
    /// Next slot the producer will fill. Written only by the producer.
    tail: AtomicUsize,
}

// SAFETY: a slot is accessed by exactly one side at a time. The producer
// writes `slots[tail]` before publishing it with a release store of `tail`;
// the consumer reads `tail` with acquire before touching the slot, and the
// symmetric argument covers slot reuse via `head`. The Producer/Consumer
// wrappers guarantee a single thread per side.
unsafe impl<T: Send> Send for Ring<T> {}
unsafe impl<T: Send> Sync for Ring<T> {}

impl<T> Ring<T> {
    fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.slots.len()
    }
}

/// The enqueue end of an SPSC queue. Not cloneable; exactly one exists.
pub struct QueueProducer<T> {
    ring: Arc<Ring<T>>,
}

/// The dequeue end of an SPSC queue. Not cloneable; exactly one exists.
pub struct QueueConsumer<T> {
    ring: Arc<Ring<T>>,
}

/// Create a bounded SPSC queue holding up to `capacity` items.
pub fn spsc_channel<T>(capacity: usize) -> (QueueProducer<T>, QueueConsumer<T>) {
    assert!(capacity > 0, "queue capacity must be non-zero");
    let slots = (0..capacity + 1)
        .map(|_| UnsafeCell::new(None))
        .collect::<Vec<_>>()
        .into_boxed_slice();
    let ring = Arc::new(Ring {
        slots,
        head: AtomicUsize::new(0),
        tail: AtomicUsize::new(0),
    });
    (
        QueueProducer { ring: ring.clone() },
        QueueConsumer { ring },
    )
}

impl<T> QueueProducer<T> {
    /// Enqueue an item without blocking.
    ///
    /// Returns the item back as `Err` when the queue is full; existing
    /// contents are untouched.
    pub fn push(&mut self, value: T) -> Result<(), T> {
        let ring = &*self.ring;
        let tail = ring.tail.load(Ordering::Relaxed);
        let next = ring.next_index(tail);
        if next == ring.head.load(Ordering::Acquire) {
            return Err(value);
        }
        // SAFETY: `next != head`, so the consumer has not claimed this slot,
        // and this is the only producer.
        unsafe {
            *ring.slots[tail].get() = Some(value);
        }
        ring.tail.store(next, Ordering::Release);
        Ok(())
    }

    /// Advisory fullness check, for diagnostics only.
    pub fn is_full(&self) -> bool {
        let ring = &*self.ring;
        ring.next_index(ring.tail.load(Ordering::Relaxed)) == ring.head.load(Ordering::Acquire)
    }
}

impl<T> QueueConsumer<T> {
    /// Dequeue the oldest item, or `None` when the queue is empty.
    pub fn pop(&mut self) -> Option<T> {
        let ring = &*self.ring;
        let head = ring.head.load(Ordering::Relaxed);
        if head == ring.tail.load(Ordering::Acquire) {
            return None;
        }
        // SAFETY: `head != tail`, so the producer has published this slot
        // and will not touch it again until `head` moves past it.
        let value = unsafe { (*ring.slots[head].get()).take() };
        ring.head.store(ring.next_index(head), Ordering::Release);
        value
    }

    /// Advisory emptiness check, for diagnostics only.
    pub fn is_empty(&self) -> bool {
        let ring = &*self.ring;
        ring.head.load(Ordering::Relaxed) == ring.tail.load(Ordering::Acquire)
    }
}
