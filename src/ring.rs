// Lock-free per-producer ring buffer
//
// Single producer, single consumer. The producer owns `tail`, the consumer
// owns `head`; one slot is reserved so head == tail means empty and
// (tail + 1) == head means full. The release store of `tail` publishes the
// slot contents to the consumer's acquire load, and symmetrically the
// release store of `head` returns the slot to the producer.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use crossbeam_utils::Backoff;

use crate::record::Record;

/// Cache-aligned wrapper to prevent false sharing
#[repr(align(64))]
struct CacheAligned<T>(T);

/// Default per-producer capacity (slots; one is reserved)
pub(crate) const DEFAULT_CAPACITY: usize = 1 << 16;

/// Lock-free single-producer single-consumer ring of records
///
/// Each producer thread gets its own ring, so no write contention exists by
/// construction. The consumer side is the single drain thread.
pub(crate) struct Ring {
    slots: Box<[UnsafeCell<MaybeUninit<Record>>]>,
    mask: usize,
    /// Written only by the owning producer
    tail: CacheAligned<AtomicUsize>,
    /// Written only by the consumer
    head: CacheAligned<AtomicUsize>,
    /// Cleared by the producer at thread exit
    active: AtomicBool,
    /// Total records ever enqueued, for stats reporting
    submitted: AtomicU64,
    thread_id: u32,
    /// Producer label shown by `print_stats`; written by the owning thread,
    /// read by whoever prints stats
    label: Mutex<String>,
}

// SAFETY: Ring is Sync because:
// - Only the owning producer thread writes tail and the slots behind it
//   (guaranteed by the thread-local ingress, which never shares its ring)
// - Only the consumer thread writes head
// - The release/acquire pairing on tail and head orders slot access: a slot
//   is written strictly before the tail store that publishes it, and read
//   strictly before the head store that recycles it
unsafe impl Send for Ring {}
unsafe impl Sync for Ring {}

impl Ring {
    /// Create a ring with `capacity` slots (must be a power of two).
    ///
    /// # Panics
    /// Panics if capacity is not a power of two.
    pub(crate) fn new(capacity: usize, thread_id: u32) -> Self {
        assert!(capacity.is_power_of_two(), "capacity must be a power of 2");

        let slots: Vec<UnsafeCell<MaybeUninit<Record>>> = (0..capacity)
            .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
            .collect();

        Self {
            slots: slots.into_boxed_slice(),
            mask: capacity - 1,
            tail: CacheAligned(AtomicUsize::new(0)),
            head: CacheAligned(AtomicUsize::new(0)),
            active: AtomicBool::new(true),
            submitted: AtomicU64::new(0),
            thread_id,
            label: Mutex::new(String::new()),
        }
    }

    /// Enqueue a record (producer side only).
    ///
    /// Never drops: when the ring is full the producer spins, yielding to the
    /// scheduler, until the consumer frees a slot. The record is already
    /// fully constructed when it arrives here, so a caller panic cannot leave
    /// a half-written slot behind.
    pub(crate) fn enqueue(&self, record: Record) {
        let tail = self.tail.0.load(Ordering::Relaxed);
        let next = (tail + 1) & self.mask;

        let backoff = Backoff::new();
        while next == self.head.0.load(Ordering::Acquire) {
            backoff.snooze();
        }

        // SAFETY: the slot at `tail` is outside [head, tail) so the consumer
        // will not touch it until the release store below publishes it, and
        // no other producer exists.
        unsafe {
            (*self.slots[tail].get()).write(record);
        }

        self.tail.0.store(next, Ordering::Release);
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Dequeue a record (consumer side only). Returns None when empty.
    pub(crate) fn dequeue(&self) -> Option<Record> {
        let head = self.head.0.load(Ordering::Relaxed);
        if head == self.tail.0.load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: head != tail, so the slot at `head` holds an initialized
        // record published by the producer's release store of tail. Moving it
        // out leaves the slot logically uninitialized, which the head store
        // below communicates back to the producer.
        let record = unsafe { (*self.slots[head].get()).assume_init_read() };

        self.head.0.store((head + 1) & self.mask, Ordering::Release);
        Some(record)
    }

    /// Number of slots (one of which is reserved)
    pub(crate) fn capacity(&self) -> usize {
        self.mask + 1
    }

    /// Approximate number of records currently queued
    pub(crate) fn len(&self) -> usize {
        let tail = self.tail.0.load(Ordering::Relaxed);
        let head = self.head.0.load(Ordering::Relaxed);
        (tail.wrapping_sub(head)) & self.mask
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Advisory: occupancy at or above 90% of capacity. The consumer uses
    /// this to shorten its idle sleep.
    pub(crate) fn is_nearly_full(&self) -> bool {
        self.len() * 10 >= self.capacity() * 9
    }

    /// Mark the producer as gone; the consumer drains the remainder and then
    /// releases the ring.
    pub(crate) fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub(crate) fn thread_id(&self) -> u32 {
        self.thread_id
    }

    pub(crate) fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    pub(crate) fn set_label(&self, label: &str) {
        let mut guard = self.label.lock().unwrap();
        guard.clear();
        guard.push_str(label);
    }

    pub(crate) fn label(&self) -> String {
        self.label.lock().unwrap().clone()
    }
}

impl Drop for Ring {
    fn drop(&mut self) {
        // Records still queued own heap buffers; move them out so they drop.
        while self.dequeue().is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::record::{current_thread_id, Context};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn record(message: &str) -> Record {
        Record::new(
            message.to_string(),
            Level::Info,
            Context {
                module: String::new(),
                function: "tests",
                file: "ring.rs",
                line: 1,
                thread_id: current_thread_id(),
            },
        )
    }

    #[test]
    fn test_basic() {
        let ring = Ring::new(4, 0);

        ring.enqueue(record("first"));
        ring.enqueue(record("second"));
        assert_eq!(ring.len(), 2);

        assert_eq!(ring.dequeue().unwrap().message, "first");
        assert_eq!(ring.dequeue().unwrap().message, "second");
        assert!(ring.dequeue().is_none());
        assert!(ring.is_empty());
        assert_eq!(ring.submitted(), 2);
    }

    #[test]
    fn test_wraparound() {
        let ring = Ring::new(4, 0);

        for round in 0..5 {
            for i in 0..3 {
                ring.enqueue(record(&format!("r{}m{}", round, i)));
            }
            for i in 0..3 {
                let got = ring.dequeue().unwrap();
                assert_eq!(got.message, format!("r{}m{}", round, i));
            }
        }
        assert!(ring.is_empty());
    }

    #[test]
    fn test_one_slot_reserved() {
        let ring = Ring::new(4, 0);
        for i in 0..3 {
            ring.enqueue(record(&format!("m{}", i)));
        }
        // capacity - 1 live records is the maximum
        assert_eq!(ring.len(), ring.capacity() - 1);
    }

    #[test]
    fn test_full_blocks_until_consumer_frees_a_slot() {
        let ring = Arc::new(Ring::new(4, 0));
        for i in 0..3 {
            ring.enqueue(record(&format!("m{}", i)));
        }

        let consumer = {
            let ring = Arc::clone(&ring);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                ring.dequeue().unwrap()
            })
        };

        // Ring is full: this enqueue must spin until the consumer dequeues,
        // then complete rather than drop.
        ring.enqueue(record("m3"));
        assert_eq!(consumer.join().unwrap().message, "m0");
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn test_nearly_full() {
        let ring = Ring::new(16, 0);
        assert!(!ring.is_nearly_full());
        // 14/16 is below the 90% threshold, 15/16 is above it
        for i in 0..14 {
            ring.enqueue(record(&format!("m{}", i)));
        }
        assert!(!ring.is_nearly_full());
        ring.enqueue(record("m14"));
        assert!(ring.is_nearly_full());
    }

    #[test]
    fn test_spsc_fifo_across_threads() {
        let ring = Arc::new(Ring::new(64, 0));
        const COUNT: usize = 10_000;

        let producer = {
            let ring = Arc::clone(&ring);
            thread::spawn(move || {
                for i in 0..COUNT {
                    ring.enqueue(record(&format!("{}", i)));
                }
            })
        };

        let mut next = 0usize;
        while next < COUNT {
            if let Some(got) = ring.dequeue() {
                assert_eq!(got.message, format!("{}", next));
                next += 1;
            } else {
                std::hint::spin_loop();
            }
        }

        producer.join().unwrap();
        assert!(ring.is_empty());
    }

    #[test]
    fn test_deactivate() {
        let ring = Ring::new(4, 0);
        assert!(ring.is_active());
        ring.deactivate();
        assert!(!ring.is_active());
    }

    #[test]
    #[should_panic(expected = "power of 2")]
    fn test_capacity_must_be_power_of_two() {
        let _ = Ring::new(6, 0);
    }

    #[test]
    fn test_drop_releases_queued_records() {
        // Drop with queued records must not leak or double-free.
        let ring = Ring::new(8, 0);
        for i in 0..5 {
            ring.enqueue(record(&format!("m{}", i)));
        }
        drop(ring);
    }
}
