// SPDX-License-Identifier: Apache-2.0 OR MIT
// Producer-side ingress: thread-local ring acquisition and submission

use std::cell::RefCell;
use std::sync::Arc;

use crate::level::Level;
use crate::record::{current_thread_id, enforce_message_cap, Context, Record, SourceLocation};
use crate::registry::Registry;
use crate::ring::{Ring, DEFAULT_CAPACITY};

thread_local! {
    static PRODUCER: RefCell<ProducerSlot> = RefCell::new(ProducerSlot {
        module: String::new(),
        ring: None,
    });
}

/// Per-thread producer state: the mutable module name and, once the thread
/// has submitted, a strong reference to its ring.
struct ProducerSlot {
    module: String,
    ring: Option<(Arc<Ring>, Arc<Registry>)>,
}

impl ProducerSlot {
    /// Return this thread's ring, creating and registering it on first use.
    fn ring(&mut self, registry: &Arc<Registry>) -> Arc<Ring> {
        if let Some((ring, _)) = &self.ring {
            return Arc::clone(ring);
        }

        let ring = Arc::new(Ring::new(DEFAULT_CAPACITY, current_thread_id()));
        ring.set_label(&self.module);
        registry.register(Arc::clone(&ring));
        self.ring = Some((Arc::clone(&ring), Arc::clone(registry)));
        ring
    }
}

impl Drop for ProducerSlot {
    // Runs at thread exit. Clearing `active` tells the consumer it may
    // release the ring once drained; unregistering here immediately is only
    // safe when nothing is queued, otherwise the consumer must keep seeing
    // the ring in its snapshots until it has drained the remainder.
    fn drop(&mut self) {
        if let Some((ring, registry)) = self.ring.take() {
            ring.deactivate();
            if ring.is_empty() {
                registry.unregister(&ring);
            }
        }
    }
}

/// Set the module name attached to records submitted by the calling OS
/// thread. Tasks that migrate across threads pick up the name of whichever
/// thread they run on.
pub(crate) fn set_module_name(name: &str) {
    PRODUCER.with(|slot| {
        let mut slot = slot.borrow_mut();
        slot.module.clear();
        slot.module.push_str(name);
        if let Some((ring, _)) = &slot.ring {
            ring.set_label(name);
        }
    });
}

/// Build a record and enqueue it on the calling thread's ring. Level
/// filtering has already happened on the fast path.
pub(crate) fn submit(
    registry: &Arc<Registry>,
    loc: SourceLocation,
    level: Level,
    mut message: String,
) {
    enforce_message_cap(&mut message);

    PRODUCER.with(|slot| {
        let mut slot = slot.borrow_mut();
        let ring = slot.ring(registry);
        let context = Context {
            module: slot.module.clone(),
            function: loc.function,
            file: loc.file,
            line: loc.line,
            thread_id: ring.thread_id(),
        };
        ring.enqueue(Record::new(message, level, context));
    });
}
