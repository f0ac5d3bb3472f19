//! Thread-safe ring buffer between the transport thread and the tick loop

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::ChatCommand;

/// Default number of chat commands retained
pub const DEFAULT_BUFFER_CAPACITY: usize = 1000;

/// Fixed-capacity, mutex-guarded ring of chat commands.
///
/// Writers never block on readers: once the ring is full, each insert evicts
/// the oldest entry. A single consumer drains it incrementally through
/// [`get_new_commands`](Self::get_new_commands); if the writer laps the read
/// cursor in between, the lapped entries are gone and only what is still
/// retained is returned.
///
/// The lock is only ever held for the duration of one buffer operation.
#[derive(Debug)]
pub struct CommandBuffer {
    inner: Mutex<Ring>,
    capacity: usize,
}

#[derive(Debug)]
struct Ring {
    slots: Vec<Option<ChatCommand>>,
    /// Next slot to write
    head: usize,
    /// Oldest retained slot
    tail: usize,
    count: usize,
    /// Total inserts since creation
    written: u64,
    /// Value of `written` at the last incremental read
    read_mark: u64,
    /// Entries overwritten before they were read
    evicted: u64,
}

impl CommandBuffer {
    /// Create a buffer holding at most `capacity` commands (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(Ring {
                slots: vec![None; capacity],
                head: 0,
                tail: 0,
                count: 0,
                written: 0,
                read_mark: 0,
                evicted: 0,
            }),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Ring> {
        // Every operation leaves the ring consistent, so a poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a command, overwriting the oldest one when full
    pub fn add_command(&self, command: ChatCommand) {
        let capacity = self.capacity;
        let mut ring = self.lock();

        let head = ring.head;
        ring.slots[head] = Some(command);
        ring.head = (head + 1) % capacity;
        ring.written += 1;

        if ring.count < capacity {
            ring.count += 1;
        } else {
            ring.tail = (ring.tail + 1) % capacity;
            if ring.written - ring.read_mark > capacity as u64 {
                ring.evicted += 1;
            }
        }
    }

    /// Every command added since the previous call, oldest first.
    ///
    /// Advances the read cursor to the current head.
    pub fn get_new_commands(&self) -> Vec<ChatCommand> {
        let capacity = self.capacity;
        let mut ring = self.lock();

        let unread = (ring.written - ring.read_mark).min(ring.count as u64) as usize;
        ring.read_mark = ring.written;

        // The unread entries are the newest `unread` retained ones.
        let start = (ring.head + capacity - unread) % capacity;
        (0..unread)
            .filter_map(|i| ring.slots[(start + i) % capacity].clone())
            .collect()
    }

    /// Snapshot of every retained command, oldest first. Does not move the read cursor.
    pub fn get_all_commands(&self) -> Vec<ChatCommand> {
        let capacity = self.capacity;
        let ring = self.lock();
        (0..ring.count)
            .filter_map(|i| ring.slots[(ring.tail + i) % capacity].clone())
            .collect()
    }

    /// Drop every retained command and reset the read cursor
    pub fn clear(&self) {
        let mut ring = self.lock();
        ring.slots.iter_mut().for_each(|slot| *slot = None);
        ring.head = 0;
        ring.tail = 0;
        ring.count = 0;
        ring.read_mark = ring.written;
    }

    pub fn size(&self) -> usize {
        self.lock().count
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.lock().count == 0
    }

    pub fn is_full(&self) -> bool {
        self.lock().count == self.capacity
    }

    /// Number of commands overwritten before the consumer read them
    pub fn evicted(&self) -> u64 {
        self.lock().evicted
    }
}

impl Default for CommandBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}
