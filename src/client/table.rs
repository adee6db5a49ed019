//! Connection table
//!
//! Slots indexed by socket descriptor, holding at most `max_clients` live
//! entries. Alongside the slots the table tracks how many are occupied and
//! the highest occupied descriptor, so iteration never walks past the last
//! live client.
//!
//! Descriptors are handed out by the kernel and may be larger than
//! `max_clients`; the slot vector grows to fit, while `count` stays bounded.

use crate::error::TableError;

/// Descriptor-indexed table of live clients.
pub struct ConnectionTable<T> {
    slots: Vec<Option<T>>,
    count: usize,
    high_watermark: Option<usize>,
    max_clients: usize,
}

impl<T> ConnectionTable<T> {
    pub fn new(max_clients: usize) -> Self {
        Self {
            slots: Vec::new(),
            count: 0,
            high_watermark: None,
            max_clients,
        }
    }

    /// Occupies the slot at `descriptor`.
    ///
    /// Fails with `CapacityExceeded` when the table is full and with
    /// `DuplicateSlot` when the slot is taken; on failure the table is
    /// unchanged and `item` is dropped.
    pub fn insert(&mut self, descriptor: usize, item: T) -> Result<(), TableError> {
        if self.is_full() {
            return Err(TableError::CapacityExceeded(self.max_clients));
        }
        if self.contains(descriptor) {
            return Err(TableError::DuplicateSlot(descriptor));
        }

        if descriptor >= self.slots.len() {
            self.slots.resize_with(descriptor + 1, || None);
        }
        self.slots[descriptor] = Some(item);
        self.count += 1;

        if self.high_watermark.is_none_or(|hw| descriptor > hw) {
            self.high_watermark = Some(descriptor);
        }

        Ok(())
    }

    /// Clears the slot at `descriptor` and returns what it held.
    ///
    /// Removing the highest occupied descriptor rescans downwards for the
    /// next occupied slot.
    pub fn remove(&mut self, descriptor: usize) -> Result<T, TableError> {
        let item = self
            .slots
            .get_mut(descriptor)
            .and_then(Option::take)
            .ok_or(TableError::NotFound(descriptor))?;
        self.count -= 1;

        if self.high_watermark == Some(descriptor) {
            self.high_watermark = (0..descriptor).rev().find(|&d| self.slots[d].is_some());
        }

        Ok(item)
    }

    /// Visits every occupied slot in ascending descriptor order.
    pub fn for_each_live<F>(&self, mut visitor: F)
    where
        F: FnMut(usize, &T),
    {
        let Some(hw) = self.high_watermark else {
            return;
        };
        for (descriptor, slot) in self.slots[..=hw].iter().enumerate() {
            if let Some(item) = slot {
                visitor(descriptor, item);
            }
        }
    }

    /// Like `for_each_live`, with mutable access to each entry.
    pub fn for_each_live_mut<F>(&mut self, mut visitor: F)
    where
        F: FnMut(usize, &mut T),
    {
        let Some(hw) = self.high_watermark else {
            return;
        };
        for (descriptor, slot) in self.slots[..=hw].iter_mut().enumerate() {
            if let Some(item) = slot {
                visitor(descriptor, item);
            }
        }
    }

    pub fn get(&self, descriptor: usize) -> Option<&T> {
        self.slots.get(descriptor).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, descriptor: usize) -> Option<&mut T> {
        self.slots.get_mut(descriptor).and_then(Option::as_mut)
    }

    pub fn contains(&self, descriptor: usize) -> bool {
        self.get(descriptor).is_some()
    }

    /// Live descriptors in ascending order.
    pub fn live_descriptors(&self) -> Vec<usize> {
        let mut descriptors = Vec::with_capacity(self.count);
        self.for_each_live(|descriptor, _| descriptors.push(descriptor));
        descriptors
    }

    /// Number of occupied slots.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Highest occupied descriptor, `None` when the table is empty.
    pub fn high_watermark(&self) -> Option<usize> {
        self.high_watermark
    }

    pub fn capacity(&self) -> usize {
        self.max_clients
    }

    pub fn is_full(&self) -> bool {
        self.count >= self.max_clients
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
