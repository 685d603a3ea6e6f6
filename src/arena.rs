//! Arena of imbalance records under matching.
//!
//! The matcher never mutates caller-visible lists. Imbalances are moved into
//! a central `Vec` and addressed by [`SlotId`]; the sell and buy queues hold
//! only ids, the same way a price level holds order ids rather than orders.

use crate::imbalance::Imbalance;
use crate::types::{Quantity, Value};

/// Index of a record inside an [`ImbalanceArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotId(pub usize);

/// Lifecycle of a record: pending → consumed, never back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SlotState {
    /// Value remains to be matched
    #[default]
    Pending,
    /// Fully matched; quantity and value are zero
    Consumed,
}

#[derive(Clone, Debug)]
struct Slot {
    record: Imbalance,
    state: SlotState,
}

/// Resizable store of imbalance records with per-record match state.
#[derive(Clone, Debug, Default)]
pub struct ImbalanceArena {
    slots: Vec<Slot>,
}

impl ImbalanceArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    /// Move a record into the arena and return its id.
    ///
    /// A record arriving with zero value starts out consumed.
    pub fn insert(&mut self, record: Imbalance) -> SlotId {
        let state = if record.value == 0.0 {
            SlotState::Consumed
        } else {
            SlotState::Pending
        };
        self.slots.push(Slot { record, state });
        SlotId(self.slots.len() - 1)
    }

    /// Move every record of `records` into the arena, returning ids in order.
    pub fn extend(&mut self, records: impl IntoIterator<Item = Imbalance>) -> Vec<SlotId> {
        records.into_iter().map(|r| self.insert(r)).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// # Panics
    ///
    /// Panics if `id` was not issued by this arena.
    #[inline]
    pub fn get(&self, id: SlotId) -> &Imbalance {
        &self.slots[id.0].record
    }

    #[inline]
    pub fn state(&self, id: SlotId) -> SlotState {
        self.slots[id.0].state
    }

    #[inline]
    pub fn is_consumed(&self, id: SlotId) -> bool {
        self.state(id) == SlotState::Consumed
    }

    /// Zero out a record and mark it consumed.
    pub fn consume(&mut self, id: SlotId) {
        let slot = &mut self.slots[id.0];
        slot.record.quantity = 0.0;
        slot.record.value = 0.0;
        slot.state = SlotState::Consumed;
    }

    /// Take a slice off a pending record without consuming it.
    ///
    /// # Panics
    ///
    /// Panics if the record is already consumed.
    pub fn consume_partial(&mut self, id: SlotId, quantity: Quantity, value: Value) {
        let slot = &mut self.slots[id.0];
        assert!(
            slot.state == SlotState::Pending,
            "partial consume of consumed record {}",
            slot.record.asset
        );
        slot.record.quantity -= quantity;
        slot.record.value -= value;
    }

    /// Records still pending among `ids`, in order.
    pub fn pending<'a>(&'a self, ids: &'a [SlotId]) -> impl Iterator<Item = &'a Imbalance> + 'a {
        ids.iter()
            .filter(|id| !self.is_consumed(**id))
            .map(|id| self.get(*id))
    }
}
