//! Fixed-length slot storage partitioned by a [`SlotLayout`].

use crate::error::FurnaceError;
use crate::layout::SlotLayout;
use serde::{Deserialize, Serialize};
use smeltery_core::ItemStack;

/// Ordered slot contents. The length is set at construction and never changes;
/// empty slots hold [`ItemStack::EMPTY`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotArray {
    layout: SlotLayout,
    slots: Box<[ItemStack]>,
}

impl SlotArray {
    /// All slots empty.
    pub fn new(layout: SlotLayout) -> Self {
        Self {
            layout,
            slots: vec![ItemStack::EMPTY; layout.total()].into_boxed_slice(),
        }
    }

    /// Partition of this array.
    pub fn layout(&self) -> SlotLayout {
        self.layout
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True only for a zero-slot layout.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// True when every slot is empty.
    pub fn all_empty(&self) -> bool {
        self.slots.iter().all(ItemStack::is_empty)
    }

    /// Borrow a slot.
    pub fn get(&self, index: usize) -> Result<&ItemStack, FurnaceError> {
        self.slots.get(index).ok_or(FurnaceError::SlotOutOfRange {
            index,
            len: self.slots.len(),
        })
    }

    /// Borrow a slot mutably.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut ItemStack, FurnaceError> {
        let len = self.slots.len();
        self.slots
            .get_mut(index)
            .ok_or(FurnaceError::SlotOutOfRange { index, len })
    }

    /// Overwrite a slot, capping the count at `limit`. Zero-count stacks are
    /// normalised to the empty sentinel.
    pub fn set(&mut self, index: usize, mut stack: ItemStack, limit: u32) -> Result<(), FurnaceError> {
        let slot = self.get_mut(index)?;
        if stack.is_empty() {
            stack = ItemStack::EMPTY;
        } else if stack.count > limit {
            stack.count = limit;
        }
        *slot = stack;
        Ok(())
    }

    /// Empty a slot, returning what it held.
    pub fn remove(&mut self, index: usize) -> Result<ItemStack, FurnaceError> {
        let slot = self.get_mut(index)?;
        Ok(std::mem::take(slot))
    }

    /// Split up to `count` units out of a slot.
    pub fn split(&mut self, index: usize, count: u32) -> Result<ItemStack, FurnaceError> {
        let slot = self.get_mut(index)?;
        Ok(slot.split(count))
    }

    /// Reset every slot to empty.
    pub fn clear(&mut self) {
        self.slots.fill(ItemStack::EMPTY);
    }

    /// Fuel slots, in order.
    pub fn fuel(&self) -> &[ItemStack] {
        &self.slots[self.layout.fuel_range()]
    }

    /// Fuel slots, mutably.
    pub fn fuel_mut(&mut self) -> &mut [ItemStack] {
        let range = self.layout.fuel_range();
        &mut self.slots[range]
    }

    /// Input slots, in order.
    pub fn input(&self) -> &[ItemStack] {
        &self.slots[self.layout.input_range()]
    }

    /// Output slots, in order.
    pub fn output(&self) -> &[ItemStack] {
        &self.slots[self.layout.output_range()]
    }

    /// All slots with their indices.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ItemStack)> + '_ {
        self.slots.iter().enumerate()
    }
}
