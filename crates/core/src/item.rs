//! Item stacks held in appliance slots.
//!
//! An empty slot is never represented by a missing value: it holds
//! [`ItemStack::EMPTY`], a zero-count stack of the reserved [`ItemId::NONE`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum stack size for items that do not declare their own.
pub const DEFAULT_MAX_STACK: u32 = 64;

/// Item identifier referencing the item catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u16);

impl ItemId {
    /// Reserved identifier carried by the empty stack.
    pub const NONE: Self = Self(0);

    /// Raw numeric value.
    pub fn raw(self) -> u16 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A stack of identical items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    /// Item type identifier.
    pub item: ItemId,
    /// Subtype of the item (colour, damage, ...). Zero for items without subtypes.
    #[serde(default)]
    pub variant: u16,
    /// Number of items in this stack.
    pub count: u32,
    /// Optional opaque tag data; stacks only merge when tags are equal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<Vec<u8>>,
}

impl Default for ItemStack {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl ItemStack {
    /// The empty slot sentinel.
    pub const EMPTY: ItemStack = ItemStack {
        item: ItemId::NONE,
        variant: 0,
        count: 0,
        tag: None,
    };

    /// Create a new item stack.
    pub fn new(item: ItemId, count: u32) -> Self {
        Self {
            item,
            variant: 0,
            count,
            tag: None,
        }
    }

    /// Builder-style variant setter.
    pub fn with_variant(mut self, variant: u16) -> Self {
        self.variant = variant;
        self
    }

    /// Builder-style tag setter.
    pub fn with_tag(mut self, tag: Vec<u8>) -> Self {
        self.tag = Some(tag);
        self
    }

    /// True for the empty sentinel and for any stack whose count dropped to zero.
    pub fn is_empty(&self) -> bool {
        self.count == 0 || self.item == ItemId::NONE
    }

    /// Copy of this stack with a different count.
    pub fn copy_with_count(&self, count: u32) -> ItemStack {
        if count == 0 {
            return ItemStack::EMPTY;
        }
        ItemStack {
            item: self.item,
            variant: self.variant,
            count,
            tag: self.tag.clone(),
        }
    }

    /// Remove up to `amount` items; a stack that reaches zero becomes [`ItemStack::EMPTY`].
    pub fn shrink(&mut self, amount: u32) {
        self.count = self.count.saturating_sub(amount);
        if self.count == 0 {
            *self = ItemStack::EMPTY;
        }
    }

    /// Add `amount` items without any capacity check.
    pub fn grow(&mut self, amount: u32) {
        self.count = self.count.saturating_add(amount);
    }

    /// Split up to `amount` items off into a new stack, leaving the remainder.
    pub fn split(&mut self, amount: u32) -> ItemStack {
        if self.is_empty() || amount == 0 {
            return ItemStack::EMPTY;
        }
        let taken = amount.min(self.count);
        let removed = self.copy_with_count(taken);
        self.shrink(taken);
        removed
    }

    /// Same item id and equal tag data. Variant is compared only when `compare_variant` is set.
    pub fn is_same_item(&self, other: &ItemStack, compare_variant: bool) -> bool {
        self.item == other.item
            && (!compare_variant || self.variant == other.variant)
            && self.tag == other.tag
    }
}

impl fmt::Display for ItemStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "empty");
        }
        write!(f, "{}x{}", self.count, self.item)?;
        if self.variant != 0 {
            write!(f, ":{}", self.variant)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sentinel_is_empty() {
        assert!(ItemStack::EMPTY.is_empty());
        assert!(ItemStack::default().is_empty());
        assert!(ItemStack::new(ItemId(3), 0).is_empty());
        assert!(!ItemStack::new(ItemId(3), 1).is_empty());
    }

    #[test]
    fn shrink_to_zero_becomes_sentinel() {
        let mut stack = ItemStack::new(ItemId(7), 2).with_variant(4);
        stack.shrink(1);
        assert_eq!(stack.count, 1);
        stack.shrink(5);
        assert_eq!(stack, ItemStack::EMPTY);
    }

    #[test]
    fn split_takes_at_most_count() {
        let mut stack = ItemStack::new(ItemId(1), 10).with_tag(vec![1, 2]);
        let half = stack.split(4);
        assert_eq!(half.count, 4);
        assert_eq!(half.tag, Some(vec![1, 2]));
        assert_eq!(stack.count, 6);

        let rest = stack.split(64);
        assert_eq!(rest.count, 6);
        assert!(stack.is_empty());

        assert!(stack.split(1).is_empty());
    }

    #[test]
    fn same_item_respects_variant_flag_and_tag() {
        let a = ItemStack::new(ItemId(5), 1).with_variant(1);
        let b = ItemStack::new(ItemId(5), 3).with_variant(2);
        assert!(!a.is_same_item(&b, true));
        assert!(a.is_same_item(&b, false));

        let tagged = b.clone().with_tag(vec![9]);
        assert!(!a.is_same_item(&tagged, false));
    }
}
