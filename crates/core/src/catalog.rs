//! Item catalog: per-item properties the smelting core needs to know about.

use crate::item::{ItemId, ItemStack, DEFAULT_MAX_STACK};
use crate::registry::RegistryKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Static properties of one item type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDescriptor {
    /// Stable authoring name.
    pub key: RegistryKey,
    /// Largest count a single stack of this item may hold.
    pub max_stack: u32,
    /// Whether the variant field distinguishes different items (dye colours, ...).
    pub has_subtypes: bool,
    /// Item left behind when the last unit is consumed as fuel (lava bucket -> bucket).
    pub container: Option<ItemId>,
}

impl ItemDescriptor {
    /// Plain stackable item.
    pub fn simple(key: RegistryKey) -> Self {
        Self {
            key,
            max_stack: DEFAULT_MAX_STACK,
            has_subtypes: false,
            container: None,
        }
    }
}

/// Registry of item descriptors indexed by [`ItemId`].
///
/// Id 0 is reserved for the empty stack and never handed out.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: Vec<ItemDescriptor>,
    by_key: BTreeMap<RegistryKey, ItemId>,
}

impl ItemCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an item, returning its id. Re-registering a key returns the existing id
    /// and replaces its descriptor.
    pub fn register(&mut self, descriptor: ItemDescriptor) -> ItemId {
        if let Some(&id) = self.by_key.get(&descriptor.key) {
            self.items[usize::from(id.raw()) - 1] = descriptor;
            return id;
        }
        let id = ItemId(u16::try_from(self.items.len() + 1).unwrap_or(u16::MAX));
        self.by_key.insert(descriptor.key.clone(), id);
        self.items.push(descriptor);
        id
    }

    /// Look up an item id by key.
    pub fn id(&self, key: &RegistryKey) -> Option<ItemId> {
        self.by_key.get(key).copied()
    }

    /// Parse `name` as a [`RegistryKey`] and look it up.
    pub fn id_by_name(&self, name: &str) -> Option<ItemId> {
        RegistryKey::parse(name).ok().and_then(|key| self.id(&key))
    }

    /// Descriptor for an id, if registered.
    pub fn descriptor(&self, id: ItemId) -> Option<&ItemDescriptor> {
        let index = usize::from(id.raw()).checked_sub(1)?;
        self.items.get(index)
    }

    /// Number of registered items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Max stack size for the stack's item (unknown items use [`DEFAULT_MAX_STACK`]).
    pub fn max_stack_size(&self, stack: &ItemStack) -> u32 {
        self.descriptor(stack.item)
            .map(|d| d.max_stack)
            .unwrap_or(DEFAULT_MAX_STACK)
    }

    /// Whether the stack's item distinguishes variants.
    pub fn has_subtypes(&self, stack: &ItemStack) -> bool {
        self.descriptor(stack.item)
            .map(|d| d.has_subtypes)
            .unwrap_or(false)
    }

    /// Remnant left when the last unit of `stack` is consumed, or empty.
    pub fn container_item(&self, stack: &ItemStack) -> ItemStack {
        self.descriptor(stack.item)
            .and_then(|d| d.container)
            .map(|id| ItemStack::new(id, 1))
            .unwrap_or(ItemStack::EMPTY)
    }

    /// Iterate registered `(id, descriptor)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &ItemDescriptor)> + '_ {
        self.items
            .iter()
            .enumerate()
            .map(|(i, d)| (ItemId(u16::try_from(i + 1).unwrap_or(u16::MAX)), d))
    }
}
