//! Capabilities the simulation consumes from its host: recipe and fuel
//! lookups, item properties, and refresh/persistence notifications.

use crate::error::RecipeError;
use crate::layout::MAX_BURN_TICKS;
use serde::{Deserialize, Serialize};
use smeltery_core::{ItemCatalog, ItemDescriptor, ItemId, ItemStack, RegistryKey, DEFAULT_MAX_STACK};
use std::collections::HashMap;

/// Recipe, fuel and item-property lookups.
pub trait SmeltingRules {
    /// Result of smelting one unit of `input`, or `None` if it does not smelt.
    fn smelting_result(&self, input: &ItemStack) -> Option<ItemStack>;

    /// Burn duration in ticks of one unit of `fuel`; zero if it is not fuel.
    fn burn_duration(&self, fuel: &ItemStack) -> u32;

    /// Item-specific stack cap.
    fn max_stack_size(&self, _stack: &ItemStack) -> u32 {
        DEFAULT_MAX_STACK
    }

    /// Whether the item distinguishes variants.
    fn has_subtypes(&self, _stack: &ItemStack) -> bool {
        false
    }

    /// Remnant left when the last unit of a fuel stack burns.
    fn container_item(&self, _stack: &ItemStack) -> ItemStack {
        ItemStack::EMPTY
    }
}

/// Notifications raised by the simulation towards its host.
pub trait ApplianceHost {
    /// Number of burning fuel slots changed; re-render and recompute lighting.
    fn notify_visual_and_lighting_refresh(&mut self, _burning: usize) {}

    /// Contents or timers changed and should be saved.
    fn request_persistence_dirty(&mut self) {}
}

/// Host that ignores every notification.
impl ApplianceHost for () {}

/// Host that counts notifications; handy for headless runs and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountingHost {
    /// Refresh notifications received.
    pub refreshes: usize,
    /// Burning counts reported with each refresh, in order.
    pub burning_history: Vec<usize>,
    /// Dirty notifications received.
    pub dirty_requests: usize,
}

impl ApplianceHost for CountingHost {
    fn notify_visual_and_lighting_refresh(&mut self, burning: usize) {
        self.refreshes += 1;
        self.burning_history.push(burning);
    }

    fn request_persistence_dirty(&mut self) {
        self.dirty_requests += 1;
    }
}

/// One smelting recipe keyed by input item and optional variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmeltRecipe {
    /// Consumed item.
    pub input: ItemId,
    /// Restrict the recipe to one input variant; `None` matches every variant.
    pub input_variant: Option<u16>,
    /// Produced stack per consumed unit.
    pub output: ItemStack,
}

/// Authoring form of a recipe, resolved against an [`ItemCatalog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDef {
    /// Input item name.
    pub input: String,
    /// Optional input variant.
    #[serde(default)]
    pub input_variant: Option<u16>,
    /// Output item name.
    pub output: String,
    /// Output variant.
    #[serde(default)]
    pub output_variant: u16,
    /// Output count per smelt.
    #[serde(default = "default_output_count")]
    pub count: u32,
}

fn default_output_count() -> u32 {
    1
}

/// Authoring form of a fuel entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelDef {
    /// Fuel item name.
    pub item: String,
    /// Burn duration in ticks.
    pub ticks: u32,
}

/// Authoring form of an item entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDef {
    /// Item name.
    pub name: String,
    /// Max stack size.
    #[serde(default = "default_max_stack")]
    pub max_stack: u32,
    /// Variants are distinct items.
    #[serde(default)]
    pub has_subtypes: bool,
    /// Remnant item name.
    #[serde(default)]
    pub container: Option<String>,
}

fn default_max_stack() -> u32 {
    DEFAULT_MAX_STACK
}

/// Table-driven [`SmeltingRules`] implementation.
#[derive(Debug, Clone, Default)]
pub struct RecipeBook {
    catalog: ItemCatalog,
    recipes: Vec<SmeltRecipe>,
    fuels: HashMap<ItemId, u32>,
}

impl RecipeBook {
    /// Empty book over a catalog.
    pub fn new(catalog: ItemCatalog) -> Self {
        Self {
            catalog,
            recipes: Vec::new(),
            fuels: HashMap::new(),
        }
    }

    /// Item catalog backing this book.
    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    /// Add a recipe. Later recipes for the same input never shadow earlier ones.
    pub fn add_recipe(&mut self, recipe: SmeltRecipe) {
        self.recipes.push(recipe);
    }

    /// Register a fuel; durations are clamped to [`MAX_BURN_TICKS`].
    pub fn add_fuel(&mut self, item: ItemId, ticks: u32) {
        self.fuels.insert(item, ticks.min(MAX_BURN_TICKS));
    }

    /// Number of recipes.
    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }

    /// Resolve a stack by item name.
    pub fn stack(&self, name: &str, count: u32) -> Result<ItemStack, RecipeError> {
        Ok(ItemStack::new(self.resolve(name)?, count))
    }

    fn resolve(&self, name: &str) -> Result<ItemId, RecipeError> {
        let key = RegistryKey::parse(name)?;
        self.catalog
            .id(&key)
            .ok_or_else(|| RecipeError::UnknownItem(name.to_string()))
    }

    /// Build a book from authoring definitions.
    pub fn from_defs(items: &[ItemDef], recipes: &[RecipeDef], fuels: &[FuelDef]) -> Result<Self, RecipeError> {
        let mut catalog = ItemCatalog::new();
        for item in items {
            catalog.register(ItemDescriptor::simple(RegistryKey::parse(&item.name)?));
        }
        // Second pass so containers may reference items declared later.
        for item in items {
            let container = match &item.container {
                Some(name) => Some(
                    catalog
                        .id_by_name(name)
                        .ok_or_else(|| RecipeError::UnknownItem(name.clone()))?,
                ),
                None => None,
            };
            catalog.register(ItemDescriptor {
                key: RegistryKey::parse(&item.name)?,
                max_stack: item.max_stack.max(1),
                has_subtypes: item.has_subtypes,
                container,
            });
        }

        let mut book = RecipeBook::new(catalog);
        for def in recipes {
            if def.count == 0 {
                return Err(RecipeError::EmptyOutput(def.input.clone()));
            }
            let input = book.resolve(&def.input)?;
            let output = book.resolve(&def.output)?;
            book.add_recipe(SmeltRecipe {
                input,
                input_variant: def.input_variant,
                output: ItemStack::new(output, def.count).with_variant(def.output_variant),
            });
        }
        for def in fuels {
            let item = book.resolve(&def.item)?;
            book.add_fuel(item, def.ticks);
        }
        Ok(book)
    }

    /// A small built-in content set.
    pub fn standard() -> Self {
        let (items, recipes, fuels) = standard_defs();
        // The built-in tables only reference items they declare.
        Self::from_defs(&items, &recipes, &fuels).unwrap_or_default()
    }
}

/// Item, recipe and fuel definitions of [`RecipeBook::standard`].
pub fn standard_defs() -> (Vec<ItemDef>, Vec<RecipeDef>, Vec<FuelDef>) {
    let item = |name: &str| ItemDef {
        name: name.to_string(),
        max_stack: DEFAULT_MAX_STACK,
        has_subtypes: false,
        container: None,
    };
    let items = vec![
        item("iron_ore"),
        item("iron_ingot"),
        item("gold_ore"),
        item("gold_ingot"),
        item("sand"),
        item("glass"),
        item("cobblestone"),
        item("stone"),
        item("raw_beef"),
        item("cooked_beef"),
        item("cactus"),
        ItemDef {
            has_subtypes: true,
            ..item("dye")
        },
        item("coal"),
        item("oak_log"),
        item("oak_planks"),
        item("stick"),
        ItemDef {
            max_stack: 16,
            ..item("bucket")
        },
        ItemDef {
            max_stack: 1,
            container: Some("bucket".to_string()),
            ..item("lava_bucket")
        },
        ItemDef {
            max_stack: 1,
            ..item("iron_sword")
        },
    ];

    let recipe = |input: &str, output: &str| RecipeDef {
        input: input.to_string(),
        input_variant: None,
        output: output.to_string(),
        output_variant: 0,
        count: 1,
    };
    let recipes = vec![
        recipe("iron_ore", "iron_ingot"),
        recipe("gold_ore", "gold_ingot"),
        recipe("sand", "glass"),
        recipe("cobblestone", "stone"),
        recipe("raw_beef", "cooked_beef"),
        recipe("oak_log", "coal"),
        RecipeDef {
            output_variant: 2,
            ..recipe("cactus", "dye")
        },
    ];

    let fuel = |name: &str, ticks: u32| FuelDef {
        item: name.to_string(),
        ticks,
    };
    let fuels = vec![
        fuel("coal", 1600),
        fuel("oak_log", 300),
        fuel("oak_planks", 300),
        fuel("stick", 100),
        fuel("lava_bucket", 20000),
    ];

    (items, recipes, fuels)
}

impl SmeltingRules for RecipeBook {
    fn smelting_result(&self, input: &ItemStack) -> Option<ItemStack> {
        if input.is_empty() {
            return None;
        }
        self.recipes
            .iter()
            .find(|r| r.input == input.item && r.input_variant.map_or(true, |v| v == input.variant))
            .map(|r| r.output.clone())
    }

    fn burn_duration(&self, fuel: &ItemStack) -> u32 {
        if fuel.is_empty() {
            return 0;
        }
        self.fuels.get(&fuel.item).copied().unwrap_or(0)
    }

    fn max_stack_size(&self, stack: &ItemStack) -> u32 {
        self.catalog.max_stack_size(stack)
    }

    fn has_subtypes(&self, stack: &ItemStack) -> bool {
        self.catalog.has_subtypes(stack)
    }

    fn container_item(&self, stack: &ItemStack) -> ItemStack {
        self.catalog.container_item(stack)
    }
}
