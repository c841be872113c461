use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use smeltery_furnace::{
    ApplianceState, FuelDef, FurnaceTuning, ItemDef, RecipeBook, RecipeDef, SlotLayout,
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/smeltery.toml";

/// Headless run configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RunConfig {
    /// Run name written into the report.
    pub name: String,
    /// Ticks to simulate.
    pub ticks: u64,
    /// Appliance file written after the run. `--save` takes precedence.
    pub save: Option<PathBuf>,
    pub layout: SlotLayout,
    pub tuning: FurnaceTuning,
    /// Item, recipe and fuel tables. Empty means the built-in set.
    pub content: ContentConfig,
    /// Slot contents before the first tick.
    pub slots: Vec<SlotFill>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentConfig {
    pub items: Vec<ItemDef>,
    pub recipes: Vec<RecipeDef>,
    pub fuels: Vec<FuelDef>,
}

impl ContentConfig {
    fn is_empty(&self) -> bool {
        self.items.is_empty() && self.recipes.is_empty() && self.fuels.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SlotFill {
    pub slot: usize,
    pub item: String,
    pub count: u32,
    #[serde(default)]
    pub variant: u16,
}

impl Default for RunConfig {
    fn default() -> Self {
        let fill = |slot: usize, item: &str, count: u32| SlotFill {
            slot,
            item: item.to_string(),
            count,
            variant: 0,
        };
        Self {
            name: "smeltery".to_string(),
            ticks: 1200,
            save: None,
            layout: SlotLayout::DEFAULT,
            tuning: FurnaceTuning::default(),
            content: ContentConfig::default(),
            slots: vec![
                fill(0, "coal", 1),
                fill(1, "stick", 4),
                fill(4, "iron_ore", 6),
                fill(5, "sand", 4),
            ],
        }
    }
}

impl RunConfig {
    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<RunConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    RunConfig::default()
                }
            },
            Err(err) => {
                if path != Path::new(DEFAULT_CONFIG_PATH) || err.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                }
                RunConfig::default()
            }
        }
    }

    /// Save configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }

    /// Recipe book for this run.
    pub fn recipe_book(&self) -> Result<RecipeBook> {
        if self.content.is_empty() {
            return Ok(RecipeBook::standard());
        }
        RecipeBook::from_defs(&self.content.items, &self.content.recipes, &self.content.fuels)
            .context("invalid content tables")
    }

    /// Fresh appliance with the configured slots filled. Unknown items and
    /// out-of-range slots are logged and skipped.
    pub fn build_state(&self, book: &RecipeBook) -> ApplianceState {
        let mut state = ApplianceState::with_config(self.layout, self.tuning);
        for fill in &self.slots {
            match book.stack(&fill.item, fill.count) {
                Ok(stack) => state.set_slot(fill.slot, stack.with_variant(fill.variant)),
                Err(err) => warn!(slot = fill.slot, item = %fill.item, %err, "skipping slot fill"),
            }
        }
        state.clear_dirty();
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smeltery_furnace::VariantPolicy;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: RunConfig = toml::from_str(
            r#"
            ticks = 50

            [tuning]
            variant_policy = "ignore_variant"

            [[slots]]
            slot = 0
            item = "lava_bucket"
            count = 1
            "#,
        )
        .unwrap();
        assert_eq!(cfg.ticks, 50);
        assert_eq!(cfg.save, None);
        assert_eq!(cfg.name, "smeltery");
        assert_eq!(cfg.layout, SlotLayout::DEFAULT);
        assert_eq!(cfg.tuning.variant_policy, VariantPolicy::IgnoreVariant);
        assert_eq!(cfg.tuning.completion_threshold, 200);
        assert_eq!(cfg.slots.len(), 1);
    }

    #[test]
    fn save_path_is_read_from_toml() {
        let cfg: RunConfig = toml::from_str(
            r#"
            ticks = 20
            save = "saves/kiln.smlt"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.save, Some(PathBuf::from("saves/kiln.smlt")));
    }

    #[test]
    fn custom_content_builds_its_own_book() {
        let cfg: RunConfig = toml::from_str(
            r#"
            [[content.items]]
            name = "clay"

            [[content.items]]
            name = "brick"

            [[content.items]]
            name = "peat"

            [[content.recipes]]
            input = "clay"
            output = "brick"

            [[content.fuels]]
            item = "peat"
            ticks = 40
            "#,
        )
        .unwrap();
        let book = cfg.recipe_book().unwrap();
        assert_eq!(book.recipe_count(), 1);
        assert!(book.stack("iron_ore", 1).is_err());
    }

    #[test]
    fn unknown_fill_items_are_skipped() {
        let cfg = RunConfig {
            slots: vec![
                SlotFill {
                    slot: 0,
                    item: "unobtainium".into(),
                    count: 1,
                    variant: 0,
                },
                SlotFill {
                    slot: 4,
                    item: "sand".into(),
                    count: 3,
                    variant: 0,
                },
            ],
            ..RunConfig::default()
        };
        let book = cfg.recipe_book().unwrap();
        let state = cfg.build_state(&book);
        assert!(state.get_slot(0).is_empty());
        assert_eq!(state.get_slot(4).count, 3);
        assert!(!state.is_dirty());
    }

    #[test]
    fn missing_or_broken_file_falls_back() {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("smeltery_config_{stamp}"));
        let path = dir.join("run.toml");
        assert_eq!(RunConfig::load_from_path(&path), RunConfig::default());

        fs::create_dir_all(&dir).unwrap();
        fs::write(&path, "ticks = [").unwrap();
        assert_eq!(RunConfig::load_from_path(&path), RunConfig::default());

        let cfg = RunConfig {
            ticks: 77,
            save: Some(dir.join("kiln.smlt")),
            ..RunConfig::default()
        };
        cfg.save_to_path(&path).unwrap();
        assert_eq!(RunConfig::load_from_path(&path), cfg);

        fs::remove_dir_all(&dir).ok();
    }
}
