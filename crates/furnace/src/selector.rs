//! Choice of which input to smelt next and where its result goes.
//!
//! Inputs are consumed sequentially: input slot `n + 1` is only considered
//! once every earlier slot is empty, unsmeltable, or has no room for its result.

use crate::layout::{FurnaceTuning, VariantPolicy};
use crate::rules::SmeltingRules;
use crate::slots::SlotArray;
use smeltery_core::ItemStack;
use tracing::debug;

/// A smelt the selector found possible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmeltPlan {
    /// Absolute slot index of the consumed input.
    pub input_slot: usize,
    /// Absolute slot index receiving the result.
    pub output_slot: usize,
    /// Stack added to the output slot.
    pub result: ItemStack,
}

/// Input/output scanning rules for one appliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmeltSelector {
    stack_limit: u32,
    policy: VariantPolicy,
}

impl SmeltSelector {
    /// Selector using the tuning's stack limit and variant policy.
    pub fn new(tuning: &FurnaceTuning) -> Self {
        Self {
            stack_limit: tuning.stack_limit,
            policy: tuning.variant_policy,
        }
    }

    /// Find the first input whose result fits an output slot. Never mutates.
    pub fn plan<R: SmeltingRules + ?Sized>(&self, slots: &SlotArray, rules: &R) -> Option<SmeltPlan> {
        let layout = slots.layout();
        for input_slot in layout.input_range() {
            let Ok(input) = slots.get(input_slot) else {
                continue;
            };
            if input.is_empty() {
                continue;
            }
            let Some(result) = rules.smelting_result(input) else {
                continue;
            };
            if result.is_empty() {
                continue;
            }
            if let Some(output_slot) = self.find_output(slots, &result, rules) {
                return Some(SmeltPlan {
                    input_slot,
                    output_slot,
                    result,
                });
            }
        }
        None
    }

    fn find_output<R: SmeltingRules + ?Sized>(
        &self,
        slots: &SlotArray,
        result: &ItemStack,
        rules: &R,
    ) -> Option<usize> {
        let compare_variant = match self.policy {
            VariantPolicy::Exact => rules.has_subtypes(result),
            VariantPolicy::IgnoreVariant => false,
        };
        slots.layout().output_range().find(|&slot| {
            let Ok(existing) = slots.get(slot) else {
                return false;
            };
            if existing.is_empty() {
                return true;
            }
            if !existing.is_same_item(result, compare_variant) {
                return false;
            }
            let combined = existing.count.saturating_add(result.count);
            combined <= self.stack_limit && combined <= rules.max_stack_size(existing)
        })
    }

    /// True when some input can be smelted right now.
    pub fn can_smelt<R: SmeltingRules + ?Sized>(&self, slots: &SlotArray, rules: &R) -> bool {
        self.plan(slots, rules).is_some()
    }

    /// Smelt one unit of the first eligible input, returning what was done.
    pub fn perform_smelt<R: SmeltingRules + ?Sized>(&self, slots: &mut SlotArray, rules: &R) -> Option<SmeltPlan> {
        let plan = self.plan(slots, rules)?;
        self.apply(slots, &plan);
        Some(plan)
    }

    /// Dry-run (`commit == false`) or perform (`commit == true`) a smelt.
    pub fn try_smelt<R: SmeltingRules + ?Sized>(&self, slots: &mut SlotArray, rules: &R, commit: bool) -> bool {
        if commit {
            self.perform_smelt(slots, rules).is_some()
        } else {
            self.can_smelt(slots, rules)
        }
    }

    fn apply(&self, slots: &mut SlotArray, plan: &SmeltPlan) {
        if let Ok(input) = slots.get_mut(plan.input_slot) {
            input.shrink(1);
        }
        if let Ok(output) = slots.get_mut(plan.output_slot) {
            if output.is_empty() {
                *output = plan.result.clone();
            } else {
                output.grow(plan.result.count);
            }
        }
        debug!(
            input_slot = plan.input_slot,
            output_slot = plan.output_slot,
            result = %plan.result,
            "smelt committed"
        );
    }
}
