//! Pipeline configuration
//!
//! Fixed for the lifetime of a pipeline: how many floats each vertex record
//! carries and how each of those slots is interpolated.

use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use super::types::InterpRule;
use super::MAX_FLOATS_PER_VERTEX;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Attribute slots per vertex record
    pub floats_per_vertex: usize,
    /// One rule per attribute slot; `None` until the slot is given one.
    /// Written as a plain rule list in RON.
    #[serde(with = "rule_slots")]
    pub interp_rules: Vec<Option<InterpRule>>,
}

impl PipelineConfig {
    /// Config with no rules set yet; `validate` rejects it until every slot
    /// has one
    pub fn new(floats_per_vertex: usize) -> Self {
        Self {
            floats_per_vertex,
            interp_rules: vec![None; floats_per_vertex],
        }
    }

    /// Every slot interpolated with the same rule
    pub fn uniform(floats_per_vertex: usize, rule: InterpRule) -> Self {
        Self {
            floats_per_vertex,
            interp_rules: vec![Some(rule); floats_per_vertex],
        }
    }

    /// Set the rule for one slot. Slots skipped over stay unset.
    pub fn with_rule(mut self, slot: usize, rule: InterpRule) -> Self {
        if self.interp_rules.len() <= slot {
            self.interp_rules.resize(slot + 1, None);
        }
        self.interp_rules[slot] = Some(rule);
        self
    }

    /// Set rules for slots 0, 1, ... in order
    pub fn with_rules(self, rules: &[InterpRule]) -> Self {
        rules
            .iter()
            .enumerate()
            .fold(self, |cfg, (slot, &rule)| cfg.with_rule(slot, rule))
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.floats_per_vertex == 0 {
            return Err(PipelineError::NoAttributes);
        }
        if self.floats_per_vertex > MAX_FLOATS_PER_VERTEX {
            return Err(PipelineError::too_many_attributes(self.floats_per_vertex));
        }
        if self.interp_rules.len() > self.floats_per_vertex {
            return Err(PipelineError::ExtraInterpRules {
                rules: self.interp_rules.len(),
                attributes: self.floats_per_vertex,
            });
        }
        let first_unset = self
            .interp_rules
            .iter()
            .position(Option::is_none)
            .or((self.interp_rules.len() < self.floats_per_vertex).then_some(self.interp_rules.len()));
        if let Some(slot) = first_unset {
            return Err(PipelineError::UnsetInterpRule { slot });
        }
        Ok(())
    }

    /// Validate, then return one rule per slot
    pub fn rules(&self) -> Result<Vec<InterpRule>, PipelineError> {
        self.validate()?;
        Ok(self.interp_rules.iter().flatten().copied().collect())
    }
}

/// Serde adapter: rule slots are read and written as a plain `[Flat, Smooth]`
/// list. A config with an unset slot cannot be written.
mod rule_slots {
    use serde::ser::{Error, SerializeSeq};
    use serde::{Deserialize, Deserializer, Serializer};

    use super::InterpRule;

    pub fn serialize<S: Serializer>(slots: &[Option<InterpRule>], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(slots.len()))?;
        for (slot, rule) in slots.iter().enumerate() {
            let rule = rule.ok_or_else(|| S::Error::custom(format!("no interpolation rule set for attribute slot {}", slot)))?;
            seq.serialize_element(&rule)?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Option<InterpRule>>, D::Error> {
        let rules = Vec::<InterpRule>::deserialize(deserializer)?;
        Ok(rules.into_iter().map(Some).collect())
    }
}
