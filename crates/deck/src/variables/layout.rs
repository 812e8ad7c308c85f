use std::collections::{HashMap, hash_map};

use tether_core::ComponentId;

use super::BlockKind;
use crate::ConfigError;

/// The ordered list of scalar variables the engine sees.
///
/// Descriptors in the deck and label lookups during evaluation are both
/// produced from this list, so position `i` in an evaluation request always
/// refers to the component at position `i` here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableLayout {
    slots: Vec<(ComponentId, BlockKind)>,
    positions: HashMap<String, usize>,
}

impl VariableLayout {
    /// Appends a component, rejecting one whose descriptor is already taken.
    pub(crate) fn push(
        &mut self,
        component: ComponentId,
        block: BlockKind,
    ) -> Result<(), ConfigError> {
        match self.positions.entry(component.to_string()) {
            hash_map::Entry::Occupied(taken) => {
                Err(ConfigError::DuplicateParameter(taken.key().clone()))
            }
            hash_map::Entry::Vacant(slot) => {
                slot.insert(self.slots.len());
                self.slots.push((component, block));
                Ok(())
            }
        }
    }

    /// Number of scalar variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the component at `position`.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&ComponentId> {
        self.slots.get(position).map(|(component, _)| component)
    }

    /// Returns the block the component at `position` was placed in.
    #[must_use]
    pub fn block(&self, position: usize) -> Option<BlockKind> {
        self.slots.get(position).map(|(_, block)| *block)
    }

    /// Resolves a descriptor back to its component.
    #[must_use]
    pub fn lookup(&self, label: &str) -> Option<&ComponentId> {
        self.position(label).and_then(|i| self.get(i))
    }

    /// Resolves a descriptor to its position.
    #[must_use]
    pub fn position(&self, label: &str) -> Option<usize> {
        self.positions.get(label).copied()
    }

    /// Iterates the components in engine order.
    pub fn components(&self) -> impl Iterator<Item = &ComponentId> {
        self.slots.iter().map(|(component, _)| component)
    }

    /// Returns the descriptors in engine order.
    #[must_use]
    pub fn descriptors(&self) -> Vec<String> {
        self.components().map(ToString::to_string).collect()
    }
}
