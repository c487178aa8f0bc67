//! The screen graph: every screen template keyed by id, plus the root.

use std::collections::HashMap;

use ussdflow_types::error::ContractViolation;
use ussdflow_types::session::ScreenId;

use super::Screen;

/// Immutable registry of screens, assembled once at startup and shared
/// read-only by every request.
#[derive(Debug)]
pub struct ScreenGraph {
    root: ScreenId,
    screens: HashMap<ScreenId, Screen>,
}

impl ScreenGraph {
    pub fn builder(root: impl Into<String>) -> ScreenGraphBuilder {
        ScreenGraphBuilder {
            root: ScreenId::new(root),
            screens: Vec::new(),
        }
    }

    /// The screen every new session starts on.
    pub fn root(&self) -> &ScreenId {
        &self.root
    }

    pub fn get(&self, id: &ScreenId) -> Result<&Screen, ContractViolation> {
        self.screens
            .get(id)
            .ok_or_else(|| ContractViolation::UnknownScreen(id.to_string()))
    }

    pub fn contains(&self, id: &ScreenId) -> bool {
        self.screens.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.screens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    /// Screen ids in sorted order.
    pub fn ids(&self) -> Vec<&ScreenId> {
        let mut ids: Vec<&ScreenId> = self.screens.keys().collect();
        ids.sort();
        ids
    }
}

/// Collects screens, then validates them as a whole in [`build`](Self::build).
pub struct ScreenGraphBuilder {
    root: ScreenId,
    screens: Vec<(ScreenId, Screen)>,
}

impl ScreenGraphBuilder {
    pub fn screen(mut self, id: impl Into<String>, screen: Screen) -> Self {
        self.screens.push((ScreenId::new(id), screen));
        self
    }

    /// Fails on duplicate ids or an unregistered root.
    pub fn build(self) -> Result<ScreenGraph, ContractViolation> {
        let mut screens = HashMap::with_capacity(self.screens.len());
        for (id, screen) in self.screens {
            if screens.contains_key(&id) {
                return Err(ContractViolation::DuplicateScreen(id.to_string()));
            }
            screens.insert(id, screen);
        }

        if !screens.contains_key(&self.root) {
            return Err(ContractViolation::MissingRoot(self.root.to_string()));
        }

        Ok(ScreenGraph {
            root: self.root,
            screens,
        })
    }
}
