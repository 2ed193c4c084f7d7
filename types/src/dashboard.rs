//! List/detail view state.
//!
//! The dashboard never patches items one at a time: [`Dashboard::begin`]
//! installs a placeholder batch and [`Dashboard::complete`] swaps in the
//! settled batch wholesale.

use crate::item::{EnrichedItem, ReferenceHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing requested yet.
    #[default]
    Empty,
    /// Placeholders are shown; the batch is in flight.
    Loading,
    /// Every item in the batch has settled.
    Ready,
}

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    phase: Phase,
    /// Handles of the current batch, kept for refresh.
    handles: Vec<ReferenceHandle>,
    items: Vec<EnrichedItem>,
    /// Selected by name so selection can survive a refresh.
    selected: Option<String>,
}

impl Dashboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list with loading placeholders for `handles`.
    pub fn begin(&mut self, handles: &[ReferenceHandle]) {
        self.handles = handles.to_vec();
        self.items = handles.iter().map(EnrichedItem::placeholder).collect();
        self.phase = Phase::Loading;
    }

    /// Put the whole current batch back into loading and return its handles.
    ///
    /// Every item is fetched again, resolved ones included.
    pub fn refresh(&mut self) -> Vec<ReferenceHandle> {
        let handles = std::mem::take(&mut self.handles);
        self.begin(&handles);
        handles
    }

    #[must_use]
    pub fn handles(&self) -> &[ReferenceHandle] {
        &self.handles
    }

    /// Swap in the settled batch.
    pub fn complete(&mut self, items: Vec<EnrichedItem>) {
        self.items = items;
        self.phase = Phase::Ready;
        if let Some(name) = &self.selected
            && !self.items.iter().any(|item| &item.name == name)
        {
            self.selected = None;
        }
    }

    /// Select an item by name. Returns false if no such item is listed.
    pub fn select(&mut self, name: &str) -> bool {
        if self.items.iter().any(|item| item.name == name) {
            self.selected = Some(name.to_string());
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    #[must_use]
    pub fn selected(&self) -> Option<&EnrichedItem> {
        let name = self.selected.as_deref()?;
        self.items.iter().find(|item| item.name == name)
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn items(&self) -> &[EnrichedItem] {
        &self.items
    }

    pub fn failed(&self) -> impl Iterator<Item = &EnrichedItem> {
        self.items.iter().filter(|item| item.is_degraded())
    }
}
