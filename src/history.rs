//! Undo stacks of fits.
//!
//! A [`FitHistory`] belongs to one dataset. A [`HistoryBook`] keeps one
//! history per dataset, keyed by a caller-chosen identity string.

use std::collections::BTreeMap;

use crate::fit::Fit;

/// Fits recorded for one dataset, oldest first.
#[derive(Debug, Clone, Default)]
pub struct FitHistory {
    fits: Vec<Fit>,
}

impl FitHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a fit on top of the history.
    pub fn record(&mut self, fit: Fit) {
        self.fits.push(fit);
    }

    /// Drop the most recent fit and return it. Does nothing on an empty history.
    pub fn undo(&mut self) -> Option<Fit> {
        self.fits.pop()
    }

    /// Forget every fit.
    pub fn clear(&mut self) {
        self.fits.clear();
    }

    /// The most recent fit.
    pub fn last_fit(&self) -> Option<&Fit> {
        self.fits.last()
    }

    pub fn len(&self) -> usize {
        self.fits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fits.is_empty()
    }

    /// Fits in recording order.
    pub fn iter(&self) -> std::slice::Iter<'_, Fit> {
        self.fits.iter()
    }
}

impl<'a> IntoIterator for &'a FitHistory {
    type Item = &'a Fit;
    type IntoIter = std::slice::Iter<'a, Fit>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Histories keyed by dataset identity.
#[derive(Debug, Clone, Default)]
pub struct HistoryBook {
    histories: BTreeMap<String, FitHistory>,
}

impl HistoryBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// The history of `id`, if anything was ever recorded for it.
    pub fn history(&self, id: &str) -> Option<&FitHistory> {
        self.histories.get(id)
    }

    /// The history of `id`, created empty on first use.
    pub fn history_mut(&mut self, id: &str) -> &mut FitHistory {
        self.histories.entry(id.to_string()).or_default()
    }

    /// Record `fit` in the history of `id`.
    pub fn record(&mut self, id: &str, fit: Fit) {
        self.history_mut(id).record(fit);
    }

    /// Drop the history of `id`.
    pub fn remove(&mut self, id: &str) -> Option<FitHistory> {
        self.histories.remove(id)
    }

    /// Empty every history, keeping the identities.
    pub fn clear_all(&mut self) {
        for history in self.histories.values_mut() {
            history.clear();
        }
    }

    /// Dataset identities in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.histories.keys().map(String::as_str)
    }
}
