//! Selected row values and their persisted mirror.
//!
//! The selection is a single list shared by every document: opening another
//! document reinterprets the same values against that document's rows.

use std::{collections::HashSet, sync::Arc};

use shared::domain::RowName;
use storage::KeyValueStore;

use crate::error::{ClientError, ClientResult};

/// Store key holding the JSON-encoded array of selected row names.
pub const SELECTION_KEY: &str = "selectedValues";

/// Ordered set of row names. Keeps first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    values: Vec<RowName>,
    index: HashSet<RowName>,
}

impl Selection {
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<RowName>,
    {
        let mut selection = Self::default();
        for value in values {
            selection.insert(value.into());
        }
        selection
    }

    pub fn values(&self) -> &[RowName] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, row: &str) -> bool {
        self.index.contains(row)
    }

    pub fn is_superset_of(&self, rows: &[RowName]) -> bool {
        rows.iter().all(|row| self.contains(row))
    }

    fn insert(&mut self, row: RowName) -> bool {
        if self.index.insert(row.clone()) {
            self.values.push(row);
            true
        } else {
            false
        }
    }

    fn remove(&mut self, row: &str) -> bool {
        if self.index.remove(row) {
            self.values.retain(|value| value != row);
            true
        } else {
            false
        }
    }

    fn replace(&mut self, rows: &[RowName]) {
        *self = Self::from_values(rows.iter().cloned());
    }

    fn clear(&mut self) {
        self.values.clear();
        self.index.clear();
    }
}

pub struct SelectionManager {
    store: Arc<dyn KeyValueStore>,
    selection: Selection,
}

impl SelectionManager {
    /// Reads the persisted selection. Anything other than a stored string
    /// array yields an empty selection.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let selection = match store.get(SELECTION_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<RowName>>(&raw) {
                Ok(values) => Selection::from_values(values),
                Err(err) => {
                    tracing::warn!(%err, "stored selection is not a string array; starting empty");
                    Selection::default()
                }
            },
            Ok(None) => Selection::default(),
            Err(err) => {
                tracing::warn!(err = %format!("{err:#}"), "selection store unavailable; starting empty");
                Selection::default()
            }
        };
        tracing::debug!(selected = selection.len(), "selection loaded");
        Self { store, selection }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_values(&self) -> &[RowName] {
        self.selection.values()
    }

    /// Forces select-all unless the selection already covers every row.
    /// Returns whether the selection changed.
    pub async fn reconcile(&mut self, rows: &[RowName]) -> ClientResult<bool> {
        if self.selection.is_superset_of(rows) {
            return Ok(false);
        }
        self.selection.replace(rows);
        self.persist().await?;
        Ok(true)
    }

    pub async fn toggle(&mut self, row: &str, checked: bool) -> ClientResult<()> {
        if checked {
            self.selection.insert(row.to_string());
        } else {
            self.selection.remove(row);
        }
        self.persist().await
    }

    pub async fn remove(&mut self, row: &str) -> ClientResult<()> {
        self.selection.remove(row);
        self.persist().await
    }

    /// Clears the selection when its size matches the row count, otherwise
    /// selects exactly `rows`.
    pub async fn select_all_toggle(&mut self, rows: &[RowName]) -> ClientResult<()> {
        if self.selection.len() == rows.len() {
            self.selection.clear();
        } else {
            self.selection.replace(rows);
        }
        self.persist().await
    }

    async fn persist(&self) -> ClientResult<()> {
        let encoded = serde_json::to_string(self.selection.values())?;
        self.store
            .set(SELECTION_KEY, &encoded)
            .await
            .map_err(ClientError::storage)
    }
}

#[cfg(test)]
#[path = "tests/selection_tests.rs"]
mod tests;
