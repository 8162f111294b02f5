//! Declarative description of the row modal.

use shared::domain::{DocumentId, RowName};

use crate::selection::Selection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub name: RowName,
    pub checked: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalView {
    pub document_id: Option<DocumentId>,
    pub rows: Vec<RowView>,
    pub all_selected: bool,
}

impl ModalView {
    pub fn checked_count(&self) -> usize {
        self.rows.iter().filter(|row| row.checked).count()
    }

    pub fn select_all_label(&self) -> &'static str {
        if self.all_selected {
            "Deselect all"
        } else {
            "Select all"
        }
    }
}

/// User interaction on the modal, addressed by row name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    Toggle { name: RowName, checked: bool },
    Delete { name: RowName },
    SelectAll,
}

/// Builds the modal contents from scratch: one entry per row, in row order.
pub fn render(document_id: Option<&DocumentId>, rows: &[RowName], selection: &Selection) -> ModalView {
    let rows: Vec<RowView> = rows
        .iter()
        .map(|name| RowView {
            name: name.clone(),
            checked: selection.contains(name),
        })
        .collect();
    // Mirrors the select-all rule, which compares sizes rather than members.
    let all_selected = !rows.is_empty() && selection.len() == rows.len();

    ModalView {
        document_id: document_id.cloned(),
        rows,
        all_selected,
    }
}
