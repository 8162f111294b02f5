use super::*;
use async_trait::async_trait;
use std::collections::HashMap;
use storage::{KeyValueStore, MemoryStore};

use crate::{error::ClientError, selection::SELECTION_KEY};

struct FakeSource {
    documents: Vec<Document>,
    rows: HashMap<String, Vec<RowName>>,
    fail_rows_with: Option<String>,
}

impl FakeSource {
    fn scenario() -> Self {
        let mut rows = HashMap::new();
        rows.insert("1".to_string(), names(&["r1", "r2", "r3"]));
        rows.insert("2".to_string(), names(&["r4", "r5"]));
        Self {
            documents: vec![
                Document {
                    id: DocumentId::new("1"),
                    name: "Doc A".to_string(),
                },
                Document {
                    id: DocumentId::new("2"),
                    name: "Doc B".to_string(),
                },
            ],
            rows,
            fail_rows_with: None,
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            fail_rows_with: Some(message.to_string()),
            ..Self::scenario()
        }
    }
}

#[async_trait]
impl DocumentSource for FakeSource {
    async fn list_documents(&self) -> ClientResult<Vec<Document>> {
        Ok(self.documents.clone())
    }

    async fn list_rows(&self, doc_id: &DocumentId) -> ClientResult<Vec<RowName>> {
        if let Some(message) = &self.fail_rows_with {
            return Err(ClientError::Network(message.clone()));
        }
        Ok(self.rows.get(doc_id.as_str()).cloned().unwrap_or_default())
    }
}

fn names(values: &[&str]) -> Vec<RowName> {
    values.iter().map(|v| v.to_string()).collect()
}

fn checked(view: &ModalView) -> Vec<&str> {
    view.rows
        .iter()
        .filter(|row| row.checked)
        .map(|row| row.name.as_str())
        .collect()
}

async fn controller_with(
    source: FakeSource,
    stored: Option<&str>,
) -> (SelectionController, Arc<MemoryStore>) {
    let store = Arc::new(match stored {
        Some(raw) => MemoryStore::with_entry(SELECTION_KEY, raw),
        None => MemoryStore::new(),
    });
    let selection = SelectionManager::load(store.clone()).await;
    (SelectionController::new(Arc::new(source), selection), store)
}

#[tokio::test]
async fn opening_document_with_empty_selection_selects_every_row() {
    let (mut controller, store) = controller_with(FakeSource::scenario(), None).await;

    let documents = controller.documents().await.expect("documents");
    assert_eq!(documents[0].name, "Doc A");
    assert_eq!(controller.phase(), ModalPhase::Idle);

    let view = controller
        .open_document(DocumentId::new("1"))
        .await
        .expect("open");

    assert_eq!(controller.phase(), ModalPhase::Visible);
    assert_eq!(view.rows.len(), 3);
    assert_eq!(checked(&view), vec!["r1", "r2", "r3"]);
    assert_eq!(controller.selected_values(), names(&["r1", "r2", "r3"]).as_slice());
    assert_eq!(
        store.get(SELECTION_KEY).await.expect("get").as_deref(),
        Some(r#"["r1","r2","r3"]"#)
    );
}

#[tokio::test]
async fn partial_prior_selection_is_replaced_on_open() {
    let (mut controller, _) = controller_with(FakeSource::scenario(), Some(r#"["r1"]"#)).await;
    let view = controller
        .open_document(DocumentId::new("1"))
        .await
        .expect("open");
    assert_eq!(checked(&view), vec!["r1", "r2", "r3"]);
}

#[tokio::test]
async fn select_all_on_full_selection_clears_it_without_reselecting() {
    let (mut controller, _) = controller_with(FakeSource::scenario(), None).await;
    controller
        .open_document(DocumentId::new("1"))
        .await
        .expect("open");

    let view = controller.apply(RowAction::SelectAll).await.expect("deselect");
    assert!(controller.selected_values().is_empty());
    assert!(checked(&view).is_empty());
    assert_eq!(view.rows.len(), 3);
    assert!(!view.all_selected);

    let view = controller.apply(RowAction::SelectAll).await.expect("select");
    assert_eq!(checked(&view), vec!["r1", "r2", "r3"]);
    assert!(view.all_selected);
}

#[tokio::test]
async fn toggle_updates_checkbox_state() {
    let (mut controller, _) = controller_with(FakeSource::scenario(), None).await;
    controller
        .open_document(DocumentId::new("1"))
        .await
        .expect("open");

    let view = controller
        .apply(RowAction::Toggle {
            name: "r2".to_string(),
            checked: false,
        })
        .await
        .expect("uncheck");
    assert_eq!(checked(&view), vec!["r1", "r3"]);

    let view = controller
        .apply(RowAction::Toggle {
            name: "r2".to_string(),
            checked: true,
        })
        .await
        .expect("check");
    assert_eq!(checked(&view), vec!["r1", "r2", "r3"]);
    assert_eq!(controller.selected_values(), names(&["r1", "r3", "r2"]).as_slice());
}

#[tokio::test]
async fn toggle_for_row_not_shown_is_ignored() {
    let (mut controller, _) = controller_with(FakeSource::scenario(), None).await;
    controller
        .open_document(DocumentId::new("1"))
        .await
        .expect("open");

    controller
        .apply(RowAction::Toggle {
            name: "r9".to_string(),
            checked: true,
        })
        .await
        .expect("ignored");
    assert_eq!(controller.selected_values(), names(&["r1", "r2", "r3"]).as_slice());
}

#[tokio::test]
async fn delete_removes_row_from_selection_and_modal() {
    let (mut controller, _) = controller_with(FakeSource::scenario(), None).await;
    controller
        .open_document(DocumentId::new("1"))
        .await
        .expect("open");

    let view = controller
        .apply(RowAction::Delete {
            name: "r2".to_string(),
        })
        .await
        .expect("delete");
    let shown: Vec<&str> = view.rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(shown, vec!["r1", "r3"]);
    assert_eq!(controller.selected_values(), names(&["r1", "r3"]).as_slice());

    let again = controller
        .apply(RowAction::Delete {
            name: "r2".to_string(),
        })
        .await
        .expect("delete again");
    assert_eq!(again, view);
}

#[tokio::test]
async fn selection_is_shared_across_documents() {
    let (mut controller, _) = controller_with(FakeSource::scenario(), None).await;
    controller
        .open_document(DocumentId::new("1"))
        .await
        .expect("open doc 1");

    // {r1,r2,r3} does not cover doc 2's rows, so doc 2 gets select-all.
    let view = controller
        .open_document(DocumentId::new("2"))
        .await
        .expect("open doc 2");
    assert_eq!(checked(&view), vec!["r4", "r5"]);
    assert_eq!(controller.selected_values(), names(&["r4", "r5"]).as_slice());
    assert_eq!(controller.current_document(), Some(&DocumentId::new("2")));
}

#[tokio::test]
async fn stale_row_fetch_is_discarded() {
    let (mut controller, _) = controller_with(FakeSource::scenario(), None).await;

    let first = controller.begin_load(DocumentId::new("1"));
    let second = controller.begin_load(DocumentId::new("2"));
    assert!(!controller.is_current(first));

    let fresh = controller
        .apply_rows(second, Ok(names(&["r4", "r5"])))
        .await
        .expect("fresh rows")
        .expect("fresh view");
    let stale = controller
        .apply_rows(first, Ok(names(&["r1", "r2", "r3"])))
        .await
        .expect("stale rows");

    assert!(stale.is_none());
    assert_eq!(controller.view(), fresh);
    assert_eq!(controller.rows(), names(&["r4", "r5"]).as_slice());
    assert_eq!(controller.current_document(), Some(&DocumentId::new("2")));
}

#[tokio::test]
async fn row_fetch_failure_is_returned_and_does_not_leave_modal_loading() {
    let (mut controller, _) = controller_with(FakeSource::failing("connection refused"), None).await;
    let err = controller
        .open_document(DocumentId::new("1"))
        .await
        .expect_err("must fail");
    assert!(matches!(err, ClientError::Network(_)));
    assert_eq!(controller.phase(), ModalPhase::Idle);
}

#[tokio::test]
async fn failure_after_modal_was_shown_hides_it() {
    let (mut controller, _) = controller_with(FakeSource::scenario(), None).await;
    controller
        .open_document(DocumentId::new("1"))
        .await
        .expect("open");

    let ticket = controller.begin_load(DocumentId::new("2"));
    assert_eq!(controller.phase(), ModalPhase::LoadingRows);
    let err = controller
        .apply_rows(ticket, Err(ClientError::Decode("bad body".to_string())))
        .await
        .expect_err("must fail");
    assert_eq!(err.kind(), "decode");
    assert_eq!(controller.phase(), ModalPhase::Hidden);
}

#[tokio::test]
async fn actions_are_ignored_unless_modal_is_visible() {
    let (mut controller, _) = controller_with(FakeSource::scenario(), None).await;
    controller
        .open_document(DocumentId::new("1"))
        .await
        .expect("open");
    controller.close();
    assert_eq!(controller.phase(), ModalPhase::Hidden);

    controller.apply(RowAction::SelectAll).await.expect("ignored");
    assert_eq!(controller.selected_values(), names(&["r1", "r2", "r3"]).as_slice());
}

#[tokio::test]
async fn failed_load_keeps_previous_document_and_rows_together() {
    let (mut controller, _) = controller_with(FakeSource::scenario(), None).await;
    controller
        .open_document(DocumentId::new("1"))
        .await
        .expect("open");

    let ticket = controller.begin_load(DocumentId::new("2"));
    assert_eq!(controller.current_document(), Some(&DocumentId::new("1")));
    controller
        .apply_rows(ticket, Err(ClientError::Network("timed out".to_string())))
        .await
        .expect_err("must fail");

    let view = controller.view();
    assert_eq!(view.document_id, Some(DocumentId::new("1")));
    assert_eq!(checked(&view), vec!["r1", "r2", "r3"]);
    assert_eq!(controller.rows(), names(&["r1", "r2", "r3"]).as_slice());
}

struct ReadOnlyStore;

#[async_trait]
impl KeyValueStore for ReadOnlyStore {
    async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("attempt to write a readonly database"))
    }

    async fn remove(&self, _key: &str) -> anyhow::Result<bool> {
        Err(anyhow::anyhow!("attempt to write a readonly database"))
    }
}

#[tokio::test]
async fn unwritable_store_still_shows_reconciled_rows() {
    let selection = SelectionManager::load(Arc::new(ReadOnlyStore)).await;
    let mut controller = SelectionController::new(Arc::new(FakeSource::scenario()), selection);

    let err = controller
        .open_document(DocumentId::new("1"))
        .await
        .expect_err("write must fail");
    assert!(matches!(err, ClientError::Storage(_)));

    assert_eq!(controller.phase(), ModalPhase::Visible);
    assert_eq!(controller.current_document(), Some(&DocumentId::new("1")));
    let view = controller.view();
    assert_eq!(checked(&view), vec!["r1", "r2", "r3"]);

    // Later interactions keep working in memory.
    let err = controller
        .apply(RowAction::SelectAll)
        .await
        .expect_err("write must fail");
    assert_eq!(err.kind(), "storage");
    assert!(controller.selected_values().is_empty());
}
