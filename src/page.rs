//! Trigger controls and the click → fetch → render cycle.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::crafter::error_indicator;
use crate::document::{Document, NodeId};
use crate::error::PageError;
use crate::fetch::Fetcher;
use crate::markup::to_html;
use crate::render::TableRenderer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Rendered { records: usize },
    Failed(String),
}

pub struct Page {
    document: Arc<Mutex<Document>>,
    renderer: TableRenderer,
    fetcher: Arc<dyn Fetcher>,
    table: Option<NodeId>,
    pending: Vec<JoinHandle<ClickOutcome>>,
}

impl Page {
    pub fn new(renderer: TableRenderer, fetcher: Arc<dyn Fetcher>) -> Page {
        Page {
            document: Arc::new(Mutex::new(Document::new())),
            renderer,
            fetcher,
            table: None,
            pending: Vec::new(),
        }
    }

    pub fn document(&self) -> Arc<Mutex<Document>> {
        self.document.clone()
    }

    /// Renders into `table` from now on instead of looking up the first table on the page.
    pub fn set_table(&mut self, table: NodeId) {
        self.table = Some(table);
    }

    /// Adds a `button` with the given id whose `value` names the fetch target.
    pub async fn add_control(&self, id: &str, value: &str) -> Result<NodeId, PageError> {
        let mut document = self.document.lock().await;
        let button = document.create_element("button");
        document.set_attribute(button, "id", id);
        document.set_attribute(button, "value", value);
        let body = document.body();
        document.append_child(body, button)?;
        Ok(button)
    }

    pub async fn set_value(&self, id: &str, value: &str) -> Result<(), PageError> {
        let mut document = self.document.lock().await;
        let control = document
            .element_by_id(id)
            .ok_or_else(|| PageError::UnknownControl(id.to_owned()))?;
        document.set_attribute(control, "value", value);
        Ok(())
    }

    /// Starts a fetch of the control's current value and renders the result when it arrives.
    ///
    /// Clicks are not coordinated: each one runs on its own task and renders whenever its
    /// fetch completes.
    pub async fn click(&mut self, id: &str) -> Result<(), PageError> {
        let target = {
            let document = self.document.lock().await;
            let control = document
                .element_by_id(id)
                .ok_or_else(|| PageError::UnknownControl(id.to_owned()))?;
            document.attribute(control, "value").unwrap_or_default().to_owned()
        };
        info!(control = id, %target, "click");

        let document = self.document.clone();
        let fetcher = self.fetcher.clone();
        let renderer = self.renderer;
        let table = self.table;
        self.pending.push(tokio::spawn(async move {
            let fetched = fetcher.fetch(&target).await;
            let mut document = document.lock().await;
            let result = match fetched {
                Ok(records) => renderer
                    .render(&mut document, table, &records)
                    .map(|_| records.len())
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            match result {
                Ok(records) => ClickOutcome::Rendered { records },
                Err(message) => {
                    error!(%target, %message, "fetch-and-render failed");
                    let message = format!("{}: {}", target, message);
                    let indicator = error_indicator(&mut document, &message);
                    let body = document.body();
                    if let Err(e) = document.append_child(body, indicator) {
                        error!(%e, "cannot show error indicator");
                    }
                    ClickOutcome::Failed(message)
                }
            }
        }));
        Ok(())
    }

    /// Waits for every outstanding click, in click order.
    pub async fn settle(&mut self) -> Vec<ClickOutcome> {
        join_all(self.pending.drain(..))
            .await
            .into_iter()
            .map(|joined| joined.unwrap_or_else(|e| ClickOutcome::Failed(e.to_string())))
            .collect()
    }

    pub async fn html(&self) -> String {
        let document = self.document.lock().await;
        to_html(&document, document.body())
    }
}
