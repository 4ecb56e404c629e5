use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    crafter::{data_row, header_row},
    document::{Document, NodeId},
    error::RenderError,
    interface::Record,
};

/// What happens to rows already in the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Keep them; every render appends a header and its data rows.
    #[default]
    Accumulate,
    /// Drop them before rendering.
    Replace,
}

/// How records whose fields differ from the first record are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaPolicy {
    #[default]
    Strict,
    Lenient,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TableRenderer {
    pub mode: RenderMode,
    pub schema: SchemaPolicy,
}

fn same_fields(keys: &[String], record: &Record) -> bool {
    record.len() == keys.len() && keys.iter().all(|key| record.get(key).is_some())
}

impl TableRenderer {
    pub fn new(mode: RenderMode, schema: SchemaPolicy) -> TableRenderer {
        TableRenderer { mode, schema }
    }

    /// Renders `records` as a header row plus one row per record.
    ///
    /// The table is `target` when given, otherwise the first table in the document, otherwise
    /// a new one appended to the body. Errors leave the document untouched.
    pub fn render(
        &self,
        document: &mut Document,
        target: Option<NodeId>,
        records: &[Record],
    ) -> Result<NodeId, RenderError> {
        let first = records.first().ok_or(RenderError::EmptyInput)?;
        let keys: Vec<String> = first.keys().map(str::to_owned).collect();

        for (index, record) in records.iter().enumerate().skip(1) {
            if same_fields(&keys, record) {
                continue;
            }
            match self.schema {
                SchemaPolicy::Strict => {
                    return Err(RenderError::SchemaMismatch {
                        index,
                        expected: keys,
                        found: record.keys().map(str::to_owned).collect(),
                    })
                }
                SchemaPolicy::Lenient => {
                    let dropped: Vec<&str> = record
                        .keys()
                        .filter(|key| !keys.iter().any(|k| k.as_str() == *key))
                        .collect();
                    warn!(index, ?dropped, "record fields differ from header");
                }
            }
        }

        let table = match target {
            Some(node) if document.tag(node) != "table" => {
                return Err(RenderError::InvalidTarget(document.tag(node).to_owned()))
            }
            Some(node) => node,
            None => match document.first_by_tag("table") {
                Some(node) => node,
                None => document.create_element("table"),
            },
        };

        if self.mode == RenderMode::Replace {
            document.remove_children(table);
        }

        let header = header_row(document, &keys)?;
        document.append_child(table, header)?;
        for record in records {
            let tr = data_row(document, &keys, record)?;
            document.append_child(table, tr)?;
        }

        if !document.is_attached(table) {
            document.append_child(document.body(), table)?;
        }
        debug!(rows = records.len() + 1, columns = keys.len(), "rendered table");
        Ok(table)
    }
}
