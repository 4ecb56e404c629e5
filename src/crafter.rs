use crate::{
    document::{Document, NodeId},
    error::HierarchyError,
    interface::Record,
};

fn row(
    document: &mut Document,
    cell: &str,
    texts: impl IntoIterator<Item = String>,
) -> Result<NodeId, HierarchyError> {
    let tr = document.create_element("tr");
    for text in texts {
        let td = document.create_element(cell);
        document.set_text(td, text);
        document.append_child(tr, td)?;
    }
    Ok(tr)
}

pub fn header_row(document: &mut Document, keys: &[String]) -> Result<NodeId, HierarchyError> {
    row(document, "th", keys.iter().cloned())
}

/// One `td` per header key, looked up by name. Missing fields give an empty cell.
pub fn data_row(
    document: &mut Document,
    keys: &[String],
    record: &Record,
) -> Result<NodeId, HierarchyError> {
    let texts = keys
        .iter()
        .map(|key| record.get(key).map(|value| value.to_string()).unwrap_or_default());
    row(document, "td", texts)
}

pub fn error_indicator(document: &mut Document, message: &str) -> NodeId {
    let p = document.create_element("p");
    document.set_attribute(p, "class", "error");
    document.set_text(p, message);
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::to_html;

    #[test]
    fn data_row_follows_header_order() {
        let mut doc = Document::new();
        let keys = vec!["qty".to_owned(), "name".to_owned()];
        let record: Record = [("name", "Pablo"), ("qty", "3")].into_iter().collect();
        let tr = data_row(&mut doc, &keys, &record).unwrap();
        assert_eq!(to_html(&doc, tr), "<tr><td>3</td><td>Pablo</td></tr>");
    }

    #[test]
    fn missing_field_is_blank() {
        let mut doc = Document::new();
        let keys = vec!["name".to_owned(), "qty".to_owned()];
        let record: Record = [("name", "Robson")].into_iter().collect();
        let tr = data_row(&mut doc, &keys, &record).unwrap();
        assert_eq!(to_html(&doc, tr), "<tr><td>Robson</td><td></td></tr>");
    }
}
