use handlebars::html_escape;

use crate::document::{Document, NodeId};

pub struct MarkupBuilder {
    buffer: String,
    open: Vec<String>,
}

impl Default for MarkupBuilder {
    fn default() -> Self {
        MarkupBuilder::new()
    }
}

impl MarkupBuilder {
    pub fn new() -> MarkupBuilder {
        MarkupBuilder {
            buffer: String::new(),
            open: Vec::new(),
        }
    }
    pub fn open_tag<'a>(
        &mut self,
        tag: &str,
        attributes: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> &mut MarkupBuilder {
        self.buffer.push('<');
        self.buffer.push_str(tag);
        for (name, value) in attributes {
            self.buffer.push(' ');
            self.buffer.push_str(name);
            self.buffer.push_str("=\"");
            self.buffer.push_str(&html_escape(value));
            self.buffer.push('"');
        }
        self.buffer.push('>');
        self.open.push(tag.to_owned());
        self
    }
    pub fn add_text(&mut self, text: &str) -> &mut MarkupBuilder {
        self.buffer.push_str(&html_escape(text));
        self
    }
    pub fn close_tag(&mut self) -> &mut MarkupBuilder {
        if let Some(tag) = self.open.pop() {
            self.buffer.push_str("</");
            self.buffer.push_str(&tag);
            self.buffer.push('>');
        }
        self
    }
    /// Closes whatever is still open and returns the markup.
    pub fn build(&mut self) -> String {
        while !self.open.is_empty() {
            self.close_tag();
        }
        std::mem::take(&mut self.buffer)
    }
}

fn write_node(builder: &mut MarkupBuilder, document: &Document, node: NodeId) {
    builder.open_tag(document.tag(node), document.attributes(node));
    if let Some(text) = document.text(node) {
        builder.add_text(text);
    }
    for child in document.children(node) {
        write_node(builder, document, *child);
    }
    builder.close_tag();
}

/// Serialises `node` and its subtree as HTML.
pub fn to_html(document: &Document, node: NodeId) -> String {
    let mut builder = MarkupBuilder::new();
    write_node(&mut builder, document, node);
    builder.build()
}
