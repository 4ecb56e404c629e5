//! Render flat JSON records as an HTML table.
//!
//! Records come from an HTTP endpoint, a JSON file or a DuckDB query. A [`page::Page`]
//! wires trigger controls to fetches; [`render::TableRenderer`] turns each result into a
//! header row and one row per record inside a [`document::Document`].

pub mod config;
pub mod crafter;
pub mod document;
pub mod error;
pub mod fetch;
pub mod interface;
pub mod markup;
pub mod page;
pub mod render;
pub mod source;
