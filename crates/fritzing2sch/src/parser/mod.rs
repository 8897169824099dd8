//! Parsers for Fritzing file formats

mod part;
mod sketch;
mod svg;

pub use part::parse_part;
pub use sketch::{ConnectRef, SchematicView, Sketch, SketchInstance, ViewConnector, ViewGeometry};
pub use svg::extract_body;

use roxmltree::Node;

/// First child element with the given (namespace-local) tag name.
pub(crate) fn child<'a, 'input>(node: &Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

/// Follow a chain of first-child elements by name.
pub(crate) fn descend<'a, 'input>(
    node: &Node<'a, 'input>,
    path: &[&str],
) -> Option<Node<'a, 'input>> {
    let mut current = *node;
    for name in path {
        current = child(&current, name)?;
    }
    Some(current)
}
