//! Parser for Fritzing sketch (`.fz`) files

use super::child;
use anyhow::{Context, Result};
use roxmltree::{Document, Node};
use std::fs;
use std::path::Path;

/// Parsed Fritzing sketch
#[derive(Debug, Default)]
pub struct Sketch {
    /// Fritzing version that wrote the file
    pub version: String,
    /// Placed instances, in document order
    pub instances: Vec<SketchInstance>,
}

/// One placed element (wire or component) from the sketch
#[derive(Debug, Clone)]
pub struct SketchInstance {
    /// Model index, unique within one sketch
    pub model_index: String,
    /// Referenced module id (`"WireModuleID"` for wires)
    pub module_id_ref: String,
    /// Path to the part description file, if declared
    pub path: Option<String>,
    /// Display title, usually the reference designator
    pub title: Option<String>,
    /// Schematic view block, if the instance has one
    pub schematic_view: Option<SchematicView>,
}

/// The schematic view of one instance
#[derive(Debug, Clone)]
pub struct SchematicView {
    /// Layer the view is placed on
    pub layer: Option<String>,
    pub geometry: ViewGeometry,
    /// Connectors declared on this view, in document order
    pub connectors: Vec<ViewConnector>,
}

/// Raw placement geometry of a view
#[derive(Debug, Clone, Default)]
pub struct ViewGeometry {
    pub x: f64,
    pub y: f64,
    /// Second endpoint, used by wires
    pub x2: f64,
    pub y2: f64,
    /// Placement transform coefficients (m11, m12, m21, m22)
    pub transform: Option<[i32; 4]>,
}

/// One connector on a view, with its declared connections
#[derive(Debug, Clone)]
pub struct ViewConnector {
    pub connector_id: String,
    pub connects: Vec<ConnectRef>,
}

/// One declared adjacency to another instance's connector
#[derive(Debug, Clone)]
pub struct ConnectRef {
    pub model_index: String,
    pub connector_id: String,
    pub layer: Option<String>,
}

impl Sketch {
    /// Parse a `.fz` sketch file
    pub fn parse(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read sketch file: {}", path.display()))?;

        Self::parse_str(&content)
    }

    /// Parse a sketch from string content
    pub fn parse_str(content: &str) -> Result<Self> {
        let doc = Document::parse(content).context("Failed to parse sketch XML")?;

        let root = doc.root_element();
        if root.tag_name().name() != "module" {
            anyhow::bail!(
                "Expected module root element, found {}",
                root.tag_name().name()
            );
        }

        let mut sketch = Sketch {
            version: root.attribute("fritzingVersion").unwrap_or("0").to_string(),
            instances: Vec::new(),
        };

        if let Some(instances) = child(&root, "instances") {
            for node in instances.children().filter(|n| n.is_element()) {
                if node.tag_name().name() == "instance" {
                    sketch.instances.push(parse_instance(&node));
                }
            }
        }

        Ok(sketch)
    }
}

fn parse_instance(node: &Node) -> SketchInstance {
    let mut instance = SketchInstance {
        model_index: node.attribute("modelIndex").unwrap_or_default().to_string(),
        module_id_ref: node.attribute("moduleIdRef").unwrap_or_default().to_string(),
        path: node.attribute("path").map(str::to_string),
        title: None,
        schematic_view: None,
    };

    for item in node.children().filter(|n| n.is_element()) {
        match item.tag_name().name() {
            "title" => instance.title = item.text().map(str::to_string),
            "views" => {
                if let Some(view) = child(&item, "schematicView") {
                    instance.schematic_view = Some(parse_schematic_view(&view));
                }
            }
            _ => {}
        }
    }

    instance
}

fn parse_schematic_view(node: &Node) -> SchematicView {
    let mut view = SchematicView {
        layer: node.attribute("layer").map(str::to_string),
        geometry: ViewGeometry::default(),
        connectors: Vec::new(),
    };

    for item in node.children().filter(|n| n.is_element()) {
        match item.tag_name().name() {
            "geometry" => view.geometry = parse_geometry(&item),
            "connectors" => {
                for conn in item.children().filter(|n| n.is_element()) {
                    if conn.tag_name().name() == "connector" {
                        view.connectors.push(parse_connector(&conn));
                    }
                }
            }
            _ => {}
        }
    }

    view
}

fn parse_geometry(node: &Node) -> ViewGeometry {
    let coord = |name: &str| {
        node.attribute(name)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0.0)
    };

    let mut geometry = ViewGeometry {
        x: coord("x"),
        y: coord("y"),
        x2: coord("x2"),
        y2: coord("y2"),
        transform: None,
    };

    if let Some(transform) = child(node, "transform") {
        let coeff = |name: &str| {
            transform
                .attribute(name)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0)
        };
        geometry.transform = Some([coeff("m11"), coeff("m12"), coeff("m21"), coeff("m22")]);
    }

    geometry
}

fn parse_connector(node: &Node) -> ViewConnector {
    let mut connector = ViewConnector {
        connector_id: node
            .attribute("connectorId")
            .unwrap_or_default()
            .to_string(),
        connects: Vec::new(),
    };

    if let Some(connects) = child(node, "connects") {
        for item in connects.children().filter(|n| n.is_element()) {
            if item.tag_name().name() == "connect" {
                connector.connects.push(ConnectRef {
                    model_index: item.attribute("modelIndex").unwrap_or_default().to_string(),
                    connector_id: item
                        .attribute("connectorId")
                        .unwrap_or_default()
                        .to_string(),
                    layer: item.attribute("layer").map(str::to_string),
                });
            }
        }
    }

    connector
}
