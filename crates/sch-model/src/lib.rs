//! Vendor-neutral schematic design model.
//!
//! Passive, serialisable containers shared by format importers and
//! downstream exporters. A [`Design`] holds three things:
//!
//! * `components` – reusable [`Component`] definitions keyed by library id.
//! * `component_instances` – placed [`ComponentInstance`]s, in the order
//!   the importer produced them.
//! * `nets` – resolved electrical [`Net`]s.
//!
//! Geometry uses integer design units with the y axis growing upward;
//! rotations are expressed in units of pi radians.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A point in design coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

/// A drawable schematic shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Circle {
        x: i64,
        y: i64,
        radius: i64,
    },
    Line {
        p1: Point,
        p2: Point,
    },
    /// A closed path. The closing point is stored explicitly, so
    /// `points.first() == points.last()` for any non-empty polygon.
    Polygon {
        points: Vec<Point>,
    },
    Rectangle {
        x: i64,
        y: i64,
        width: i64,
        height: i64,
    },
}

/// A terminal on a component body.
///
/// `p1` and `p2` are the inner and outer attachment points. Importers for
/// source formats that do not distinguish them store the same point twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pin {
    /// Pin number, dense from "0" within one component.
    pub number: String,
    pub p1: Point,
    pub p2: Point,
}

/// Shapes and pins making up one drawable variant of a symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body {
    pub shapes: Vec<Shape>,
    pub pins: Vec<Pin>,
}

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn add_pin(&mut self, pin: Pin) {
        self.pins.push(pin);
    }
}

/// A schematic symbol, grouping one or more bodies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub bodies: Vec<Body>,
}

impl Symbol {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_body(&mut self, body: Body) {
        self.bodies.push(body);
    }
}

/// A reusable component definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Library id of this component.
    pub name: String,
    /// Declared attributes, e.g. a reference designator prefix.
    pub attributes: BTreeMap<String, String>,
    pub symbols: Vec<Symbol>,
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
            symbols: Vec::new(),
        }
    }

    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn add_symbol(&mut self, symbol: Symbol) {
        self.symbols.push(symbol);
    }
}

/// Placement of one symbol body: position plus rotation in units of pi
/// radians (0.0, 0.5, 1.0 or 1.5 for the four cardinal orientations).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolAttribute {
    pub x: i64,
    pub y: i64,
    pub rotation: f64,
}

/// One placed component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentInstance {
    /// Display identifier, usually the reference designator.
    pub instance_id: String,
    /// Key into [`Design::components`].
    pub library_id: String,
    /// Which symbol of the referenced component is placed.
    pub symbol_index: usize,
    /// One placement per body of the placed symbol.
    pub symbol_attributes: Vec<SymbolAttribute>,
}

impl ComponentInstance {
    pub fn new(
        instance_id: impl Into<String>,
        library_id: impl Into<String>,
        symbol_index: usize,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            library_id: library_id.into(),
            symbol_index,
            symbol_attributes: Vec::new(),
        }
    }

    pub fn add_symbol_attribute(&mut self, attribute: SymbolAttribute) {
        self.symbol_attributes.push(attribute);
    }
}

/// A wire endpoint with its schematic position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetPoint {
    /// Composite identifier, `"<instance index>.<connector id>"`.
    pub id: String,
    pub x: i64,
    pub y: i64,
}

/// A connector on a placed component instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinRef {
    /// Instance index within the source document.
    pub instance: String,
    /// Connector id on that instance.
    pub connector: String,
}

/// One terminal belonging to a net.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetNode {
    /// A bare wire end, carrying its position for rendering.
    WireEnd(NetPoint),
    /// A component terminal.
    Pin(PinRef),
}

/// A maximal group of electrically connected terminals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Net {
    /// Stable id, taken from the net's first terminal.
    pub id: String,
    /// Member terminals, ordered by first appearance in the source.
    pub nodes: Vec<NetNode>,
}

/// A complete translated design.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Design {
    pub components: BTreeMap<String, Component>,
    pub component_instances: Vec<ComponentInstance>,
    pub nets: Vec<Net>,
}

impl Design {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_component(&mut self, id: impl Into<String>, component: Component) {
        self.components.insert(id.into(), component);
    }

    pub fn add_component_instance(&mut self, instance: ComponentInstance) {
        self.component_instances.push(instance);
    }

    pub fn add_net(&mut self, net: Net) {
        self.nets.push(net);
    }
}
