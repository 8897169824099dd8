//! Coordinate and rotation translation
//!
//! Fritzing documents use floating-point pixel coordinates with the y axis
//! growing downward. The design model uses integer units with y growing
//! upward, so vertical coordinates are rounded and negated; horizontal
//! coordinates and lengths are only rounded.

use roxmltree::Node;

/// Convert a source x coordinate to a design x coordinate.
pub fn make_x(x: f64) -> i64 {
    x.round() as i64
}

/// Convert a source y coordinate to a design y coordinate (axis flip).
pub fn make_y(y: f64) -> i64 {
    -(y.round() as i64)
}

/// Convert a source length to a design length.
pub fn make_length(v: f64) -> i64 {
    v.round() as i64
}

fn attr_f64(node: &Node, name: &str) -> f64 {
    node.attribute(name)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0.0)
}

/// Read an x coordinate attribute, defaulting to 0 when missing or
/// unparsable.
pub fn get_x(node: &Node, name: &str) -> i64 {
    make_x(attr_f64(node, name))
}

/// Read a y coordinate attribute, defaulting to 0 when missing or
/// unparsable.
pub fn get_y(node: &Node, name: &str) -> i64 {
    make_y(attr_f64(node, name))
}

/// Read a length attribute, defaulting to 0 when missing or unparsable.
pub fn get_length(node: &Node, name: &str) -> i64 {
    make_length(attr_f64(node, name))
}

/// Decode a placement transform matrix (m11, m12, m21, m22) into a
/// rotation in units of pi radians.
///
/// Fritzing only writes the four cardinal orientations; any other matrix
/// decodes as no rotation.
pub fn rotation_from_matrix(m: [i32; 4]) -> f64 {
    match m {
        [1, 0, 0, 1] => 0.0,
        [0, 1, -1, 0] => 0.5,
        [-1, 0, 0, -1] => 1.0,
        [0, -1, 1, 0] => 1.5,
        _ => 0.0,
    }
}
