//! Shape and pin extraction from Fritzing symbol svg documents

use crate::mapping::{get_length, get_x, get_y, make_x, make_y};
use anyhow::{Context, Result};
use roxmltree::{Document, Node};
use sch_model::{Body, Pin, Point, Shape};
use std::collections::HashMap;

/// Extract the drawable shapes and terminal pins of a schematic symbol.
///
/// Every graphic element is visited in document order; namespace prefixes
/// on tag names are ignored. An element whose `id` is a key of
/// `terminals` additionally yields a [`Pin`] at its pad center — only
/// rectangular and circular pads terminate wires, so other shapes never
/// produce pins. Pin numbers are dense from "0" in encounter order.
pub fn extract_body(svg: &str, terminals: &HashMap<String, String>) -> Result<Body> {
    let doc = Document::parse(svg).context("Failed to parse symbol svg")?;

    let mut body = Body::new();
    let mut next_pin_number = 0u32;

    for element in doc.descendants().filter(|n| n.is_element()) {
        let shapes = match element.tag_name().name() {
            "circle" => parse_circle(&element),
            "rect" => parse_rect(&element),
            "line" => parse_line(&element),
            "polygon" => parse_polygon(&element),
            "polyline" => parse_polyline(&element),
            _ => Vec::new(),
        };

        for shape in shapes {
            let pin = derive_pin(&shape, &element, terminals, &mut next_pin_number);
            body.add_shape(shape);
            if let Some(pin) = pin {
                body.add_pin(pin);
            }
        }
    }

    Ok(body)
}

fn parse_circle(node: &Node) -> Vec<Shape> {
    vec![Shape::Circle {
        x: get_x(node, "cx"),
        y: get_y(node, "cy"),
        radius: get_length(node, "r"),
    }]
}

fn parse_rect(node: &Node) -> Vec<Shape> {
    let x = get_x(node, "x");
    let y = get_y(node, "y");
    let width = get_length(node, "width");
    let height = get_length(node, "height");

    // Source rects anchor at their top-left corner in a y-down system;
    // after the axis flip the origin moves down by the height.
    vec![Shape::Rectangle {
        x,
        y: y - height,
        width,
        height,
    }]
}

fn parse_line(node: &Node) -> Vec<Shape> {
    vec![Shape::Line {
        p1: Point {
            x: get_x(node, "x1"),
            y: get_y(node, "y1"),
        },
        p2: Point {
            x: get_x(node, "x2"),
            y: get_y(node, "y2"),
        },
    }]
}

fn parse_polygon(node: &Node) -> Vec<Shape> {
    let mut points = parse_points(node);

    if let Some(&first) = points.first() {
        // Close the path explicitly.
        points.push(first);
    }

    vec![Shape::Polygon { points }]
}

fn parse_polyline(node: &Node) -> Vec<Shape> {
    parse_points(node)
        .windows(2)
        .map(|pair| Shape::Line {
            p1: pair[0],
            p2: pair[1],
        })
        .collect()
}

/// Parse a `points` attribute: whitespace-separated "x,y" pairs.
/// Malformed tokens are skipped.
fn parse_points(node: &Node) -> Vec<Point> {
    let mut points = Vec::new();

    for token in node.attribute("points").unwrap_or("").split_whitespace() {
        let Some((x, y)) = token.split_once(',') else {
            continue;
        };
        let (Ok(x), Ok(y)) = (x.trim().parse::<f64>(), y.trim().parse::<f64>()) else {
            continue;
        };
        points.push(Point {
            x: make_x(x),
            y: make_y(y),
        });
    }

    points
}

fn derive_pin(
    shape: &Shape,
    element: &Node,
    terminals: &HashMap<String, String>,
    next_pin_number: &mut u32,
) -> Option<Pin> {
    let id = element.attribute("id")?;
    if !terminals.contains_key(id) {
        return None;
    }

    let center = match *shape {
        Shape::Rectangle {
            x,
            y,
            width,
            height,
        } => Point {
            x: x + width / 2,
            y: y + height / 2,
        },
        Shape::Circle { x, y, .. } => Point { x, y },
        _ => return None,
    };

    let number = next_pin_number.to_string();
    *next_pin_number += 1;

    Some(Pin {
        number,
        p1: center,
        p2: center,
    })
}
