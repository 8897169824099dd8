//! Parser for Fritzing part description (`.fzp`) files

use super::{child, descend, svg::extract_body};
use anyhow::{Context, Result};
use log::debug;
use roxmltree::{Document, Node};
use sch_model::{Body, Component, Symbol};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Parse a part description into a reusable [`Component`].
///
/// The component gets the part's label as its `_prefix` attribute and one
/// symbol with one body, extracted from the companion svg document. A part
/// whose svg cannot be located still parses — its body is just empty. An
/// unreadable or malformed `.fzp` (or svg) is an error; callers skip the
/// affected placements and continue.
pub fn parse_part(module_id: &str, path: &Path) -> Result<Component> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read part file: {}", path.display()))?;
    let doc = Document::parse(&content)
        .with_context(|| format!("Failed to parse part XML: {}", path.display()))?;
    let root = doc.root_element();

    let mut component = Component::new(module_id);
    if let Some(label) = child(&root, "label").and_then(|n| n.text()) {
        component.add_attribute("_prefix", label);
    }

    let terminals = parse_terminals(&root);

    let body = match svg_path(&root, path) {
        Some(svg) if svg.exists() => {
            let svg_text = fs::read_to_string(&svg)
                .with_context(|| format!("Failed to read symbol svg: {}", svg.display()))?;
            extract_body(&svg_text, &terminals)
                .with_context(|| format!("Failed to parse symbol svg: {}", svg.display()))?
        }
        _ => {
            debug!("part {module_id} has no symbol svg");
            Body::new()
        }
    };

    let mut symbol = Symbol::new();
    symbol.add_body(body);
    component.add_symbol(symbol);

    Ok(component)
}

/// Map svg graphic-element ids to connector ids.
///
/// Each connector contributes its schematic-view plug, keyed by the plug's
/// terminal id (falling back to its svg id). Connectors without a
/// schematic plug have no terminal and are omitted.
fn parse_terminals(root: &Node) -> HashMap<String, String> {
    let mut terminals = HashMap::new();

    if let Some(connectors) = child(root, "connectors") {
        for connector in connectors.children().filter(|n| n.is_element()) {
            if connector.tag_name().name() != "connector" {
                continue;
            }
            let Some(plug) = descend(&connector, &["views", "schematicView", "p"]) else {
                continue;
            };

            let terminal = plug.attribute("terminalId").or_else(|| plug.attribute("svgId"));
            if let (Some(terminal), Some(id)) = (terminal, connector.attribute("id")) {
                terminals.insert(terminal.to_string(), id.to_string());
            }
        }
    }

    terminals
}

/// Derive the companion svg path: `<parts-root>/svg/<part-subdir>/<image>`,
/// with the image filename taken from the schematic view's layers block.
fn svg_path(root: &Node, fzp_path: &Path) -> Option<PathBuf> {
    let layers = descend(root, &["views", "schematicView", "layers"])?;
    let image = layers.attribute("image")?;

    let fzp_dir = fzp_path.parent()?;
    let parts_dir = fzp_dir.parent()?;
    let leaf = fzp_dir.file_name()?;

    Some(parts_dir.join("svg").join(leaf).join(image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sch_model::Shape;
    use tempfile::TempDir;

    const FZP: &str = r#"<?xml version="1.0"?>
<module fritzingVersion="0.9.3b" moduleId="ResistorModuleID">
  <label>R</label>
  <views>
    <schematicView>
      <layers image="schematic/resistor.svg"/>
    </schematicView>
  </views>
  <connectors>
    <connector id="connector0" name="leg1">
      <views>
        <schematicView>
          <p svgId="pin0" terminalId="terminal0" layer="schematic"/>
        </schematicView>
      </views>
    </connector>
    <connector id="connector1" name="leg2">
      <views>
        <schematicView>
          <p svgId="pin1" layer="schematic"/>
        </schematicView>
      </views>
    </connector>
    <connector id="connector2" name="unplugged"/>
  </connectors>
</module>
"#;

    const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg">
  <rect id="terminal0" x="0" y="10" width="4" height="6"/>
  <line x1="4" y1="13" x2="16" y2="13"/>
  <circle id="pin1" cx="20" cy="13" r="2"/>
</svg>
"#;

    /// parts/core/resistor.fzp plus parts/svg/core/schematic/resistor.svg
    fn write_part(dir: &Path) -> PathBuf {
        let fzp_dir = dir.join("parts").join("core");
        let svg_dir = dir.join("parts").join("svg").join("core").join("schematic");
        fs::create_dir_all(&fzp_dir).unwrap();
        fs::create_dir_all(&svg_dir).unwrap();

        let fzp = fzp_dir.join("resistor.fzp");
        fs::write(&fzp, FZP).unwrap();
        fs::write(svg_dir.join("resistor.svg"), SVG).unwrap();
        fzp
    }

    #[test]
    fn test_parse_part() {
        let dir = TempDir::new().unwrap();
        let fzp = write_part(dir.path());

        let component = parse_part("ResistorModuleID", &fzp).unwrap();

        assert_eq!(component.name, "ResistorModuleID");
        assert_eq!(component.attributes["_prefix"], "R");
        assert_eq!(component.symbols.len(), 1);

        let body = &component.symbols[0].bodies[0];
        assert_eq!(body.shapes.len(), 3);
        assert!(matches!(body.shapes[0], Shape::Rectangle { .. }));
        assert!(matches!(body.shapes[1], Shape::Line { .. }));

        // terminal0 by terminalId, pin1 by svgId fallback; the line has no id.
        assert_eq!(body.pins.len(), 2);
        assert_eq!(body.pins[0].number, "0");
        assert_eq!(body.pins[1].number, "1");
    }

    #[test]
    fn test_missing_svg_gives_empty_body() {
        let dir = TempDir::new().unwrap();
        let fzp_dir = dir.path().join("parts").join("core");
        fs::create_dir_all(&fzp_dir).unwrap();
        let fzp = fzp_dir.join("resistor.fzp");
        fs::write(&fzp, FZP).unwrap();

        let component = parse_part("ResistorModuleID", &fzp).unwrap();

        assert_eq!(component.attributes["_prefix"], "R");
        let body = &component.symbols[0].bodies[0];
        assert!(body.shapes.is_empty());
        assert!(body.pins.is_empty());
    }

    #[test]
    fn test_terminal_map_fallback_and_omission() {
        let doc = Document::parse(FZP).unwrap();
        let terminals = parse_terminals(&doc.root_element());

        assert_eq!(terminals.len(), 2);
        assert_eq!(terminals["terminal0"], "connector0");
        assert_eq!(terminals["pin1"], "connector1");
        assert!(!terminals.values().any(|v| v == "connector2"));
    }

    #[test]
    fn test_unreadable_part_is_an_error() {
        let dir = TempDir::new().unwrap();

        assert!(parse_part("X", &dir.path().join("nope.fzp")).is_err());

        let bad = dir.path().join("bad.fzp");
        fs::write(&bad, "<module").unwrap();
        assert!(parse_part("X", &bad).is_err());
    }
}
