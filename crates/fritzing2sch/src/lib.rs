//! Fritzing to design-model importer
//!
//! Converts Fritzing sketches (`.fz`) and the part descriptions they
//! reference (`.fzp` plus companion svg symbols) into a vendor-neutral
//! [`Design`].
//!
//! The import is a single synchronous walk over the sketch's placed
//! instances. Wires contribute endpoint positions and connection records;
//! component placements pull in their part description (parsed at most
//! once per module id) and contribute connection records of their own.
//! After the walk, all records are merged into electrical nets.
//!
//! Only an unreadable or malformed top-level document is fatal. Instances
//! without a schematic representation, breadboard-only placements and
//! parts that cannot be resolved are skipped, leaving the rest of the
//! design intact.

pub mod mapping;
pub mod parser;

use anyhow::Result;
use log::{debug, warn};
use mapping::{make_x, make_y, resolve_nets, rotation_from_matrix, TerminalId};
use parser::{SchematicView, Sketch, SketchInstance};
use sch_model::{Component, ComponentInstance, Design, NetPoint, SymbolAttribute};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Module id Fritzing assigns to wire instances.
const WIRE_MODULE_ID: &str = "WireModuleID";

/// Layer name marking breadboard-only placements and connections.
const BREADBOARD_LAYER: &str = "breadboardbreadboard";

/// Options controlling the import.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Materialize wire endpoints that appear in no connection record as
    /// singleton nets instead of dropping them.
    pub keep_isolated_ends: bool,
}

/// Import a Fritzing sketch with default options.
pub fn import_sketch(path: &Path) -> Result<Design> {
    import_sketch_with(path, &ImportOptions::default())
}

/// Import a Fritzing sketch into a [`Design`].
pub fn import_sketch_with(path: &Path, options: &ImportOptions) -> Result<Design> {
    let sketch = Sketch::parse(path)?;
    Ok(Importer::new(options.clone()).run(&sketch))
}

/// One import session: owns the per-parse caches and accumulators.
struct Importer {
    options: ImportOptions,
    /// Parse result per module id; `None` records a part that failed to
    /// resolve, so it is attempted only once per session.
    components: HashMap<String, Option<Component>>,
    /// Component placements, in document order.
    instances: Vec<ComponentInstance>,
    /// Wire endpoints keyed by (instance index, connector id).
    points: BTreeMap<TerminalId, NetPoint>,
    /// Groups of terminals declared connected.
    connects: Vec<Vec<TerminalId>>,
}

impl Importer {
    fn new(options: ImportOptions) -> Self {
        Self {
            options,
            components: HashMap::new(),
            instances: Vec::new(),
            points: BTreeMap::new(),
            connects: Vec::new(),
        }
    }

    fn run(mut self, sketch: &Sketch) -> Design {
        for instance in &sketch.instances {
            if instance.module_id_ref == WIRE_MODULE_ID {
                self.parse_wire(instance);
            } else {
                self.parse_component_instance(instance);
            }
        }

        let mut design = Design::new();
        for (module_id, component) in self.components {
            if let Some(component) = component {
                design.add_component(module_id, component);
            }
        }
        for instance in self.instances {
            design.add_component_instance(instance);
        }
        for net in resolve_nets(&self.connects, &self.points, self.options.keep_isolated_ends) {
            design.add_net(net);
        }

        design
    }

    /// Turn a wire instance into its two endpoint records.
    fn parse_wire(&mut self, instance: &SketchInstance) {
        let Some(view) = &instance.schematic_view else {
            debug!("wire {} has no schematic view, skipping", instance.model_index);
            return;
        };

        let geometry = &view.geometry;
        for (i, connector) in view.connectors.iter().enumerate() {
            // First connector sits at the wire origin, the second at the
            // far end.
            let (x, y) = if i == 0 {
                (geometry.x, geometry.y)
            } else {
                (geometry.x2, geometry.y2)
            };

            let terminal = TerminalId::new(&instance.model_index, &connector.connector_id);
            let point = NetPoint {
                id: terminal.to_string(),
                x: make_x(x),
                y: make_y(y),
            };
            self.points.insert(terminal, point);
        }

        self.add_connects(&instance.model_index, view);
    }

    /// Turn a non-wire instance into a component placement.
    fn parse_component_instance(&mut self, instance: &SketchInstance) {
        let Some(view) = &instance.schematic_view else {
            debug!(
                "instance {} has no schematic view, skipping",
                instance.model_index
            );
            return;
        };
        if view.layer.as_deref() == Some(BREADBOARD_LAYER) {
            debug!(
                "instance {} is breadboard-only, skipping",
                instance.model_index
            );
            return;
        }
        if self.ensure_component(instance).is_none() {
            return;
        }

        let rotation = view
            .geometry
            .transform
            .map(rotation_from_matrix)
            .unwrap_or(0.0);

        let mut placed = ComponentInstance::new(
            instance.title.clone().unwrap_or_default(),
            &instance.module_id_ref,
            0,
        );
        placed.add_symbol_attribute(SymbolAttribute {
            x: make_x(view.geometry.x),
            y: make_y(view.geometry.y),
            rotation,
        });
        self.instances.push(placed);

        self.add_connects(&instance.model_index, view);
    }

    /// Parse the component for `instance` unless its module id has been
    /// seen before. Returns `None` when the part cannot be resolved.
    fn ensure_component(&mut self, instance: &SketchInstance) -> Option<&Component> {
        if !self.components.contains_key(&instance.module_id_ref) {
            let parsed = self.resolve_part(instance);
            self.components
                .insert(instance.module_id_ref.clone(), parsed);
        }

        self.components[&instance.module_id_ref].as_ref()
    }

    fn resolve_part(&self, instance: &SketchInstance) -> Option<Component> {
        let module_id = &instance.module_id_ref;

        let Some(path) = instance.path.as_deref() else {
            warn!(
                "instance {} ({module_id}) declares no part path, skipping",
                instance.model_index
            );
            return None;
        };

        let path = Path::new(path);
        if !path.exists() {
            warn!(
                "part file {} does not exist, skipping {module_id}",
                path.display()
            );
            return None;
        }

        match parser::parse_part(module_id, path) {
            Ok(component) => Some(component),
            Err(err) => {
                warn!("failed to parse part {module_id}: {err:#}");
                None
            }
        }
    }

    /// Record one connection group per connector that declares any
    /// schematic-relevant connects.
    fn add_connects(&mut self, model_index: &str, view: &SchematicView) {
        for connector in &view.connectors {
            let mut group: Vec<TerminalId> = connector
                .connects
                .iter()
                .filter(|connect| connect.layer.as_deref() != Some(BREADBOARD_LAYER))
                .map(|connect| TerminalId::new(&connect.model_index, &connect.connector_id))
                .collect();

            if !group.is_empty() {
                group.insert(0, TerminalId::new(model_index, &connector.connector_id));
                self.connects.push(group);
            }
        }
    }
}
