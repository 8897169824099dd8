//! Connectivity resolution
//!
//! The sketch walk produces flat connection groups: each group states that
//! one connector is wired to one or more other connectors. Merging those
//! groups into maximal electrical nets is done with an explicit disjoint
//! set, so the result is independent of the order the groups were
//! collected in.

use sch_model::{Net, NetNode, NetPoint, PinRef};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// One terminal: a connector on a placed instance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TerminalId {
    /// Model index of the owning instance.
    pub instance: String,
    /// Connector id within that instance.
    pub connector: String,
}

impl TerminalId {
    pub fn new(instance: impl Into<String>, connector: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            connector: connector.into(),
        }
    }
}

impl fmt::Display for TerminalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.instance, self.connector)
    }
}

/// Disjoint set with path compression over dense ids.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new() -> Self {
        Self { parent: Vec::new() }
    }

    fn ensure(&mut self, id: usize) {
        while self.parent.len() <= id {
            let n = self.parent.len();
            self.parent.push(n);
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[rb] = ra;
        }
    }
}

/// Merge connection groups into electrical nets.
///
/// Within each group the first terminal is unioned with every other
/// member. Terminals present in `points` are wire endpoints and carry
/// their position into the net; all others are emitted as component pin
/// references. Net membership follows first-appearance order across the
/// input, which makes the output deterministic for a given record list
/// while the partition itself only depends on the record *set*.
///
/// Wire endpoints mentioned by no group are dropped unless
/// `keep_isolated_ends` is set, in which case each becomes a singleton
/// net.
pub fn resolve_nets(
    groups: &[Vec<TerminalId>],
    points: &BTreeMap<TerminalId, NetPoint>,
    keep_isolated_ends: bool,
) -> Vec<Net> {
    let mut uf = UnionFind::new();
    let mut ids: HashMap<&TerminalId, usize> = HashMap::new();
    let mut order: Vec<&TerminalId> = Vec::new();

    fn intern<'a>(
        terminal: &'a TerminalId,
        uf: &mut UnionFind,
        ids: &mut HashMap<&'a TerminalId, usize>,
        order: &mut Vec<&'a TerminalId>,
    ) -> usize {
        if let Some(&id) = ids.get(terminal) {
            return id;
        }
        let id = order.len();
        order.push(terminal);
        ids.insert(terminal, id);
        uf.ensure(id);
        id
    }

    for group in groups {
        let Some((head, rest)) = group.split_first() else {
            continue;
        };
        let head_id = intern(head, &mut uf, &mut ids, &mut order);
        for terminal in rest {
            let other = intern(terminal, &mut uf, &mut ids, &mut order);
            uf.union(head_id, other);
        }
    }

    // Group members by root, preserving first-appearance order both for
    // the members of a net and for the nets themselves.
    let mut members: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut roots: Vec<usize> = Vec::new();
    for id in 0..order.len() {
        let root = uf.find(id);
        members
            .entry(root)
            .or_insert_with(|| {
                roots.push(root);
                Vec::new()
            })
            .push(id);
    }

    let mut nets = Vec::new();
    for root in roots {
        let group = &members[&root];
        if group.len() < 2 {
            continue;
        }

        let nodes = group
            .iter()
            .map(|&id| {
                let terminal = order[id];
                match points.get(terminal) {
                    Some(point) => NetNode::WireEnd(point.clone()),
                    None => NetNode::Pin(PinRef {
                        instance: terminal.instance.clone(),
                        connector: terminal.connector.clone(),
                    }),
                }
            })
            .collect();

        nets.push(Net {
            id: order[group[0]].to_string(),
            nodes,
        });
    }

    if keep_isolated_ends {
        for (terminal, point) in points {
            if !ids.contains_key(terminal) {
                nets.push(Net {
                    id: terminal.to_string(),
                    nodes: vec![NetNode::WireEnd(point.clone())],
                });
            }
        }
    }

    nets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(instance: &str, connector: &str) -> TerminalId {
        TerminalId::new(instance, connector)
    }

    fn group(terminals: &[(&str, &str)]) -> Vec<TerminalId> {
        terminals.iter().map(|&(i, c)| t(i, c)).collect()
    }

    fn membership(nets: &[Net]) -> Vec<Vec<String>> {
        nets.iter()
            .map(|net| {
                let mut ids: Vec<String> = net
                    .nodes
                    .iter()
                    .map(|node| match node {
                        NetNode::WireEnd(p) => p.id.clone(),
                        NetNode::Pin(p) => format!("{}.{}", p.instance, p.connector),
                    })
                    .collect();
                ids.sort();
                ids
            })
            .collect()
    }

    #[test]
    fn test_chain_is_transitive() {
        let groups = vec![
            group(&[("a", "0"), ("b", "0")]),
            group(&[("b", "0"), ("c", "0")]),
        ];
        let nets = resolve_nets(&groups, &BTreeMap::new(), false);

        assert_eq!(nets.len(), 1);
        assert_eq!(nets[0].nodes.len(), 3);
        assert_eq!(nets[0].id, "a.0");
    }

    #[test]
    fn test_order_independent_partition() {
        let forward = vec![
            group(&[("a", "0"), ("b", "0")]),
            group(&[("b", "0"), ("c", "0")]),
            group(&[("x", "0"), ("y", "0")]),
        ];
        let mut backward = forward.clone();
        backward.reverse();

        let mut nets_fwd = membership(&resolve_nets(&forward, &BTreeMap::new(), false));
        let mut nets_bwd = membership(&resolve_nets(&backward, &BTreeMap::new(), false));
        nets_fwd.sort();
        nets_bwd.sort();

        assert_eq!(nets_fwd, nets_bwd);
    }

    #[test]
    fn test_duplicate_records_are_harmless() {
        let groups = vec![
            group(&[("a", "0"), ("b", "0")]),
            group(&[("a", "0"), ("b", "0")]),
            group(&[("b", "0"), ("a", "0")]),
        ];
        let nets = resolve_nets(&groups, &BTreeMap::new(), false);

        assert_eq!(nets.len(), 1);
        assert_eq!(nets[0].nodes.len(), 2);
    }

    #[test]
    fn test_partition_is_disjoint_and_total() {
        let groups = vec![
            group(&[("a", "0"), ("b", "0"), ("c", "0")]),
            group(&[("d", "0"), ("e", "0")]),
            group(&[("c", "1"), ("d", "0")]),
        ];
        let nets = resolve_nets(&groups, &BTreeMap::new(), false);

        let mut seen: Vec<String> = membership(&nets).into_iter().flatten().collect();
        let total = seen.len();
        seen.sort();
        seen.dedup();

        // Every referenced terminal lands in exactly one net.
        assert_eq!(seen.len(), total);
        assert_eq!(total, 6);
        assert_eq!(nets.len(), 2);
    }

    #[test]
    fn test_wire_ends_carry_positions() {
        let groups = vec![group(&[("1", "connector0"), ("3", "connector0")])];
        let mut points = BTreeMap::new();
        points.insert(
            t("3", "connector0"),
            NetPoint {
                id: "3.connector0".to_string(),
                x: 10,
                y: -20,
            },
        );

        let nets = resolve_nets(&groups, &points, false);

        assert_eq!(nets.len(), 1);
        assert_eq!(
            nets[0].nodes[0],
            NetNode::Pin(PinRef {
                instance: "1".to_string(),
                connector: "connector0".to_string(),
            })
        );
        assert_eq!(
            nets[0].nodes[1],
            NetNode::WireEnd(NetPoint {
                id: "3.connector0".to_string(),
                x: 10,
                y: -20,
            })
        );
    }

    #[test]
    fn test_isolated_wire_ends_policy() {
        let mut points = BTreeMap::new();
        points.insert(
            t("7", "connector1"),
            NetPoint {
                id: "7.connector1".to_string(),
                x: 0,
                y: 0,
            },
        );

        assert!(resolve_nets(&[], &points, false).is_empty());

        let kept = resolve_nets(&[], &points, true);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "7.connector1");
        assert_eq!(kept[0].nodes.len(), 1);
    }

    #[test]
    fn test_resolver_is_idempotent() {
        let groups = vec![
            group(&[("a", "0"), ("b", "0")]),
            group(&[("c", "0"), ("d", "0")]),
        ];
        let first = membership(&resolve_nets(&groups, &BTreeMap::new(), false));
        let second = membership(&resolve_nets(&groups, &BTreeMap::new(), false));

        assert_eq!(first, second);
    }
}
