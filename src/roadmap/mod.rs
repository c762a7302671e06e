/*
 * Copyright (C) 2022 Open Source Robotics Foundation
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 *
*/

pub mod node;
pub use node::{ComponentId, Edge, EdgeId, Node, NodeId};

pub mod connected_component;
pub use connected_component::ConnectedComponent;

pub mod kd_tree;
pub use kd_tree::KdTree;

use crate::{
    motion::Reversible,
    space::{Configuration, Device, DistanceMetric},
};
use float_ord::FloatOrd;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// Default number of nodes a k-d tree leaf holds before it splits.
pub const DEFAULT_BUCKET_SIZE: usize = 30;

/// A roadmap: a directed graph whose vertices are configurations and whose
/// edges carry feasible local paths between them, partitioned into connected
/// components with eagerly maintained directed reachability.
///
/// The roadmap exclusively owns its nodes, edges and components. Everything
/// handed back to the caller is a copyable index-style handle whose validity
/// matches the roadmap (or, for nodes and edges, the next [`clear`][Self::clear]).
/// The path values stored on edges are opaque to the roadmap; it only ever
/// reverses them, and only when the caller asks for a symmetric edge pair.
pub struct Roadmap<M, P> {
    metric: M,
    dimension: usize,
    nodes: Vec<Node>,
    edges: Vec<Edge<P>>,
    components: BTreeMap<ComponentId, ConnectedComponent>,
    next_component: u64,
    tree: KdTree,
    init: Option<NodeId>,
    goals: Vec<NodeId>,
}

impl<M: DistanceMetric, P> Roadmap<M, P> {
    /// Create an empty roadmap over the configuration space of `device`,
    /// measuring distances with `metric`.
    pub fn new(metric: M, device: &impl Device) -> Self {
        Self::with_bucket_size(metric, device, DEFAULT_BUCKET_SIZE)
    }

    pub fn with_bucket_size(metric: M, device: &impl Device, bucket_size: usize) -> Self {
        let dimension = device.configuration_size();
        Self {
            metric,
            dimension,
            nodes: Vec::new(),
            edges: Vec::new(),
            components: BTreeMap::new(),
            next_component: 0,
            tree: KdTree::new(dimension, bucket_size),
            init: None,
            goals: Vec::new(),
        }
    }

    /// Destroy all nodes, edges and components, reset the init and goal
    /// bookkeeping and empty the spatial index. The roadmap stays usable.
    /// Idempotent.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.components.clear();
        self.next_component = 0;
        self.tree.clear();
        self.init = None;
        self.goals.clear();
    }

    /// Insert a configuration as a new node in a fresh singleton component.
    ///
    /// If the roadmap already holds a node with exactly this configuration,
    /// that node is returned instead and nothing changes.
    pub fn add_node(&mut self, q: Configuration) -> NodeId {
        self.check_dimension(&q);
        if !self.nodes.is_empty() {
            let (nearest, _) = self
                .nearest(&q)
                .expect("a non-empty roadmap has a nearest node");
            if *self.nodes[nearest.index()].configuration() == q {
                return nearest;
            }
        }

        let id = NodeId(self.nodes.len());
        let component = self.fresh_component_id();
        self.nodes.push(Node::new(q, component));
        self.components
            .insert(component, ConnectedComponent::new(component, id));
        self.tree.add(id, &self.nodes);
        log::debug!("added node {}: {}", id, self.nodes[id.index()]);
        id
    }

    /// Insert a configuration as a new node of an existing component.
    ///
    /// If the nearest node within `component` has exactly this configuration,
    /// that node is returned instead. No new component is ever created.
    ///
    /// Panics when `component` is not currently tracked by this roadmap: that
    /// is a caller bug.
    pub fn add_node_in(&mut self, q: Configuration, component: ComponentId) -> NodeId {
        self.check_dimension(&q);
        assert!(
            self.components.contains_key(&component),
            "add_node_in: component {:?} is not in this roadmap",
            component,
        );

        let (nearest, _) = self.nearest_in(&q, component);
        if *self.nodes[nearest.index()].configuration() == q {
            return nearest;
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(q, component));
        self.components
            .get_mut(&component)
            .expect("checked above")
            .add_node(id);
        self.tree.add(id, &self.nodes);
        log::debug!("added node {}: {}", id, self.nodes[id.index()]);
        id
    }

    /// Append one directed edge and update component reachability, merging
    /// components when the edge closes a directed cycle.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, path: P) -> EdgeId {
        let cc1 = self.nodes[from.index()].component();
        let cc2 = self.nodes[to.index()].component();

        let id = EdgeId(self.edges.len());
        self.edges.push(Edge::new(from, to, path));
        self.nodes[from.index()].add_out_edge(id);
        self.nodes[to.index()].add_in_edge(id);
        log::debug!("added edge {} -> {}", from, to);

        self.connect(cc1, cc2);
        id
    }

    /// Append a symmetric pair of edges: `from -> to` carrying `path`, and
    /// `to -> from` carrying its reversal.
    ///
    /// The reversal is computed before anything is inserted, so a failed
    /// reversal leaves the roadmap untouched.
    pub fn add_edges(
        &mut self,
        from: NodeId,
        to: NodeId,
        path: P,
    ) -> Result<(EdgeId, EdgeId), P::ReversalError>
    where
        P: Reversible,
    {
        let reverse = path.reversed()?;
        let forward_edge = self.add_edge(from, to, path);
        let reverse_edge = self.add_edge(to, from, reverse);
        Ok((forward_edge, reverse_edge))
    }

    /// Insert `to` into the component of `from` and connect the two nodes
    /// with a symmetric edge pair. Returns the node holding `to`.
    pub fn add_node_and_edges(
        &mut self,
        from: NodeId,
        to: Configuration,
        path: P,
    ) -> Result<NodeId, P::ReversalError>
    where
        P: Reversible,
    {
        let reverse = path.reversed()?;
        let node = self.add_node_in(to, self.nodes[from.index()].component());
        self.add_edge(from, node, path);
        self.add_edge(node, from, reverse);
        Ok(node)
    }

    /// The node closest to `q` across the whole roadmap, or None when the
    /// roadmap is empty.
    ///
    /// This is the minimum over one restricted k-d search per component. The
    /// planner asks for within-component neighbors far more often than global
    /// ones, so the tree is tuned for the former and the global query pays
    /// one traversal per component; the component count shrinks toward one as
    /// the roadmap connects.
    pub fn nearest(&self, q: &Configuration) -> Option<(NodeId, f64)> {
        self.check_dimension(q);
        self.components
            .keys()
            .filter_map(|cc| self.tree.search(q, *cc, &self.nodes, &self.metric))
            .min_by_key(|(id, d)| (FloatOrd(*d), *id))
    }

    /// The node of `component` closest to `q`.
    ///
    /// Panics when `component` is not in this roadmap: that is a caller bug.
    pub fn nearest_in(&self, q: &Configuration, component: ComponentId) -> (NodeId, f64) {
        self.check_dimension(q);
        assert!(
            self.components.contains_key(&component),
            "nearest_in: component {:?} is not in this roadmap",
            component,
        );
        self.tree
            .search(q, component, &self.nodes, &self.metric)
            .expect("components in the roadmap are never empty")
    }

    pub fn init(&self) -> Option<NodeId> {
        self.init
    }

    pub fn set_init(&mut self, node: NodeId) {
        self.init = Some(node);
    }

    pub fn goal_nodes(&self) -> &[NodeId] {
        &self.goals
    }

    /// Insert `q` (deduplicating like [`add_node`][Self::add_node]) and
    /// append the resulting node to the goal list.
    pub fn add_goal(&mut self, q: Configuration) -> NodeId {
        let node = self.add_node(q);
        self.goals.push(node);
        node
    }

    /// Whether some goal node is reachable from the init node.
    ///
    /// Panics when no init node has been set: that is a caller bug.
    pub fn path_exists(&self) -> bool {
        let init = self.init.expect("path_exists: no init node has been set");
        let component = self
            .components
            .get(&self.nodes[init.index()].component())
            .expect("node back-references always name a live component");
        self.goals
            .iter()
            .any(|goal| component.can_reach(self.nodes[goal.index()].component()))
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edge(&self, id: EdgeId) -> &Edge<P> {
        &self.edges[id.index()]
    }

    pub fn edges(&self) -> &[Edge<P>] {
        &self.edges
    }

    pub fn component(&self, id: ComponentId) -> Option<&ConnectedComponent> {
        self.components.get(&id)
    }

    pub fn components(&self) -> impl Iterator<Item = &ConnectedComponent> {
        self.components.values()
    }

    /// Record that `cc1` gained an edge into `cc2`.
    ///
    /// Nothing happens when `cc1` could already reach `cc2`. When `cc2` could
    /// already reach `cc1` the new edge closes a directed cycle and every
    /// component on it collapses into `cc1`. Otherwise the link is recorded
    /// and the reachability closure is extended: every ancestor of `cc1`
    /// gains every descendant of `cc2` and vice versa.
    fn connect(&mut self, cc1: ComponentId, cc2: ComponentId) {
        if self.components[&cc1].can_reach(cc2) {
            return;
        }

        let mut cycle = BTreeSet::new();
        if self.components[&cc2].can_reach_collecting(&self.components[&cc1], &mut cycle) {
            self.merge(cc1, &cycle);
            return;
        }

        let mut ancestors = self.components[&cc1].reachable_from().clone();
        ancestors.insert(cc1);
        let mut descendants = self.components[&cc2].reachable_to().clone();
        descendants.insert(cc2);

        for ancestor in ancestors.iter() {
            for descendant in descendants.iter() {
                self.components
                    .get_mut(ancestor)
                    .expect("reachability sets only name live components")
                    .link_to(*descendant);
                self.components
                    .get_mut(descendant)
                    .expect("reachability sets only name live components")
                    .link_from(*ancestor);
            }
        }
    }

    /// Collapse every component of `cycle` into `root`: absorbed nodes are
    /// re-pointed at `root`, reachability sets are unioned, and the absorbed
    /// ids are stripped from every surviving component. The closure invariant
    /// guarantees any survivor that could reach (or be reached from) an
    /// absorbed component already names `root` as well, so stripping is all
    /// the rewrite that is needed.
    fn merge(&mut self, root: ComponentId, cycle: &BTreeSet<ComponentId>) {
        let mut dead = BTreeSet::new();
        for id in cycle.iter() {
            if *id == root {
                continue;
            }

            let absorbed = self
                .components
                .remove(id)
                .expect("cycle members are live components");
            for node in absorbed.nodes() {
                self.nodes[node.index()].set_component(root);
            }

            self.components
                .get_mut(&root)
                .expect("merge root is a live component")
                .merge(absorbed);
            dead.insert(*id);
        }

        for component in self.components.values_mut() {
            component.purge(&dead);
        }

        log::debug!(
            "merged {} components into {:?}; {} remain",
            dead.len(),
            root,
            self.components.len(),
        );
    }

    fn fresh_component_id(&mut self) -> ComponentId {
        let id = ComponentId(self.next_component);
        self.next_component += 1;
        id
    }

    fn check_dimension(&self, q: &Configuration) {
        assert_eq!(
            q.len(),
            self.dimension,
            "configuration dimension {} does not match the roadmap's {}",
            q.len(),
            self.dimension,
        );
    }
}

/// Line-oriented diagnostic dump: nodes in insertion order, then edges, then
/// components with their membership and reachability. Component numbering
/// follows the component map's iteration order and is not stable across runs.
impl<M, P> std::fmt::Display for Roadmap<M, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let ordinal: BTreeMap<ComponentId, usize> = self
            .components
            .keys()
            .enumerate()
            .map(|(i, id)| (*id, i))
            .collect();

        writeln!(f, "Roadmap")?;
        writeln!(f, "Nodes")?;
        for (i, node) in self.nodes.iter().enumerate() {
            writeln!(f, "Node {}: {}", i, node)?;
        }

        writeln!(f, "Edges")?;
        for edge in self.edges.iter() {
            writeln!(f, "Edge: {} -> {}", edge.from_node(), edge.to_node())?;
        }

        writeln!(f, "Connected components")?;
        for component in self.components.values() {
            writeln!(f, "Connected component {}", ordinal[&component.id()])?;
            write_id_line(f, "Nodes", component.nodes().iter().map(|n| n.index()))?;
            write_id_line(
                f,
                "Reachable to",
                component.reachable_to().iter().map(|c| ordinal[c]),
            )?;
            write_id_line(
                f,
                "Reachable from",
                component.reachable_from().iter().map(|c| ordinal[c]),
            )?;
        }

        Ok(())
    }
}

fn write_id_line(
    f: &mut std::fmt::Formatter,
    label: &str,
    ids: impl Iterator<Item = usize>,
) -> std::fmt::Result {
    write!(f, "{} :", label)?;
    let mut sep = " ";
    for id in ids {
        write!(f, "{}{}", sep, id)?;
        sep = ", ";
    }

    writeln!(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NoError;
    use crate::space::{SimpleDevice, WeightedEuclidean};
    use nalgebra::DVector;

    /// Stand-in for a steering method's output. Reversal always succeeds,
    /// like it does for the paths the planner actually stores.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Leg;

    impl Reversible for Leg {
        type ReversalError = NoError;

        fn reversed(&self) -> Result<Self, NoError> {
            Ok(Leg)
        }
    }

    fn q(x: f64, y: f64) -> Configuration {
        DVector::from_vec(vec![x, y])
    }

    fn planar_roadmap() -> Roadmap<WeightedEuclidean, Leg> {
        Roadmap::new(WeightedEuclidean::uniform(2), &SimpleDevice::new(2, 0))
    }

    /// Check the structural invariants that every sequence of legal
    /// operations must preserve: unique component membership with matching
    /// back-pointers, reachability symmetry, transitive closure, and no
    /// self-reachability.
    fn assert_consistent(roadmap: &Roadmap<WeightedEuclidean, Leg>) {
        let mut membership: BTreeMap<NodeId, ComponentId> = BTreeMap::new();
        for component in roadmap.components() {
            for node in component.nodes() {
                assert_eq!(
                    roadmap.node(*node).component(),
                    component.id(),
                    "node back-pointer disagrees with component membership",
                );
                assert!(
                    membership.insert(*node, component.id()).is_none(),
                    "node appears in more than one component",
                );
            }
        }
        assert_eq!(membership.len(), roadmap.nodes().len());

        for component in roadmap.components() {
            assert!(!component.reachable_to().contains(&component.id()));
            assert!(!component.reachable_from().contains(&component.id()));

            for to in component.reachable_to() {
                let other = roadmap.component(*to).expect("live component");
                assert!(
                    other.reachable_from().contains(&component.id()),
                    "reachability symmetry broken",
                );
                for transitive in other.reachable_to() {
                    if *transitive != component.id() {
                        assert!(
                            component.reachable_to().contains(transitive),
                            "reachable_to is not transitively closed",
                        );
                    }
                }
            }

            for from in component.reachable_from() {
                let other = roadmap.component(*from).expect("live component");
                assert!(other.reachable_to().contains(&component.id()));
            }
        }
    }

    #[test]
    fn test_duplicate_insertion() {
        let mut roadmap = planar_roadmap();
        let first = roadmap.add_node(q(0.0, 0.0));
        let second = roadmap.add_node(q(0.0, 0.0));
        assert_eq!(first, second);
        assert_eq!(roadmap.nodes().len(), 1);
        assert_eq!(roadmap.components().count(), 1);
        assert_consistent(&roadmap);
    }

    #[test]
    fn test_duplicate_insertion_within_component() {
        let mut roadmap = planar_roadmap();
        let a = roadmap.add_node(q(0.0, 0.0));
        let b = roadmap
            .add_node_and_edges(a, q(1.0, 0.0), Leg)
            .unwrap();
        let component = roadmap.node(a).component();

        let again = roadmap.add_node_in(q(1.0, 0.0), component);
        assert_eq!(again, b);
        assert_eq!(roadmap.nodes().len(), 2);

        // The same configuration in a different component is a new node.
        let c = roadmap.add_node(q(5.0, 5.0));
        let other = roadmap.node(c).component();
        let copy = roadmap.add_node_in(q(1.0, 0.0), other);
        assert_ne!(copy, b);
        assert_eq!(roadmap.node(copy).component(), other);
        assert_consistent(&roadmap);
    }

    #[test]
    fn test_two_component_merge_on_cycle() {
        let mut roadmap = planar_roadmap();
        let a = roadmap.add_node(q(0.0, 0.0));
        let b = roadmap.add_node(q(1.0, 0.0));
        let c = roadmap.add_node(q(2.0, 0.0));
        let d = roadmap.add_node(q(3.0, 0.0));

        roadmap.add_edges(a, b, Leg).unwrap();
        roadmap.add_edges(c, d, Leg).unwrap();
        assert_eq!(roadmap.components().count(), 2);
        assert_consistent(&roadmap);

        roadmap.add_edges(b, c, Leg).unwrap();
        assert_eq!(roadmap.components().count(), 1);
        let survivor = roadmap.components().next().unwrap();
        assert_eq!(survivor.nodes().len(), 4);
        assert_consistent(&roadmap);

        roadmap.set_init(a);
        roadmap.add_goal(q(3.0, 0.0));
        assert!(roadmap.path_exists());
    }

    #[test]
    fn test_directed_half_connection() {
        let mut roadmap = planar_roadmap();
        let a = roadmap.add_node(q(0.0, 0.0));
        let b = roadmap.add_node(q(1.0, 0.0));
        let c = roadmap.add_node(q(2.0, 0.0));
        let d = roadmap.add_node(q(3.0, 0.0));

        roadmap.add_edge(a, b, Leg);
        roadmap.add_edge(c, d, Leg);
        roadmap.add_edge(b, c, Leg);
        assert_eq!(roadmap.components().count(), 4);
        assert_consistent(&roadmap);

        let cc = |n: NodeId| roadmap.node(n).component();
        let cc_a = roadmap.component(cc(a)).unwrap();
        for downstream in [b, c, d] {
            assert!(cc_a.reachable_to().contains(&cc(downstream)));
        }
        let cc_d = roadmap.component(cc(d)).unwrap();
        for upstream in [a, b, c] {
            assert!(cc_d.reachable_from().contains(&cc(upstream)));
        }

        roadmap.set_init(a);
        roadmap.add_goal(q(3.0, 0.0));
        assert!(roadmap.path_exists());

        // The same wiring probed in the opposite direction.
        let mut reverse = planar_roadmap();
        let a = reverse.add_node(q(0.0, 0.0));
        let b = reverse.add_node(q(1.0, 0.0));
        let c = reverse.add_node(q(2.0, 0.0));
        let d = reverse.add_node(q(3.0, 0.0));
        reverse.add_edge(a, b, Leg);
        reverse.add_edge(c, d, Leg);
        reverse.add_edge(b, c, Leg);
        reverse.set_init(d);
        reverse.add_goal(q(0.0, 0.0));
        assert!(!reverse.path_exists());
    }

    #[test]
    fn test_nearest_in_two_cluster_roadmap() {
        let mut roadmap = planar_roadmap();
        let x0 = roadmap.add_node(q(0.0, 0.0));
        for i in 1..10 {
            let offset = 0.1 * i as f64;
            roadmap
                .add_node_and_edges(x0, q(offset, -offset), Leg)
                .unwrap();
        }
        let y0 = roadmap.add_node(q(100.0, 100.0));
        for i in 1..10 {
            let offset = 0.1 * i as f64;
            roadmap
                .add_node_and_edges(y0, q(100.0 + offset, 100.0 - offset), Leg)
                .unwrap();
        }
        assert_eq!(roadmap.nodes().len(), 20);
        assert_eq!(roadmap.components().count(), 2);
        assert_consistent(&roadmap);

        let cluster_x = roadmap.node(x0).component();
        let cluster_y = roadmap.node(y0).component();
        let probe = q(1.0, 1.0);

        let (global, global_distance) = roadmap.nearest(&probe).unwrap();
        assert_eq!(roadmap.node(global).component(), cluster_x);

        let (in_x, x_distance) = roadmap.nearest_in(&probe, cluster_x);
        assert_eq!(in_x, global);
        assert_eq!(x_distance, global_distance);

        let (in_y, y_distance) = roadmap.nearest_in(&probe, cluster_y);
        assert_eq!(roadmap.node(in_y).component(), cluster_y);
        assert!(global_distance < y_distance);
    }

    #[test]
    fn test_connectivity_after_symmetric_pair() {
        let mut roadmap = planar_roadmap();
        let a = roadmap.add_node(q(0.0, 0.0));
        let b = roadmap.add_node(q(1.0, 0.0));
        roadmap.add_edges(a, b, Leg).unwrap();

        roadmap.set_init(a);
        roadmap.add_goal(q(1.0, 0.0));
        assert!(roadmap.path_exists());
        assert_eq!(roadmap.components().count(), 1);
        assert_consistent(&roadmap);
    }

    #[test]
    fn test_edges_attach_to_endpoints() {
        let mut roadmap = planar_roadmap();
        let a = roadmap.add_node(q(0.0, 0.0));
        let b = roadmap.add_node(q(1.0, 0.0));
        let (forward, reverse) = roadmap.add_edges(a, b, Leg).unwrap();

        assert_eq!(roadmap.edge(forward).from_node(), a);
        assert_eq!(roadmap.edge(forward).to_node(), b);
        assert_eq!(roadmap.edge(reverse).from_node(), b);
        assert_eq!(roadmap.edge(reverse).to_node(), a);
        assert_eq!(roadmap.node(a).out_edges(), &[forward]);
        assert_eq!(roadmap.node(a).in_edges(), &[reverse]);
        assert_eq!(roadmap.node(b).in_edges(), &[forward]);
        assert_eq!(roadmap.node(b).out_edges(), &[reverse]);
    }

    #[test]
    fn test_clear_leaves_roadmap_usable() {
        let mut roadmap = planar_roadmap();
        let a = roadmap.add_node(q(0.0, 0.0));
        roadmap.add_node_and_edges(a, q(1.0, 0.0), Leg).unwrap();
        roadmap.set_init(a);
        roadmap.add_goal(q(1.0, 0.0));

        roadmap.clear();
        assert!(roadmap.nodes().is_empty());
        assert!(roadmap.edges().is_empty());
        assert_eq!(roadmap.components().count(), 0);
        assert!(roadmap.init().is_none());
        assert!(roadmap.goal_nodes().is_empty());
        assert!(roadmap.nearest(&q(0.0, 0.0)).is_none());

        roadmap.clear();

        let b = roadmap.add_node(q(5.0, 5.0));
        assert_eq!(roadmap.nodes().len(), 1);
        assert_eq!(roadmap.nearest(&q(0.0, 0.0)).unwrap().0, b);
        assert_consistent(&roadmap);
    }

    #[test]
    fn test_goal_in_init_component() {
        let mut roadmap = planar_roadmap();
        let a = roadmap.add_node(q(0.0, 0.0));
        roadmap.set_init(a);
        roadmap.add_goal(q(0.0, 0.0));
        assert!(roadmap.path_exists());

        roadmap.add_goal(q(9.0, 9.0));
        assert!(roadmap.path_exists());
    }

    #[test]
    fn test_dump_format() {
        let mut roadmap = planar_roadmap();
        let a = roadmap.add_node(q(0.0, 0.0));
        let b = roadmap.add_node(q(1.0, 0.0));
        roadmap.add_edge(a, b, Leg);

        let expected = "\
Roadmap
Nodes
Node 0: 0,0
Node 1: 1,0
Edges
Edge: 0 -> 1
Connected components
Connected component 0
Nodes : 0
Reachable to : 1
Reachable from :
Connected component 1
Nodes : 1
Reachable to :
Reachable from : 0
";
        assert_eq!(roadmap.to_string(), expected);
    }

    #[test]
    #[should_panic(expected = "not in this roadmap")]
    fn test_nearest_in_unknown_component_panics() {
        let mut roadmap = planar_roadmap();
        roadmap.add_node(q(0.0, 0.0));
        roadmap.nearest_in(&q(0.0, 0.0), ComponentId(99));
    }

    #[test]
    #[should_panic(expected = "no init node")]
    fn test_path_exists_without_init_panics() {
        let roadmap = planar_roadmap();
        roadmap.path_exists();
    }

    #[test]
    fn test_chain_merges_collapse_cycle() {
        // A ring of one-way edges: the last edge closes the cycle and every
        // component collapses into one.
        let mut roadmap = planar_roadmap();
        let nodes: Vec<NodeId> = (0..5)
            .map(|i| roadmap.add_node(q(i as f64, 0.0)))
            .collect();
        for pair in nodes.windows(2) {
            roadmap.add_edge(pair[0], pair[1], Leg);
        }
        assert_eq!(roadmap.components().count(), 5);
        assert_consistent(&roadmap);

        roadmap.add_edge(nodes[4], nodes[0], Leg);
        assert_eq!(roadmap.components().count(), 1);
        let survivor = roadmap.components().next().unwrap();
        assert_eq!(survivor.nodes().len(), 5);
        assert!(survivor.reachable_to().is_empty());
        assert!(survivor.reachable_from().is_empty());
        assert_consistent(&roadmap);
    }

    #[test]
    fn test_partial_cycle_merge_keeps_outsiders() {
        // x -> a -> b -> a closes a cycle between a and b only; x must stay
        // a separate component that can still reach the merged one.
        let mut roadmap = planar_roadmap();
        let x = roadmap.add_node(q(0.0, 0.0));
        let a = roadmap.add_node(q(1.0, 0.0));
        let b = roadmap.add_node(q(2.0, 0.0));
        roadmap.add_edge(x, a, Leg);
        roadmap.add_edge(a, b, Leg);
        roadmap.add_edge(b, a, Leg);

        assert_eq!(roadmap.components().count(), 2);
        assert_consistent(&roadmap);

        let merged = roadmap.node(a).component();
        assert_eq!(roadmap.node(b).component(), merged);
        let cc_x = roadmap.component(roadmap.node(x).component()).unwrap();
        assert!(cc_x.can_reach(merged));
        assert!(!roadmap.component(merged).unwrap().can_reach(cc_x.id()));
    }
}
