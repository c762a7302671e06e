/*
 * Copyright (C) 2023 Open Source Robotics Foundation
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

use super::node::{ComponentId, NodeId};
use std::collections::BTreeSet;

/// A maximal set of roadmap nodes that are mutually reachable along directed
/// edges, together with its directed reachability to and from the other
/// components of the roadmap.
///
/// Both reachability sets are kept transitively closed at all times, so
/// [`can_reach`][Self::can_reach] is a plain membership test. The closure is
/// maintained by the roadmap's connect and merge routines; nothing else may
/// mutate these sets.
#[derive(Debug, Clone)]
pub struct ConnectedComponent {
    id: ComponentId,
    nodes: Vec<NodeId>,
    reachable_to: BTreeSet<ComponentId>,
    reachable_from: BTreeSet<ComponentId>,
}

impl ConnectedComponent {
    pub(crate) fn new(id: ComponentId, node: NodeId) -> Self {
        Self {
            id,
            nodes: vec![node],
            reachable_to: BTreeSet::new(),
            reachable_from: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// The member nodes, in insertion order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Components reachable from this one along directed edges. Never
    /// contains this component itself: reflexive reachability is implicit.
    pub fn reachable_to(&self) -> &BTreeSet<ComponentId> {
        &self.reachable_to
    }

    /// Components from which this one is reachable along directed edges.
    pub fn reachable_from(&self) -> &BTreeSet<ComponentId> {
        &self.reachable_from
    }

    /// Whether this component can reach `other`. Reflexive, and O(1) thanks
    /// to the closure invariant.
    pub fn can_reach(&self, other: ComponentId) -> bool {
        other == self.id || self.reachable_to.contains(&other)
    }

    /// Same result as [`can_reach`][Self::can_reach], additionally filling
    /// `out` with every component lying on a directed path from this
    /// component to `other` (both endpoints included). When a new edge from
    /// `other` back to this component is about to be inserted, `out` is
    /// exactly the cycle that edge would close.
    pub fn can_reach_collecting(
        &self,
        other: &ConnectedComponent,
        out: &mut BTreeSet<ComponentId>,
    ) -> bool {
        if !self.can_reach(other.id) {
            return false;
        }

        // Downward closure of self intersected with the upward closure of
        // other.
        out.insert(self.id);
        for c in self.reachable_to.iter() {
            if *c == other.id || other.reachable_from.contains(c) {
                out.insert(*c);
            }
        }

        true
    }

    pub(crate) fn add_node(&mut self, node: NodeId) {
        self.nodes.push(node);
    }

    pub(crate) fn link_to(&mut self, other: ComponentId) {
        if other != self.id {
            self.reachable_to.insert(other);
        }
    }

    pub(crate) fn link_from(&mut self, other: ComponentId) {
        if other != self.id {
            self.reachable_from.insert(other);
        }
    }

    /// Absorb `other` into this component: its nodes are appended and its
    /// reachability is unioned in. The caller re-points the absorbed nodes
    /// and strips the merged ids out of every surviving component.
    pub(crate) fn merge(&mut self, other: ConnectedComponent) {
        self.nodes.extend(other.nodes);

        self.reachable_to.extend(other.reachable_to);
        self.reachable_from.extend(other.reachable_from);

        self.reachable_to.remove(&self.id);
        self.reachable_to.remove(&other.id);
        self.reachable_from.remove(&self.id);
        self.reachable_from.remove(&other.id);
    }

    /// Drop ids of components that no longer exist from both reachability
    /// sets.
    pub(crate) fn purge(&mut self, dead: &BTreeSet<ComponentId>) {
        for id in dead.iter() {
            self.reachable_to.remove(id);
            self.reachable_from.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(id: u64, node: usize) -> ConnectedComponent {
        ConnectedComponent::new(ComponentId(id), NodeId(node))
    }

    #[test]
    fn test_reflexive_reach() {
        let cc = component(0, 0);
        assert!(cc.can_reach(ComponentId(0)));
        assert!(!cc.can_reach(ComponentId(1)));
        assert!(cc.reachable_to().is_empty());
    }

    #[test]
    fn test_collecting_cycle_members() {
        // a -> b -> c, then ask whether c's upstream intersects a's downstream
        let mut a = component(0, 0);
        let mut b = component(1, 1);
        let mut c = component(2, 2);
        a.link_to(ComponentId(1));
        a.link_to(ComponentId(2));
        b.link_from(ComponentId(0));
        b.link_to(ComponentId(2));
        c.link_from(ComponentId(0));
        c.link_from(ComponentId(1));

        let mut cycle = BTreeSet::new();
        assert!(a.can_reach_collecting(&c, &mut cycle));
        assert_eq!(
            cycle.into_iter().collect::<Vec<_>>(),
            vec![ComponentId(0), ComponentId(1), ComponentId(2)],
        );

        let mut none = BTreeSet::new();
        assert!(!c.can_reach_collecting(&a, &mut none));
        assert!(none.is_empty());
    }

    #[test]
    fn test_merge_strips_participants() {
        let mut a = component(0, 0);
        let mut b = component(1, 1);
        a.link_to(ComponentId(1));
        b.link_from(ComponentId(0));

        a.merge(b);
        assert_eq!(a.nodes(), &[NodeId(0), NodeId(1)]);
        assert!(a.reachable_to().is_empty());
        assert!(a.reachable_from().is_empty());
    }

    #[test]
    fn test_self_link_ignored() {
        let mut a = component(0, 0);
        a.link_to(ComponentId(0));
        a.link_from(ComponentId(0));
        assert!(a.reachable_to().is_empty());
        assert!(a.reachable_from().is_empty());
    }
}
