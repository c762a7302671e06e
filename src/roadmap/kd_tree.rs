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

use super::node::{ComponentId, Node, NodeId};
use crate::space::{Configuration, DistanceMetric};
use float_ord::FloatOrd;

/// A bucketed k-d tree over the configurations of roadmap nodes.
///
/// The tree stores node handles only; configurations and component
/// memberships are read out of the roadmap's node arena at call time, which
/// is what lets nearest-neighbor queries restrict themselves to a single
/// connected component without any bookkeeping when components merge.
#[derive(Debug, Clone)]
pub struct KdTree {
    dimension: usize,
    bucket_size: usize,
    root: Cell,
}

#[derive(Debug, Clone)]
enum Cell {
    Leaf(Vec<NodeId>),
    Split {
        axis: usize,
        value: f64,
        left: Box<Cell>,
        right: Box<Cell>,
    },
}

impl KdTree {
    pub fn new(dimension: usize, bucket_size: usize) -> Self {
        assert!(bucket_size > 0, "k-d tree bucket size must be positive");
        Self {
            dimension,
            bucket_size,
            root: Cell::Leaf(Vec::new()),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn bucket_size(&self) -> usize {
        self.bucket_size
    }

    /// Drop every entry and every split.
    pub fn clear(&mut self) {
        self.root = Cell::Leaf(Vec::new());
    }

    /// Register a node. `nodes` is the arena of the owning roadmap; the new
    /// node is findable by any subsequent search whose component matches.
    pub fn add(&mut self, id: NodeId, nodes: &[Node]) {
        let (dimension, bucket_size) = (self.dimension, self.bucket_size);
        self.root.insert(id, nodes, dimension, bucket_size);
    }

    /// Branch-and-bound nearest-neighbor among the nodes of one connected
    /// component. Returns the closest matching node and its distance, or None
    /// when the component has no nodes in the tree.
    ///
    /// Exact-distance ties resolve to the node inserted first. When the
    /// metric cannot bound per-axis distances from below, pruning is disabled
    /// and the whole tree is scanned.
    pub fn search<M: DistanceMetric>(
        &self,
        q: &Configuration,
        component: ComponentId,
        nodes: &[Node],
        metric: &M,
    ) -> Option<(NodeId, f64)> {
        let mut best: Option<(NodeId, f64)> = None;
        let prune = metric.dominates_axis_distance();
        self.root
            .search(q, component, nodes, metric, prune, &mut best);
        best
    }
}

impl Cell {
    fn insert(&mut self, id: NodeId, nodes: &[Node], dimension: usize, bucket_size: usize) {
        match self {
            Cell::Split {
                axis, value, left, right,
            } => {
                let q = nodes[id.index()].configuration();
                if q[*axis] < *value {
                    left.insert(id, nodes, dimension, bucket_size);
                } else {
                    right.insert(id, nodes, dimension, bucket_size);
                }
            }
            Cell::Leaf(bucket) => {
                if bucket.len() < bucket_size {
                    bucket.push(id);
                    return;
                }

                let Some((axis, value)) = choose_split(bucket, nodes, dimension) else {
                    // Zero spread on every axis; splitting cannot separate
                    // anything, so the bucket is allowed to grow.
                    bucket.push(id);
                    return;
                };

                let mut left = Vec::new();
                let mut right = Vec::new();
                for member in bucket.drain(..) {
                    if nodes[member.index()].configuration()[axis] < value {
                        left.push(member);
                    } else {
                        right.push(member);
                    }
                }

                *self = Cell::Split {
                    axis,
                    value,
                    left: Box::new(Cell::Leaf(left)),
                    right: Box::new(Cell::Leaf(right)),
                };
                self.insert(id, nodes, dimension, bucket_size);
            }
        }
    }

    fn search<M: DistanceMetric>(
        &self,
        q: &Configuration,
        component: ComponentId,
        nodes: &[Node],
        metric: &M,
        prune: bool,
        best: &mut Option<(NodeId, f64)>,
    ) {
        match self {
            Cell::Leaf(bucket) => {
                for id in bucket.iter() {
                    let node = &nodes[id.index()];
                    if node.component() != component {
                        continue;
                    }

                    let d = metric.distance(q, node.configuration());
                    let better = match best {
                        None => true,
                        Some((best_id, best_d)) => {
                            d < *best_d || (d == *best_d && *id < *best_id)
                        }
                    };
                    if better {
                        *best = Some((*id, d));
                    }
                }
            }
            Cell::Split {
                axis, value, left, right,
            } => {
                let (near, far) = if q[*axis] < *value {
                    (left, right)
                } else {
                    (right, left)
                };

                near.search(q, component, nodes, metric, prune, best);

                let plane_distance = (q[*axis] - *value).abs();
                let visit_far = match best {
                    None => true,
                    Some((_, best_d)) => !prune || plane_distance < *best_d,
                };
                if visit_far {
                    far.search(q, component, nodes, metric, prune, best);
                }
            }
        }
    }
}

/// Pick the split for an overfull bucket: the axis of greatest spread (ties
/// broken by the lowest axis index) and the median coordinate along it. When
/// the median coincides with the axis minimum, the smallest strictly greater
/// coordinate is used instead so that neither child ends up empty. Returns
/// None when every axis has zero spread.
fn choose_split(bucket: &[NodeId], nodes: &[Node], dimension: usize) -> Option<(usize, f64)> {
    let mut split_axis = None;
    let mut best_spread = 0.0;
    for axis in 0..dimension {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for id in bucket.iter() {
            let v = nodes[id.index()].configuration()[axis];
            lo = lo.min(v);
            hi = hi.max(v);
        }

        let spread = hi - lo;
        if spread > best_spread {
            best_spread = spread;
            split_axis = Some(axis);
        }
    }

    let axis = split_axis?;
    let mut values: Vec<f64> = bucket
        .iter()
        .map(|id| nodes[id.index()].configuration()[axis])
        .collect();
    values.sort_unstable_by_key(|v| FloatOrd(*v));

    let median = values[values.len() / 2];
    if median > values[0] {
        Some((axis, median))
    } else {
        values.iter().find(|v| **v > median).map(|v| (axis, *v))
    }
}
