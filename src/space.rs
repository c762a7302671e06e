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

use crate::error::ThisError;
use nalgebra::DVector;

/// A point in the configuration space of a device: the device's joint values
/// followed by its extra degrees of freedom. Configurations are immutable once
/// inserted into a roadmap and are compared coordinate-wise when detecting
/// duplicate insertions.
pub type Configuration = DVector<f64>;

/// Scalar distance between two configurations.
///
/// Implementations must be symmetric and non-negative, and must return zero
/// if and only if the two configurations are coordinate-wise equal.
pub trait DistanceMetric {
    fn distance(&self, q1: &Configuration, q2: &Configuration) -> f64;

    /// Whether `|q1[i] - q2[i]| <= distance(q1, q2)` holds for every axis `i`.
    ///
    /// The k-d tree prunes subtrees by comparing the current best distance
    /// against the axis-aligned distance to a splitting hyperplane, which is
    /// only sound under this bound. Metrics that cannot guarantee it must
    /// return false here; nearest-neighbor searches then degrade to an
    /// unpruned scan of the whole tree.
    fn dominates_axis_distance(&self) -> bool {
        true
    }
}

/// Weighted Euclidean metric: `sqrt(sum((w_i * (q1_i - q2_i))^2))`.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedEuclidean {
    weights: DVector<f64>,
}

impl WeightedEuclidean {
    /// Create a metric from per-axis weights. Weights must be positive.
    pub fn new(weights: DVector<f64>) -> Result<Self, InvalidWeight> {
        for w in weights.iter() {
            if *w <= 0.0 {
                return Err(InvalidWeight(*w));
            }
        }

        Ok(Self { weights })
    }

    /// The plain Euclidean metric over a space of the given dimension.
    pub fn uniform(dimension: usize) -> Self {
        Self {
            weights: DVector::from_element(dimension, 1.0),
        }
    }

    pub fn weights(&self) -> &DVector<f64> {
        &self.weights
    }
}

impl DistanceMetric for WeightedEuclidean {
    fn distance(&self, q1: &Configuration, q2: &Configuration) -> f64 {
        let mut sum = 0.0;
        for ((a, b), w) in q1.iter().zip(q2.iter()).zip(self.weights.iter()) {
            let d = w * (a - b);
            sum += d * d;
        }

        sum.sqrt()
    }

    fn dominates_axis_distance(&self) -> bool {
        // Each per-axis term w_i * |dq_i| bounds the total from below only
        // when w_i >= 1.
        self.weights.iter().all(|w| *w >= 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, ThisError)]
#[error("distance weights must be positive, got {0}")]
pub struct InvalidWeight(pub f64);

/// The facets of a device model that the roadmap core consumes: the dimension
/// of its configuration space and the number of trailing extra degrees of
/// freedom (used by steering methods that store velocities there).
pub trait Device {
    fn configuration_size(&self) -> usize;

    fn extra_dof(&self) -> usize;
}

/// A minimal device description for callers that do not carry a full robot
/// model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimpleDevice {
    pub configuration_size: usize,
    pub extra_dof: usize,
}

impl SimpleDevice {
    pub fn new(configuration_size: usize, extra_dof: usize) -> Self {
        Self {
            configuration_size,
            extra_dof,
        }
    }
}

impl Device for SimpleDevice {
    fn configuration_size(&self) -> usize {
        self.configuration_size
    }

    fn extra_dof(&self) -> usize {
        self.extra_dof
    }
}
