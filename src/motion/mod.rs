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

pub mod kinodynamic;
pub use kinodynamic::{Kinodynamic, KinodynamicPath, SteeringError};

use crate::space::Configuration;

pub use time_point::{Duration, TimePoint};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterpError {
    /// The requested time is outside the time range of the motion
    OutOfBounds,

    /// The requested interpolation does not have a unique solution
    Indeterminate,
}

pub trait Motion<Position, Velocity> {
    /// Compute the position of this motion at a specific time. If the requested
    /// time is outside the bounds of the motion, then this will return an Err.
    fn compute_position(&self, time: &TimePoint) -> Result<Position, InterpError>;

    /// Compute the velocity of this motion at a specific time. If the requested
    /// time is outside the bounds of the motion, then this will return an Err.
    fn compute_velocity(&self, time: &TimePoint) -> Result<Velocity, InterpError>;
}

/// A value that can produce its own reversal: traversing the reversed value
/// from start to finish is equivalent to traversing the original from finish
/// to start.
///
/// Roadmaps rely on this trait when inserting symmetric edge pairs; whether a
/// path type is actually reversible is a contract between the steering method
/// that produces it and the planner, so the error type is propagated rather
/// than swallowed.
pub trait Reversible: Sized {
    /// What kind of error can happen if this value has the wrong contents.
    type ReversalError;

    /// Get the reverse of this value.
    fn reversed(&self) -> Result<Self, Self::ReversalError>;
}

/// A steering method creates paths between pairs of configurations for a
/// device. Steering methods are usually where the nonholonomic or kinodynamic
/// constraints of a device are taken into account.
pub trait SteeringMethod {
    /// The type of path this steering method produces.
    type Path;

    /// What kind of error can prevent a path from being produced.
    type Error;

    /// Create a path between two configurations.
    fn compute(&self, q1: &Configuration, q2: &Configuration)
        -> Result<Self::Path, Self::Error>;
}
