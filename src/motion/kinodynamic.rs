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

use super::{InterpError, Motion, Reversible, SteeringMethod, TimePoint};
use crate::error::{NoError, ThisError};
use crate::space::{Configuration, Device};
use smallvec::SmallVec;

/// Steering method producing time-optimal bang-bang trajectories between two
/// configurations under uniform acceleration and velocity bounds.
///
/// The configuration layout follows the extra-DOF convention: a device with
/// `E` controlled axes stores positions in coordinates `0..E` and the matching
/// velocities in the extra degrees of freedom starting at coordinate `E`.
/// Construction fails when the device's extra DOFs cannot hold one velocity
/// per controlled axis, since all of the math below assumes that layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinodynamic {
    configuration_size: usize,
    axes: usize,
    a_max: f64,
    v_max: f64,
}

impl Kinodynamic {
    /// Default acceleration bound, in configuration units per second squared.
    pub const DEFAULT_ACCELERATION_LIMIT: f64 = 0.5;

    /// Default velocity bound, in configuration units per second.
    pub const DEFAULT_VELOCITY_LIMIT: f64 = 1.0;

    pub fn new(device: &impl Device, a_max: f64, v_max: f64) -> Result<Self, SteeringError> {
        let configuration_size = device.configuration_size();
        let extra_dof = device.extra_dof();
        if 2 * extra_dof < configuration_size {
            return Err(SteeringError::ExtraDofMismatch {
                controlled: configuration_size - extra_dof,
                extra_dof,
            });
        }

        if a_max <= 0.0 || v_max <= 0.0 {
            return Err(SteeringError::InvalidBounds { a_max, v_max });
        }

        Ok(Self {
            configuration_size,
            axes: configuration_size - extra_dof,
            a_max,
            v_max,
        })
    }

    pub fn with_default_bounds(device: &impl Device) -> Result<Self, SteeringError> {
        Self::new(
            device,
            Self::DEFAULT_ACCELERATION_LIMIT,
            Self::DEFAULT_VELOCITY_LIMIT,
        )
    }

    /// Number of controlled axes.
    pub fn axes(&self) -> usize {
        self.axes
    }

    pub fn acceleration_limit(&self) -> f64 {
        self.a_max
    }

    pub fn velocity_limit(&self) -> f64 {
        self.v_max
    }

    /// Minimum-time schedule for one axis from state `(p1, v1)` to `(p2, v2)`.
    ///
    /// The acceleration sign is the direction of the displacement left over
    /// after the pure brake maneuver between the two velocities. A
    /// two-segment schedule (saturated acceleration, then saturated
    /// deceleration) is used whenever its peak velocity stays within the
    /// bound; otherwise the peak is clipped at the bound and a cruise segment
    /// makes up the remaining displacement.
    pub fn min_time(
        &self,
        p1: f64,
        p2: f64,
        v1: f64,
        v2: f64,
    ) -> Result<AxisMinTime, SteeringError> {
        let dp = p2 - p1;
        let dv = v2 - v1;
        let dp_acc = 0.5 * (v1 - v2) * dv.abs() / self.a_max;

        let drive = dp - dp_acc;
        let sigma = if drive != 0.0 {
            drive.signum()
        } else if dv != 0.0 {
            // The displacement is exactly the brake displacement: the
            // schedule degenerates to the single ramp between velocities.
            dv.signum()
        } else {
            return Ok(AxisMinTime {
                total: 0.0,
                sigma: 0.0,
                t1: 0.0,
                tv: 0.0,
                t2: 0.0,
            });
        };

        let a1 = sigma * self.a_max;
        let a2 = -a1;
        let v_lim = sigma * self.v_max;

        // Lower bound on t1 for the deceleration segment to be realizable.
        let min_t1 = (dv / a2).max(0.0);

        // Two-segment candidate: a1*t1^2 + 2*v1*t1 + ((v2^2 - v1^2)/(2*a2) - dp) = 0
        let c = (v2 * v2 - v1 * v1) / (2.0 * a2) - dp;
        let delta = 4.0 * v1 * v1 - 4.0 * a1 * c;
        if delta < 0.0 {
            return Err(SteeringError::NegativeDiscriminant(delta));
        }

        let sqrt_delta = delta.sqrt();
        let candidate = f64::max(
            (-2.0 * v1 + sqrt_delta) / (2.0 * a1),
            (-2.0 * v1 - sqrt_delta) / (2.0 * a1),
        );

        let two_segment =
            candidate >= min_t1 && (v1 + a1 * candidate).abs() <= self.v_max;

        let (t1, tv, t2) = if two_segment {
            (candidate, 0.0, dv / a2 + candidate)
        } else {
            let t1 = (v_lim - v1) / a1;
            let tv =
                (v1 * v1 + v2 * v2 - 2.0 * v_lim * v_lim) / (2.0 * v_lim * a1) + dp / v_lim;
            let t2 = (v2 - v_lim) / a2;
            (t1, tv, t2)
        };

        Ok(AxisMinTime {
            total: t1 + tv + t2,
            sigma,
            t1,
            tv,
            t2,
        })
    }

    /// Schedule for one axis that spends exactly `duration` going from
    /// `(p1, v1)` to `(p2, v2)`: the acceleration magnitude is solved for
    /// instead of saturated. Used to slow every non-critical axis down to the
    /// duration of the slowest one.
    pub fn fixed_time(
        &self,
        duration: f64,
        p1: f64,
        p2: f64,
        v1: f64,
        v2: f64,
    ) -> Result<AxisProfile, SteeringError> {
        if duration <= 0.0 {
            return Ok(AxisProfile {
                p1,
                p2,
                v1,
                v2,
                a1: 0.0,
                a2: 0.0,
                t1: 0.0,
                tv: 0.0,
                t2: 0.0,
            });
        }

        let s = v1 + v2;
        let w = v2 - v1;
        let dp = p2 - p1;

        // Solve for the first-segment acceleration; a negative discriminant
        // means no schedule of this duration exists.
        let b = 2.0 * duration * s - 4.0 * dp;
        let delta = 4.0 * duration * duration * (s * s * w * w) - 16.0 * duration * s * dp
            + 16.0 * dp * dp;
        if delta < 0.0 {
            return Err(SteeringError::NegativeDiscriminant(delta));
        }

        let sqrt_delta = delta.sqrt();
        let denominator = 2.0 * duration * duration;
        let x1 = (-b - sqrt_delta) / denominator;
        let x2 = (-b + sqrt_delta) / denominator;
        let a1 = if x1.abs() > x2.abs() { x1 } else { x2 };

        if a1 == 0.0 {
            // A zero root leaves no acceleration to schedule with; hold the
            // starting velocity for the whole duration.
            return Ok(AxisProfile {
                p1,
                p2,
                v1,
                v2,
                a1: 0.0,
                a2: 0.0,
                t1: 0.0,
                tv: duration,
                t2: 0.0,
            });
        }

        let t1 = 0.5 * (w / a1 + duration);
        if (v1 + t1 * a1).abs() <= self.v_max {
            return Ok(AxisProfile {
                p1,
                p2,
                v1,
                v2,
                a1,
                a2: -a1,
                t1,
                tv: 0.0,
                t2: duration - t1,
            });
        }

        // The peak breaches the velocity bound: clip it there and solve for
        // the acceleration that still meets the duration.
        let v_lim = a1.signum() * self.v_max;
        let denominator = 2.0 * (v_lim * duration - dp);
        if denominator == 0.0 {
            return Err(SteeringError::UnreachableDuration { duration });
        }

        let a1 = ((v_lim - v1) * (v_lim - v1) + (v_lim - v2) * (v_lim - v2)) / denominator;
        let a2 = -a1;
        let t1 = (v_lim - v1) / a1;
        let tv = (v1 * v1 + v2 * v2 - 2.0 * v_lim * v_lim) / (2.0 * v_lim * a1) + dp / v_lim;
        let t2 = (v2 - v_lim) / a2;

        Ok(AxisProfile {
            p1,
            p2,
            v1,
            v2,
            a1,
            a2,
            t1,
            tv,
            t2,
        })
    }
}

impl SteeringMethod for Kinodynamic {
    type Path = KinodynamicPath;
    type Error = SteeringError;

    /// Compute the time-optimal trajectory from `q1` to `q2`: the axis with
    /// the largest minimum time sets the total duration and every other axis
    /// is stretched to match it.
    fn compute(
        &self,
        q1: &Configuration,
        q2: &Configuration,
    ) -> Result<KinodynamicPath, SteeringError> {
        for q in [q1, q2] {
            if q.len() != self.configuration_size {
                return Err(SteeringError::DimensionMismatch {
                    expected: self.configuration_size,
                    got: q.len(),
                });
            }
        }

        let mut total = 0.0f64;
        for axis in 0..self.axes {
            let min_time = self.min_time(
                q1[axis],
                q2[axis],
                q1[self.axes + axis],
                q2[self.axes + axis],
            )?;
            total = total.max(min_time.total);
        }

        let mut profiles = SmallVec::new();
        for axis in 0..self.axes {
            profiles.push(self.fixed_time(
                total,
                q1[axis],
                q2[axis],
                q1[self.axes + axis],
                q2[self.axes + axis],
            )?);
        }

        Ok(KinodynamicPath {
            initial: q1.clone(),
            finish: q2.clone(),
            finish_time: TimePoint::from_secs_f64(total),
            profiles,
        })
    }
}

/// Result of the per-axis minimum-time solve: the total duration, the
/// acceleration sign, and the three segment lengths (acceleration, cruise,
/// deceleration). A degenerate axis reports zero everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMinTime {
    pub total: f64,
    pub sigma: f64,
    pub t1: f64,
    pub tv: f64,
    pub t2: f64,
}

/// One axis of a kinodynamic path: the boundary states and the
/// accelerate/cruise/decelerate schedule between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisProfile {
    pub p1: f64,
    pub p2: f64,
    pub v1: f64,
    pub v2: f64,
    pub a1: f64,
    pub a2: f64,
    pub t1: f64,
    pub tv: f64,
    pub t2: f64,
}

impl AxisProfile {
    /// Velocity at the top of the first segment, held through the cruise.
    fn peak_velocity(&self) -> f64 {
        self.v1 + self.a1 * self.t1
    }

    pub fn position(&self, t: f64) -> f64 {
        let peak = self.peak_velocity();
        let p_ramp = self.p1 + self.v1 * self.t1 + 0.5 * self.a1 * self.t1 * self.t1;
        if t <= self.t1 {
            self.p1 + self.v1 * t + 0.5 * self.a1 * t * t
        } else if t <= self.t1 + self.tv {
            p_ramp + peak * (t - self.t1)
        } else {
            let tau = t - self.t1 - self.tv;
            p_ramp + peak * self.tv + peak * tau + 0.5 * self.a2 * tau * tau
        }
    }

    pub fn velocity(&self, t: f64) -> f64 {
        if t <= self.t1 {
            self.v1 + self.a1 * t
        } else if t <= self.t1 + self.tv {
            self.peak_velocity()
        } else {
            self.peak_velocity() + self.a2 * (t - self.t1 - self.tv)
        }
    }

    pub fn acceleration(&self, t: f64) -> f64 {
        if t <= self.t1 {
            self.a1
        } else if t <= self.t1 + self.tv {
            0.0
        } else {
            self.a2
        }
    }

    /// The same motion traversed backwards: segments in reverse order,
    /// endpoints swapped, velocities negated.
    fn reversed(&self) -> Self {
        Self {
            p1: self.p2,
            p2: self.p1,
            v1: -self.v2,
            v2: -self.v1,
            a1: self.a2,
            a2: self.a1,
            t1: self.t2,
            tv: self.tv,
            t2: self.t1,
        }
    }
}

/// A bang-bang trajectory between two configurations, evaluable anywhere in
/// `[0, T]`. Coordinates beyond the controlled position/velocity layout are
/// interpolated linearly.
#[derive(Debug, Clone, PartialEq)]
pub struct KinodynamicPath {
    initial: Configuration,
    finish: Configuration,
    finish_time: TimePoint,
    profiles: SmallVec<[AxisProfile; 4]>,
}

impl KinodynamicPath {
    pub fn initial(&self) -> &Configuration {
        &self.initial
    }

    pub fn finish(&self) -> &Configuration {
        &self.finish
    }

    pub fn finish_time(&self) -> TimePoint {
        self.finish_time
    }

    pub fn duration(&self) -> super::Duration {
        self.finish_time - TimePoint::new(0)
    }

    pub fn profiles(&self) -> &[AxisProfile] {
        &self.profiles
    }

    fn in_time_range(&self, time: &TimePoint) -> Result<(), InterpError> {
        if time.nanos_since_zero < 0 {
            return Err(InterpError::OutOfBounds);
        }

        if self.finish_time.nanos_since_zero < time.nanos_since_zero {
            return Err(InterpError::OutOfBounds);
        }

        Ok(())
    }
}

impl Motion<Configuration, nalgebra::DVector<f64>> for KinodynamicPath {
    fn compute_position(&self, time: &TimePoint) -> Result<Configuration, InterpError> {
        self.in_time_range(time)?;
        let t = time.as_secs_f64();
        let axes = self.profiles.len();

        let mut q = self.initial.clone();
        for (i, profile) in self.profiles.iter().enumerate() {
            q[i] = profile.position(t);
            q[axes + i] = profile.velocity(t);
        }

        let total = self.finish_time.as_secs_f64();
        if total > 0.0 {
            let ratio = t / total;
            for i in 2 * axes..q.len() {
                q[i] = self.initial[i] + ratio * (self.finish[i] - self.initial[i]);
            }
        }

        Ok(q)
    }

    fn compute_velocity(&self, time: &TimePoint) -> Result<nalgebra::DVector<f64>, InterpError> {
        self.in_time_range(time)?;
        let t = time.as_secs_f64();
        Ok(nalgebra::DVector::from_iterator(
            self.profiles.len(),
            self.profiles.iter().map(|profile| profile.velocity(t)),
        ))
    }
}

impl Reversible for KinodynamicPath {
    type ReversalError = NoError;

    fn reversed(&self) -> Result<Self, NoError> {
        let axes = self.profiles.len();
        let mut initial = self.finish.clone();
        let mut finish = self.initial.clone();
        for i in axes..2 * axes {
            initial[i] = -self.finish[i];
            finish[i] = -self.initial[i];
        }

        Ok(Self {
            initial,
            finish,
            finish_time: self.finish_time,
            profiles: self.profiles.iter().map(|p| p.reversed()).collect(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, ThisError)]
pub enum SteeringError {
    #[error(
        "the device's {extra_dof} extra DOFs cannot hold a velocity for each \
         of its {controlled} controlled axes"
    )]
    ExtraDofMismatch { controlled: usize, extra_dof: usize },

    #[error("kinematic bounds must be positive (a_max={a_max}, v_max={v_max})")]
    InvalidBounds { a_max: f64, v_max: f64 },

    #[error("configuration has {got} coordinates but the device has {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("no feasible schedule: negative discriminant {0}")]
    NegativeDiscriminant(f64),

    #[error("no schedule of duration {duration} stays within the velocity bound")]
    UnreachableDuration { duration: f64 },
}
