use std::path::Path;

use nalgebra::Vector3;
use ron::ser::{to_string_pretty, PrettyConfig};
use serde::{Deserialize, Serialize};

use crate::attitude::{InertiaProperties, Integrator};
use crate::control::{ActuatorLimits, ControlGains, ControlLawEvaluator, ControlLawKind};
use crate::error::{ConfigError, SimError};
use crate::orbit::{ConstantDisturbance, DisturbanceSource, GravityGradient, KeplerianElements};

// ---------------------------------------------------------------------------
// Gains and disturbances as they appear in config files
// ---------------------------------------------------------------------------

/// Per-axis gains, `(x, y, z)` tuples in RON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GainConfig {
    pub kp: [f64; 3],
    pub kd: [f64; 3],
    pub ki: [f64; 3],
}

impl Default for GainConfig {
    fn default() -> Self {
        ControlGains::default().into()
    }
}

impl From<ControlGains> for GainConfig {
    fn from(g: ControlGains) -> Self {
        Self { kp: g.kp.into(), kd: g.kd.into(), ki: g.ki.into() }
    }
}

impl From<GainConfig> for ControlGains {
    fn from(g: GainConfig) -> Self {
        ControlGains {
            kp: Vector3::from(g.kp),
            kd: Vector3::from(g.kd),
            ki: Vector3::from(g.ki),
        }
    }
}

/// External torque model selected in the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DisturbanceConfig {
    /// Fixed body torque, N·m.
    Constant { torque: [f64; 3] },
    /// Gravity-gradient torque on a circular orbit.
    GravityGradient {
        altitude: f64,          // m
        inclination_deg: f64,
        #[serde(default)]
        j2: bool,
    },
}

impl DisturbanceConfig {
    /// Instantiate the source for a body with the given inertia.
    pub fn build(&self, inertia: &InertiaProperties) -> Result<Box<dyn DisturbanceSource>, SimError> {
        match self {
            DisturbanceConfig::Constant { torque } => {
                if torque.iter().any(|t| !t.is_finite()) {
                    return Err(SimError::InvalidConfiguration(
                        "constant disturbance must be finite".into(),
                    ));
                }
                Ok(Box::new(ConstantDisturbance::new(Vector3::from(*torque))))
            }
            DisturbanceConfig::GravityGradient { altitude, inclination_deg, j2 } => {
                let elements = KeplerianElements::circular(*altitude, inclination_deg.to_radians());
                elements.validate()?;
                Ok(Box::new(GravityGradient::from_elements(&elements, *j2, inertia.clone())))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Simulation configuration
// ---------------------------------------------------------------------------

/// Run configuration. Every field has a default, so a RON file only needs
/// the fields it changes:
///
/// ```ron
/// (
///     dt: 0.05,
///     step_count: 4000,
///     control_law: Pid(integral_limit: 0.5),
///     gains: (kp: (2.0, 2.0, 2.0), kd: (8.0, 8.0, 8.0), ki: (0.01, 0.01, 0.01)),
///     actuator_limits: Some((0.1, 0.1, 0.1)),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub dt: f64,                            // s
    pub step_count: usize,
    pub end_time: Option<f64>,              // s, stops early when reached
    pub integrator: Integrator,
    pub control_law: ControlLawKind,
    pub gains: GainConfig,
    pub actuator_limits: Option<[f64; 3]>,  // N·m per axis
    pub disturbances: Vec<DisturbanceConfig>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 0.1,
            step_count: 6000,
            end_time: None,
            integrator: Integrator::Rk4,
            control_law: ControlLawKind::Pd,
            gains: GainConfig::default(),
            actuator_limits: None,
            disturbances: Vec::new(),
        }
    }
}

impl SimConfig {
    pub fn builder() -> SimConfigBuilder {
        SimConfigBuilder::default()
    }

    /// Check everything that can be checked without the initial state.
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimError::InvalidTimeStep(self.dt));
        }
        if self.step_count == 0 {
            return Err(SimError::InvalidConfiguration("step_count must be at least 1".into()));
        }
        if let Some(end) = self.end_time {
            if !end.is_finite() {
                return Err(SimError::InvalidConfiguration(format!("end_time {end} is not finite")));
            }
        }
        self.control_gains().validate()?;
        self.limits()?;
        Ok(())
    }

    pub fn control_gains(&self) -> ControlGains {
        self.gains.into()
    }

    pub fn limits(&self) -> Result<Option<ActuatorLimits>, SimError> {
        self.actuator_limits
            .map(|m| ActuatorLimits::new(Vector3::from(m)))
            .transpose()
    }

    /// Number of steps to run starting from `start_time`: `step_count`, cut
    /// short by `end_time` when that comes first.
    pub fn steps_from(&self, start_time: f64) -> Result<usize, SimError> {
        let Some(end) = self.end_time else {
            return Ok(self.step_count);
        };
        let span = end - start_time;
        if span <= 0.0 {
            return Err(SimError::InvalidConfiguration(format!(
                "end_time {end} s is not after the initial time {start_time} s"
            )));
        }
        // Tolerate round-off in span/dt so 10.0/0.1 gives 100 steps, not 101
        let to_end = (span / self.dt - 1e-9).ceil() as usize;
        Ok(self.step_count.min(to_end.max(1)))
    }

    /// Control law, gains and limits ready to evaluate.
    pub fn evaluator(&self, inertia: &InertiaProperties) -> Result<ControlLawEvaluator, SimError> {
        ControlLawEvaluator::from_kind(&self.control_law, self.control_gains(), self.limits()?, inertia)
    }

    pub fn disturbance_sources(
        &self,
        inertia: &InertiaProperties,
    ) -> Result<Vec<Box<dyn DisturbanceSource>>, SimError> {
        self.disturbances.iter().map(|d| d.build(inertia)).collect()
    }

    // -----------------------------------------------------------------------
    // RON
    // -----------------------------------------------------------------------

    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_ron_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron_str(&text)
    }

    pub fn to_ron(&self) -> Result<String, ron::Error> {
        to_string_pretty(self, PrettyConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct SimConfigBuilder {
    config: SimConfig,
}

impl SimConfigBuilder {
    pub fn dt(mut self, v: f64) -> Self { self.config.dt = v; self }
    pub fn step_count(mut self, v: usize) -> Self { self.config.step_count = v; self }
    pub fn end_time(mut self, v: f64) -> Self { self.config.end_time = Some(v); self }
    pub fn integrator(mut self, v: Integrator) -> Self { self.config.integrator = v; self }
    pub fn control_law(mut self, v: ControlLawKind) -> Self { self.config.control_law = v; self }
    pub fn gains(mut self, v: ControlGains) -> Self { self.config.gains = v.into(); self }
    pub fn actuator_limits(mut self, v: [f64; 3]) -> Self { self.config.actuator_limits = Some(v); self }
    pub fn disturbance(mut self, v: DisturbanceConfig) -> Self { self.config.disturbances.push(v); self }

    /// Finish and validate.
    pub fn build(self) -> Result<SimConfig, SimError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
