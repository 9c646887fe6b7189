//! Engine configuration
//!
//! Every behavioral switch of the candidate-route engine lives in
//! [`CgrConfig`]. The presets mirror the three deployment profiles the
//! engine is commonly run with:
//!
//! - [`CgrConfig::ccsds_sabr`]: plain SABR, one route per neighbor
//! - [`CgrConfig::enhanced`]: SABR plus queue delay on every hop
//! - [`CgrConfig::suggested`]: all enhancements including loop avoidance

use serde::{Deserialize, Serialize};

/// Default minimum delivery-confidence gain a route must contribute
pub const DEFAULT_MIN_CONFIDENCE_IMPROVEMENT: f32 = 0.05;

/// Default bound on relative node motion, in miles per hour
pub const DEFAULT_MAX_SPEED_MPH: u64 = 150_000;

/// Toggles for the two loop-avoidance mechanisms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopAvoidance {
    /// Classify routes through neighbors the bundle already failed toward
    pub reactive: bool,
    /// Classify routes through nodes the bundle already visited
    pub proactive: bool,
}

impl LoopAvoidance {
    /// Both mechanisms on
    pub fn enabled() -> Self {
        Self {
            reactive: true,
            proactive: true,
        }
    }

    /// Both mechanisms off
    pub fn disabled() -> Self {
        Self {
            reactive: false,
            proactive: false,
        }
    }

    /// Whether either mechanism is on
    pub fn is_enabled(&self) -> bool {
        self.reactive || self.proactive
    }
}

impl Default for LoopAvoidance {
    fn default() -> Self {
        Self::enabled()
    }
}

/// Configuration for the candidate-route engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CgrConfig {
    /// Loop-avoidance mechanisms
    pub loop_avoidance: LoopAvoidance,
    /// Skip the first-contact and delivery-confidence gates
    pub neglect_confidence: bool,
    /// Minimum delivery-confidence gain when confidence is not neglected
    pub min_confidence_improvement: f32,
    /// Model queueing delay on every hop, not only the first
    pub queue_delay: bool,
    /// Routes the enumerator computes per neighbor (0 = unlimited)
    ///
    /// A value of 1 caps the missing-neighbor count for non-critical
    /// bundles and makes excluded-neighbor rejections recoverable.
    pub max_routes_per_neighbor: usize,
    /// Keep at most one candidate per neighbor in a pass
    pub one_candidate_per_neighbor: bool,
    /// Bound on relative node motion used for the light-time margin
    pub max_speed_mph: u64,
}

impl Default for CgrConfig {
    fn default() -> Self {
        Self {
            loop_avoidance: LoopAvoidance::enabled(),
            neglect_confidence: true,
            min_confidence_improvement: DEFAULT_MIN_CONFIDENCE_IMPROVEMENT,
            queue_delay: true,
            max_routes_per_neighbor: 0,
            one_candidate_per_neighbor: true,
            max_speed_mph: DEFAULT_MAX_SPEED_MPH,
        }
    }
}

impl CgrConfig {
    /// Plain CCSDS SABR behavior
    ///
    /// No loop avoidance, no queue delay, one route per neighbor.
    pub fn ccsds_sabr() -> Self {
        Self {
            loop_avoidance: LoopAvoidance::disabled(),
            queue_delay: false,
            max_routes_per_neighbor: 1,
            ..Self::default()
        }
    }

    /// SABR with queue delay on every hop
    pub fn enhanced() -> Self {
        Self {
            loop_avoidance: LoopAvoidance::disabled(),
            ..Self::default()
        }
    }

    /// All enhancements on
    pub fn suggested() -> Self {
        Self::default()
    }

    /// Look up a preset by name
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "sabr" | "ccsds_sabr" => Some(Self::ccsds_sabr()),
            "enhanced" => Some(Self::enhanced()),
            "suggested" | "default" => Some(Self::suggested()),
            _ => None,
        }
    }

    /// Light-time margin for a given one-way light time
    pub fn owlt_margin(&self, owlt: u32) -> u32 {
        let margin = ((self.max_speed_mph / 3600) * u64::from(owlt)) / 186_282;
        u32::try_from(margin).unwrap_or(u32::MAX)
    }

    /// Validate configuration invariants
    ///
    /// Returns a list of warnings if the configuration has potential issues.
    /// An empty list means the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if !(0.0..=1.0).contains(&self.min_confidence_improvement) {
            warnings.push(ConfigWarning::ConfidenceImprovementOutOfRange);
        }

        if self.max_speed_mph < 3600 {
            warnings.push(ConfigWarning::LightTimeMarginDisabled);
        }

        // Extra routes per neighbor are discarded anyway
        if self.max_routes_per_neighbor > 1 && self.one_candidate_per_neighbor {
            warnings.push(ConfigWarning::RoutesPerNeighborUnused);
        }

        warnings
    }

    /// Check if the configuration is valid (no warnings)
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

/// Configuration warnings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Minimum confidence improvement is outside [0, 1]
    ConfidenceImprovementOutOfRange,
    /// Speed bound is below one mile per second, so the margin is always zero
    LightTimeMarginDisabled,
    /// More than one route per neighbor requested but only one candidate is kept
    RoutesPerNeighborUnused,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::ConfidenceImprovementOutOfRange => {
                write!(f, "min_confidence_improvement is outside [0, 1]")
            }
            ConfigWarning::LightTimeMarginDisabled => {
                write!(f, "max_speed_mph is below 3600, light-time margin is always zero")
            }
            ConfigWarning::RoutesPerNeighborUnused => {
                write!(
                    f,
                    "max_routes_per_neighbor > 1 has no effect with one_candidate_per_neighbor"
                )
            }
        }
    }
}
