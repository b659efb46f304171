//! Fit statistics with volatile caching.
//!
//! Statistics are derived from modified attribute values and cached
//! until the next fit mutation; the fit clears the tracker on every
//! change rather than reasoning about which statistic a change touches.

use crate::holder::HolderId;
use std::collections::HashMap;

/// Drone bandwidth usage against the ship's output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DroneBandwidth {
    /// Bandwidth consumed by every holder at online state or above.
    pub used: f64,
    /// Bandwidth the ship provides, `None` without a ship or when the
    /// hull carries no bandwidth attribute.
    pub output: Option<f64>,
}

/// Fractions of incoming damage a target resists, per damage type.
/// `0.0` resists nothing, `1.0` negates the type entirely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResistanceProfile {
    pub em: f64,
    pub thermal: f64,
    pub kinetic: f64,
    pub explosive: f64,
}

/// Damage one volley deals, split by type.
///
/// A component is `None` when the firing holder carries no attribute
/// for that type or sits below active state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Volley {
    pub em: Option<f64>,
    pub thermal: Option<f64>,
    pub kinetic: Option<f64>,
    pub explosive: Option<f64>,
}

impl Volley {
    /// Sum of the present components, `None` when none is present.
    pub fn total(&self) -> Option<f64> {
        let parts = [self.em, self.thermal, self.kinetic, self.explosive];
        if parts.iter().all(Option::is_none) {
            return None;
        }
        Some(parts.iter().flatten().sum())
    }

    /// Damage left after the target's resistances.
    pub fn against(&self, target: &ResistanceProfile) -> Volley {
        Volley {
            em: self.em.map(|v| v * (1.0 - target.em)),
            thermal: self.thermal.map(|v| v * (1.0 - target.thermal)),
            kinetic: self.kinetic.map(|v| v * (1.0 - target.kinetic)),
            explosive: self.explosive.map(|v| v * (1.0 - target.explosive)),
        }
    }
}

/// Volatile statistic store.
#[derive(Debug, Default)]
pub(crate) struct StatTracker {
    pub drone_bandwidth: Option<DroneBandwidth>,
    pub volleys: HashMap<HolderId, Volley>,
}

impl StatTracker {
    /// Forget every cached statistic.
    pub fn clear(&mut self) {
        self.drone_bandwidth = None;
        self.volleys.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_drops_cached_stats() {
        let mut tracker = StatTracker {
            drone_bandwidth: Some(DroneBandwidth {
                used: 25.0,
                output: Some(50.0),
            }),
            volleys: HashMap::new(),
        };
        tracker.volleys.insert(
            HolderId(1),
            Volley {
                em: Some(10.0),
                ..Volley::default()
            },
        );
        tracker.clear();
        assert!(tracker.drone_bandwidth.is_none());
        assert!(tracker.volleys.is_empty());
    }

    #[test]
    fn test_volley_total_sums_present_components() {
        let volley = Volley {
            em: Some(10.0),
            thermal: None,
            kinetic: Some(5.0),
            explosive: None,
        };
        assert_eq!(volley.total(), Some(15.0));
        assert_eq!(Volley::default().total(), None);
    }

    #[test]
    fn test_volley_against_scales_by_resistance() {
        let volley = Volley {
            em: Some(10.0),
            thermal: Some(10.0),
            kinetic: None,
            explosive: Some(10.0),
        };
        let target = ResistanceProfile {
            em: 0.0,
            thermal: 0.5,
            kinetic: 0.5,
            explosive: 1.0,
        };
        let resisted = volley.against(&target);
        assert_eq!(resisted.em, Some(10.0));
        assert_eq!(resisted.thermal, Some(5.0));
        assert_eq!(resisted.kinetic, None);
        assert_eq!(resisted.explosive, Some(0.0));
    }
}
