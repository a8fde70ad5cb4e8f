//! The closed set of comparison methods the service offers.
//!
//! The service identifies methods by opaque ids (`one`, `two`, `three`).
//! Callers only ever hold a [`ComparisonMethod`]; the id and the human label
//! both come from the static table below.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A comparison algorithm implemented by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ComparisonMethod {
    /// Feature matching (SIFT) + homography; tolerates rotation and scale.
    #[default]
    Homography,
    /// Overlay the two images pixel by pixel.
    PixelOverlay,
    /// Frequency-domain estimate of a pure translation.
    PhaseCorrelation,
}

/// `(method, wire id, label)`, in the order a picker should list them.
static METHOD_TABLE: [(ComparisonMethod, &str, &str); 3] = [
    (
        ComparisonMethod::Homography,
        "one",
        "Homography (SIFT) for rotation/scale",
    ),
    (
        ComparisonMethod::PhaseCorrelation,
        "three",
        "Phase correlation for exact shift",
    ),
    (
        ComparisonMethod::PixelOverlay,
        "two",
        "Pixel-by-pixel image overlay",
    ),
];

impl ComparisonMethod {
    /// All methods, in display order.
    pub fn all() -> impl Iterator<Item = ComparisonMethod> {
        METHOD_TABLE.iter().map(|(m, _, _)| *m)
    }

    /// The id sent as `?method=` to the service.
    pub fn id(self) -> &'static str {
        Self::entry(self).1
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        Self::entry(self).2
    }

    /// Look a method up by its wire id.
    pub fn from_id(id: &str) -> Option<Self> {
        METHOD_TABLE
            .iter()
            .find(|(_, wire, _)| *wire == id)
            .map(|(m, _, _)| *m)
    }

    fn entry(self) -> &'static (ComparisonMethod, &'static str, &'static str) {
        METHOD_TABLE
            .iter()
            .find(|(m, _, _)| *m == self)
            .unwrap_or(&METHOD_TABLE[0])
    }
}

impl fmt::Display for ComparisonMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ComparisonMethod {
    type Err = String;

    /// Accepts short names (`homography`, `overlay`, `phase`) and wire ids.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "homography" | "sift" => Ok(ComparisonMethod::Homography),
            "overlay" | "pixel" | "pixel-overlay" => Ok(ComparisonMethod::PixelOverlay),
            "phase" | "phase-correlation" => Ok(ComparisonMethod::PhaseCorrelation),
            other => Self::from_id(other).ok_or_else(|| {
                format!(
                    "unknown comparison method '{}' (expected homography, overlay, phase, one, two or three)",
                    other
                )
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_ids_match_service() {
        assert_eq!(ComparisonMethod::Homography.id(), "one");
        assert_eq!(ComparisonMethod::PixelOverlay.id(), "two");
        assert_eq!(ComparisonMethod::PhaseCorrelation.id(), "three");
    }

    #[test]
    fn from_id_round_trips_every_method() {
        for m in ComparisonMethod::all() {
            assert_eq!(ComparisonMethod::from_id(m.id()), Some(m));
        }
        assert_eq!(ComparisonMethod::from_id("four"), None);
    }

    #[test]
    fn parse_short_names_and_ids() {
        assert_eq!("homography".parse::<ComparisonMethod>().unwrap(), ComparisonMethod::Homography);
        assert_eq!("Overlay".parse::<ComparisonMethod>().unwrap(), ComparisonMethod::PixelOverlay);
        assert_eq!("three".parse::<ComparisonMethod>().unwrap(), ComparisonMethod::PhaseCorrelation);
        assert!("fourier".parse::<ComparisonMethod>().is_err());
    }

    #[test]
    fn display_order_lists_phase_before_overlay() {
        let order: Vec<_> = ComparisonMethod::all().collect();
        assert_eq!(
            order,
            vec![
                ComparisonMethod::Homography,
                ComparisonMethod::PhaseCorrelation,
                ComparisonMethod::PixelOverlay
            ]
        );
    }
}
