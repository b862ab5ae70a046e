//! Ratio to concentration lookup
//!
//! Resistive gas sensors publish a log-log sensitivity chart (Rs/R0 against
//! ppm) per target gas. The chart is sampled into a handful of points and
//! interpolated linearly between them; `no_std` has no `powf`/`log10`.

use heapless::Vec;

/// Maximum number of points a curve can hold
pub const MAX_CURVE_POINTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    /// Rs / R0, with R0 measured in clean air
    pub ratio: f32,
    pub ppm: f32,
}

impl CurvePoint {
    pub const fn new(ratio: f32, ppm: f32) -> Self {
        Self { ratio, ppm }
    }
}

/// MQ-9 carbon monoxide curve, read off the datasheet chart and rescaled from
/// the datasheet's 1000 ppm LPG reference to a clean-air baseline (factor 9.9).
const MQ9_CARBON_MONOXIDE: [CurvePoint; 7] = [
    CurvePoint::new(1.0, 0.0),
    CurvePoint::new(0.172, 200.0),
    CurvePoint::new(0.126, 500.0),
    CurvePoint::new(0.101, 1000.0),
    CurvePoint::new(0.081, 2000.0),
    CurvePoint::new(0.061, 5000.0),
    CurvePoint::new(0.051, 10000.0),
];

/// Piecewise-linear curve from ratio to ppm.
///
/// Points are ordered from clean air (highest ratio) to the highest
/// concentration (lowest ratio).
#[derive(Debug, Clone, PartialEq)]
pub struct ConcentrationCurve {
    points: Vec<CurvePoint, MAX_CURVE_POINTS>,
}

impl ConcentrationCurve {
    /// Build a curve from chart points.
    ///
    /// Returns `None` unless there are 2..=[`MAX_CURVE_POINTS`] finite points
    /// with strictly falling ratio and non-decreasing ppm.
    pub fn new(points: &[CurvePoint]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let finite = points
            .iter()
            .all(|p| p.ratio.is_finite() && p.ppm.is_finite() && p.ratio > 0.0);
        let ordered = points
            .windows(2)
            .all(|w| w[1].ratio < w[0].ratio && w[1].ppm >= w[0].ppm);
        if !finite || !ordered {
            return None;
        }
        Vec::from_slice(points).ok().map(|points| Self { points })
    }

    pub fn mq9_carbon_monoxide() -> Self {
        Self {
            points: Vec::from_iter(MQ9_CARBON_MONOXIDE),
        }
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Estimated concentration for `ratio`, clamped to the ends of the curve.
    ///
    /// `None` only for a NaN ratio.
    pub fn estimate_ppm(&self, ratio: f32) -> Option<f32> {
        if ratio.is_nan() {
            return None;
        }

        let first = self.points.first()?;
        let last = self.points.last()?;
        if ratio >= first.ratio {
            return Some(first.ppm);
        }
        if ratio <= last.ratio {
            return Some(last.ppm);
        }

        self.points.windows(2).find_map(|w| {
            let (hi, lo) = (w[0], w[1]);
            if ratio <= hi.ratio && ratio >= lo.ratio {
                let t = (hi.ratio - ratio) / (hi.ratio - lo.ratio);
                Some(hi.ppm + t * (lo.ppm - hi.ppm))
            } else {
                None
            }
        })
    }
}

impl Default for ConcentrationCurve {
    fn default() -> Self {
        Self::mq9_carbon_monoxide()
    }
}
