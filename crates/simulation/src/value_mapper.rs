//! Linear range remapping used at every boundary where an external value
//! becomes a visual encoding (wind strength, fog time increment, sensor
//! readings normalised into gradient positions).
//!
//! Mapping does not clamp: values outside the input range extrapolate
//! linearly. Callers that need a bounded result clamp explicitly.

use serde::{Deserialize, Serialize};

use crate::config_error::ConfigError;

/// Map `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// Fails only when the input range is empty or non-finite.
pub fn map_range(
    value: f64,
    in_min: f64,
    in_max: f64,
    out_min: f64,
    out_max: f64,
) -> Result<f64, ConfigError> {
    Ok(ValueMapper::new((in_min, in_max), (out_min, out_max))?.map(value))
}

/// Clamp to [0, 1]. NaN becomes 0.
#[inline]
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// A validated linear mapping between two ranges.
///
/// Construction rejects degenerate input ranges so that `map` can be
/// called every frame without a failure path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MapperRanges", into = "MapperRanges")]
pub struct ValueMapper {
    in_min: f64,
    in_max: f64,
    out_min: f64,
    out_max: f64,
}

/// Serialized form of a [`ValueMapper`]: `{ "input": [a, b], "output": [c, d] }`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct MapperRanges {
    input: (f64, f64),
    output: (f64, f64),
}

impl TryFrom<MapperRanges> for ValueMapper {
    type Error = ConfigError;

    fn try_from(ranges: MapperRanges) -> Result<Self, Self::Error> {
        ValueMapper::new(ranges.input, ranges.output)
    }
}

impl From<ValueMapper> for MapperRanges {
    fn from(mapper: ValueMapper) -> Self {
        MapperRanges {
            input: mapper.input(),
            output: mapper.output(),
        }
    }
}

impl ValueMapper {
    pub fn new(input: (f64, f64), output: (f64, f64)) -> Result<Self, ConfigError> {
        let (in_min, in_max) = input;
        let (out_min, out_max) = output;
        let finite = [in_min, in_max, out_min, out_max]
            .iter()
            .all(|v| v.is_finite());
        if !finite || in_min == in_max {
            return Err(ConfigError::DegenerateRange {
                min: in_min,
                max: in_max,
            });
        }
        Ok(Self {
            in_min,
            in_max,
            out_min,
            out_max,
        })
    }

    /// Identity mapping over the unit interval.
    pub const fn unit() -> Self {
        Self {
            in_min: 0.0,
            in_max: 1.0,
            out_min: 0.0,
            out_max: 1.0,
        }
    }

    pub fn input(&self) -> (f64, f64) {
        (self.in_min, self.in_max)
    }

    pub fn output(&self) -> (f64, f64) {
        (self.out_min, self.out_max)
    }

    /// Linear interpolation, extrapolating outside the input range.
    #[inline]
    pub fn map(&self, value: f64) -> f64 {
        let t = (value - self.in_min) / (self.in_max - self.in_min);
        self.out_min + t * (self.out_max - self.out_min)
    }

    /// Like [`map`](Self::map) but the result stays within the output range.
    pub fn map_clamped(&self, value: f64) -> f64 {
        let lo = self.out_min.min(self.out_max);
        let hi = self.out_min.max(self.out_max);
        self.map(value).clamp(lo, hi)
    }

    /// The mapping back from output to input. `None` when the output
    /// range is empty (the forward map is constant and not invertible).
    pub fn inverse(&self) -> Option<Self> {
        Self::new(
            (self.out_min, self.out_max),
            (self.in_min, self.in_max),
        )
        .ok()
    }
}

/// The two mappings applied to the wind signal each frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindMapping {
    /// Wind intensity → extra fog seconds added per frame.
    pub time_increment: ValueMapper,
    /// Wind intensity → strength value written to the shader uniforms.
    pub shader_strength: ValueMapper,
}

impl Default for WindMapping {
    fn default() -> Self {
        Self {
            time_increment: ValueMapper {
                in_min: 0.0,
                in_max: 1.0,
                out_min: 0.0,
                out_max: 2.0,
            },
            shader_strength: ValueMapper {
                in_min: 0.0,
                in_max: 1.0,
                out_min: 0.0005,
                out_max: 0.01,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_clamp_unit() {
        assert_eq!(clamp_unit(-0.5), 0.0);
        assert_eq!(clamp_unit(0.4), 0.4);
        assert_eq!(clamp_unit(3.0), 1.0);
        assert_eq!(clamp_unit(f64::NAN), 0.0);
        assert_eq!(clamp_unit(f64::INFINITY), 1.0);
    }

    #[test]
    fn test_map_range_midpoint() {
        let v = map_range(0.5, 0.0, 1.0, 0.0, 2.0).unwrap();
        assert!(approx(v, 1.0), "expected 1.0, got {v}");
    }

    #[test]
    fn test_map_range_shader_strength_endpoints() {
        let lo = map_range(0.0, 0.0, 1.0, 0.0005, 0.01).unwrap();
        let hi = map_range(1.0, 0.0, 1.0, 0.0005, 0.01).unwrap();
        assert!(approx(lo, 0.0005), "got {lo}");
        assert!(approx(hi, 0.01), "got {hi}");
    }

    #[test]
    fn test_map_range_extrapolates_without_clamping() {
        let v = map_range(2.0, 0.0, 1.0, 0.0, 2.0).unwrap();
        assert!(approx(v, 4.0), "expected linear extrapolation to 4.0, got {v}");
        let v = map_range(-1.0, 0.0, 1.0, 0.0, 2.0).unwrap();
        assert!(approx(v, -2.0), "got {v}");
    }

    #[test]
    fn test_degenerate_range_is_error() {
        let err = map_range(0.5, 1.0, 1.0, 0.0, 1.0).unwrap_err();
        assert!(matches!(err, ConfigError::DegenerateRange { .. }));
    }

    #[test]
    fn test_non_finite_bounds_rejected() {
        assert!(ValueMapper::new((0.0, f64::NAN), (0.0, 1.0)).is_err());
        assert!(ValueMapper::new((0.0, 1.0), (f64::INFINITY, 1.0)).is_err());
    }

    #[test]
    fn test_reversed_output_range() {
        let m = ValueMapper::new((0.0, 1.0), (1.0, 0.0)).unwrap();
        assert!(approx(m.map(0.25), 0.75));
        assert!(approx(m.map_clamped(3.0), 0.0));
    }

    #[test]
    fn test_map_clamped_bounds_output() {
        let m = ValueMapper::new((0.0, 1.0), (0.0, 2.0)).unwrap();
        assert!(approx(m.map_clamped(5.0), 2.0));
        assert!(approx(m.map_clamped(-5.0), 0.0));
    }

    #[test]
    fn test_inverse_recovers_input() {
        let m = ValueMapper::new((0.0, 1.0), (0.0005, 0.01)).unwrap();
        let inv = m.inverse().unwrap();
        for v in [0.0, 0.3, 0.77, 1.0] {
            let back = inv.map(m.map(v));
            assert!((back - v).abs() < 1e-9, "{v} round-tripped to {back}");
        }
    }

    #[test]
    fn test_inverse_of_constant_map_is_none() {
        let m = ValueMapper::new((0.0, 1.0), (3.0, 3.0)).unwrap();
        assert!(m.inverse().is_none());
    }

    #[test]
    fn test_wind_mapping_defaults() {
        let w = WindMapping::default();
        assert!(approx(w.time_increment.map(1.0), 2.0));
        assert!(approx(w.shader_strength.map(0.0), 0.0005));
    }

    #[test]
    fn test_deserialize_rejects_degenerate_range() {
        let json = r#"{ "input": [0.5, 0.5], "output": [0.0, 1.0] }"#;
        assert!(serde_json::from_str::<ValueMapper>(json).is_err());
        let json = r#"{ "input": [0.0, 1.0], "output": [0.0, 2.0] }"#;
        let m: ValueMapper = serde_json::from_str(json).unwrap();
        assert!(approx(m.map(0.5), 1.0));
    }

    #[test]
    fn test_map_strictly_increasing_for_ascending_output() {
        let wind = WindMapping::default();
        let custom = ValueMapper::new((10.0, 20.0), (-3.0, 0.5)).unwrap();
        for m in [wind.time_increment, wind.shader_strength, custom] {
            let (lo, hi) = m.input();
            let span = hi - lo;
            let mut prev = m.map(lo - span);
            for step in 1..=60 {
                let x = lo - span + span * 3.0 * step as f64 / 60.0;
                let y = m.map(x);
                assert!(y > prev, "map({x}) = {y} not above {prev}");
                prev = y;
            }
        }
    }
}
