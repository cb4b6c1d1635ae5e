//! Continuous color ramps for coloring nodes by a statistic.

use std::fmt;

use crate::layout::Centroid;

/// Color parsing and ramp construction failures.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("not a #rrggbb color: {0:?}")]
    BadHex(String),
    #[error("a color ramp needs at least one anchor")]
    NoAnchors,
}

/// 8-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(s: &str) -> Result<Self, ColorError> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorError::BadHex(s.to_owned()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| ColorError::BadHex(s.to_owned()))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        self.to_string()
    }

    fn lerp(self, other: Self, t: f64) -> Self {
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Self::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Piecewise-linear ramp through evenly spaced anchor colors.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorRamp {
    anchors: Vec<Rgb>,
}

impl ColorRamp {
    pub fn new(anchors: Vec<Rgb>) -> Result<Self, ColorError> {
        if anchors.is_empty() {
            return Err(ColorError::NoAnchors);
        }
        Ok(Self { anchors })
    }

    /// Cyan to magenta.
    pub fn cool() -> Self {
        Self {
            anchors: vec![Rgb::new(0x00, 0xff, 0xff), Rgb::new(0xff, 0x00, 0xff)],
        }
    }

    pub fn anchors(&self) -> &[Rgb] {
        &self.anchors
    }

    /// Color for `value` normalized to `[vmin, vmax]` (clamped). A degenerate
    /// range, or a non-finite value, maps to the first anchor.
    pub fn sample(&self, value: f64, vmin: f64, vmax: f64) -> Rgb {
        let first = self.anchors[0];
        let span = vmax - vmin;
        if !(span > 0.0) || !value.is_finite() {
            return first;
        }
        let t = ((value - vmin) / span).clamp(0.0, 1.0);
        let n = self.anchors.len();
        if n == 1 {
            return first;
        }
        let pos = t * (n - 1) as f64;
        let i = (pos.floor() as usize).min(n - 2);
        self.anchors[i].lerp(self.anchors[i + 1], pos - i as f64)
    }

    /// `steps` evenly spaced `(value, color)` pairs from `vmin` to `vmax`.
    pub fn steps(&self, vmin: f64, vmax: f64, steps: usize) -> Vec<(f64, Rgb)> {
        if steps == 0 {
            return Vec::new();
        }
        let denom = steps.saturating_sub(1).max(1) as f64;
        (0..steps)
            .map(|i| {
                let v = vmin + (vmax - vmin) * i as f64 / denom;
                (v, self.sample(v, vmin, vmax))
            })
            .collect()
    }
}

/// Range of a statistic's mean over the centroids that carry it.
pub fn stat_range(centroids: &[Centroid], stat: &str) -> Option<(f64, f64)> {
    let mut it = centroids
        .iter()
        .filter_map(|c| c.stats.get(stat))
        .map(|s| s.mean)
        .filter(|m| m.is_finite());
    let first = it.next()?;
    Some(it.fold((first, first), |(lo, hi), m| (lo.min(m), hi.max(m))))
}

/// Recolor centroids by the mean of `stat`; centroids without it keep their
/// color. Returns the value range used, if any centroid carried the stat.
pub fn color_by_stat(
    centroids: &[Centroid],
    stat: &str,
    ramp: &ColorRamp,
) -> (Vec<Centroid>, Option<(f64, f64)>) {
    let Some((vmin, vmax)) = stat_range(centroids, stat) else {
        return (centroids.to_vec(), None);
    };
    let out = centroids
        .iter()
        .map(|c| match c.stats.get(stat) {
            Some(s) => c.with_color(ramp.sample(s.mean, vmin, vmax).to_hex()),
            None => c.clone(),
        })
        .collect();
    (out, Some((vmin, vmax)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Stat;
    use nalgebra::vector;
    use std::collections::BTreeMap;

    #[test]
    fn hex_round_trip_and_errors() {
        let c = Rgb::from_hex("#1A2b3c").unwrap();
        assert_eq!(c, Rgb::new(0x1a, 0x2b, 0x3c));
        assert_eq!(c.to_hex(), "#1a2b3c");
        assert_eq!(Rgb::from_hex("00ff00").unwrap(), Rgb::new(0, 255, 0));
        assert!(matches!(Rgb::from_hex("#12345"), Err(ColorError::BadHex(_))));
        assert!(matches!(Rgb::from_hex("#zz0000"), Err(ColorError::BadHex(_))));
        assert_eq!(ColorRamp::new(Vec::new()), Err(ColorError::NoAnchors));
    }

    #[test]
    fn hex_rejects_signs_and_whitespace() {
        for bad in ["#+f0000", "+f0000", "#-10000", "# f0000", "#ff00 0"] {
            assert!(
                matches!(Rgb::from_hex(bad), Err(ColorError::BadHex(_))),
                "{bad:?} parsed"
            );
        }
    }

    #[test]
    fn cool_ramp_endpoints_and_middle() {
        let ramp = ColorRamp::cool();
        assert_eq!(ramp.sample(0.0, 0.0, 1.0).to_hex(), "#00ffff");
        assert_eq!(ramp.sample(1.0, 0.0, 1.0).to_hex(), "#ff00ff");
        assert_eq!(ramp.sample(2.0, 0.0, 1.0).to_hex(), "#ff00ff");
        assert_eq!(ramp.sample(0.5, 0.0, 1.0), Rgb::new(128, 128, 255));
        assert_eq!(ramp.sample(7.0, 3.0, 3.0).to_hex(), "#00ffff");
        let steps = ramp.steps(0.0, 10.0, 100);
        assert_eq!(steps.len(), 100);
        assert_eq!(steps[99].0, 10.0);
    }

    #[test]
    fn recolor_by_statistic() {
        let mk = |label: &str, mean: Option<f64>| {
            let mut stats = BTreeMap::new();
            if let Some(mean) = mean {
                stats.insert("age".to_string(), Stat { mean, variance: 1.0 });
            }
            Centroid {
                label: label.into(),
                name: label.into(),
                level: "class".into(),
                n_cells: 1,
                color: "#000000".into(),
                pixel: vector![0.0, 0.0],
                pixel_r: 1.0,
                stats,
            }
        };
        let cs = vec![mk("a", Some(1.0)), mk("b", Some(3.0)), mk("c", None)];
        let (out, range) = color_by_stat(&cs, "age", &ColorRamp::cool());
        assert_eq!(range, Some((1.0, 3.0)));
        assert_eq!(out[0].color, "#00ffff");
        assert_eq!(out[1].color, "#ff00ff");
        assert_eq!(out[2].color, "#000000");
        assert_eq!(color_by_stat(&cs, "missing", &ColorRamp::cool()).1, None);
    }
}
