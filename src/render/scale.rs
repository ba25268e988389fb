//! Linear value scale and axis ticks.

/// Horizontal layout of the value axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueScale {
    /// Total width of the drawing area.
    pub width: f64,
    pub margin_left: f64,
    pub margin_right: f64,
}

impl ValueScale {
    pub fn new(width: f64) -> Self {
        Self {
            width,
            margin_left: 0.0,
            margin_right: 6.0,
        }
    }

    #[cfg(test)]
    pub fn with_margins(mut self, left: f64, right: f64) -> Self {
        self.margin_left = left;
        self.margin_right = right;
        self
    }

    /// Map `value` in `[0, domain_max]` onto the drawing range.
    ///
    /// A non-positive domain maps everything to the left edge.
    pub fn x(&self, value: f64, domain_max: f64) -> f64 {
        let (r0, r1) = (self.margin_left, self.width - self.margin_right);
        if domain_max <= 0.0 || !domain_max.is_finite() {
            return r0;
        }
        r0 + (value / domain_max) * (r1 - r0)
    }

    /// Length of a bar for `value`.
    pub fn extent(&self, value: f64, domain_max: f64) -> f64 {
        (self.x(value, domain_max) - self.x(0.0, domain_max)).max(0.0)
    }

    /// Suggested tick count: one tick per 160 units of width.
    pub fn tick_count(&self) -> f64 {
        self.width / 160.0
    }

    /// Round tick values covering `[0, domain_max]`.
    pub fn ticks(&self, domain_max: f64) -> Vec<f64> {
        ticks(0.0, domain_max, self.tick_count())
    }
}

/// "Nice" ticks (multiples of 1, 2, 5 times a power of ten) in `[start, stop]`,
/// aiming for about `count` of them.
pub fn ticks(start: f64, stop: f64, count: f64) -> Vec<f64> {
    if !(count > 0.0) || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }

    let (lo, hi, reverse) = if stop < start {
        (stop, start, true)
    } else {
        (start, stop, false)
    };

    let Some((i1, i2, inc)) = tick_spec(lo, hi, count) else {
        return Vec::new();
    };
    if i2 < i1 {
        return Vec::new();
    }

    let mut values: Vec<f64> = (i1..=i2)
        .map(|i| {
            if inc < 0.0 {
                i as f64 / -inc
            } else {
                i as f64 * inc
            }
        })
        .collect();

    if reverse {
        values.reverse();
    }
    values
}

/// First and last tick index plus the increment; a negative increment
/// means "divide by" to keep small steps exact.
fn tick_spec(start: f64, stop: f64, count: f64) -> Option<(i64, i64, f64)> {
    let e10 = 50f64.sqrt();
    let e5 = 10f64.sqrt();
    let e2 = 2f64.sqrt();

    let step = (stop - start) / count;
    if !(step > 0.0) || !step.is_finite() {
        return None;
    }
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= e10 {
        10.0
    } else if error >= e5 {
        5.0
    } else if error >= e2 {
        2.0
    } else {
        1.0
    };

    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let scale = 10f64.powf(-power) / factor;
        i1 = (start * scale).round() as i64;
        i2 = (stop * scale).round() as i64;
        if (i1 as f64) / scale < start {
            i1 += 1;
        }
        if (i2 as f64) / scale > stop {
            i2 -= 1;
        }
        inc = -scale;
    } else {
        let scale = 10f64.powf(power) * factor;
        i1 = (start / scale).round() as i64;
        i2 = (stop / scale).round() as i64;
        if (i1 as f64) * scale < start {
            i1 += 1;
        }
        if (i2 as f64) * scale > stop {
            i2 -= 1;
        }
        inc = scale;
    }

    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    Some((i1, i2, inc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_x_maps_domain_to_range() {
        let scale = ValueScale::new(600.0);
        assert_eq!(scale.x(0.0, 100.0), 0.0);
        assert_eq!(scale.x(100.0, 100.0), 594.0);
        assert_eq!(scale.x(50.0, 100.0), 297.0);
        assert_eq!(scale.extent(25.0, 100.0), 148.5);
    }

    #[test]
    fn test_x_with_empty_domain() {
        let scale = ValueScale::new(80.0).with_margins(2.0, 0.0);
        assert_eq!(scale.x(10.0, 0.0), 2.0);
        assert_eq!(scale.extent(10.0, 0.0), 0.0);
    }

    #[test]
    fn test_ticks_nice_steps() {
        assert_eq!(
            ticks(0.0, 100.0, 3.75),
            vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]
        );
        assert_eq!(ticks(0.0, 10.0, 10.0).len(), 11);
        assert_eq!(ticks(0.0, 1.0, 5.0), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
        assert_eq!(
            ticks(0.0, 1_234_567.0, 3.75),
            vec![0.0, 500_000.0, 1_000_000.0]
        );
    }

    #[test]
    fn test_ticks_degenerate() {
        assert!(ticks(0.0, 10.0, 0.0).is_empty());
        assert_eq!(ticks(5.0, 5.0, 4.0), vec![5.0]);
        assert!(ticks(0.0, f64::NAN, 4.0).is_empty());
        assert_eq!(ticks(10.0, 0.0, 2.0), vec![10.0, 5.0, 0.0]);
    }

    #[test]
    fn test_scale_ticks_use_width() {
        let scale = ValueScale::new(600.0);
        assert_eq!(scale.tick_count(), 3.75);
        assert_eq!(scale.ticks(100.0).last(), Some(&100.0));
    }
}
