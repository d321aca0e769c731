//! Exponential moving average over a value column.
//!
//! Smoothing factor `2 / (period + 1)`, seeded at index `period - 1` with the
//! plain mean of the first `period` values. MACD runs this over closes for its
//! fast and slow lines and over the MACD line for its signal.

/// EMA of `values`. Positions before the seed are undefined; so is everything
/// from the first undefined input onwards.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let (head, rest) = values.split_at(period);
    if head.iter().any(|v| v.is_nan()) {
        return out;
    }
    let alpha = 2.0 / (period as f64 + 1.0);
    let mut current = head.iter().sum::<f64>() / period as f64;
    out[period - 1] = current;

    for (slot, &value) in out[period..].iter_mut().zip(rest) {
        if value.is_nan() {
            break;
        }
        current += alpha * (value - current);
        *slot = current;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn seeded_with_mean_then_smoothed() {
        // period 3 -> alpha 0.5, seed = mean(2, 4, 6) = 4
        let ema = ema_of_series(&[2.0, 4.0, 6.0, 10.0, 2.0], 3);
        assert!(ema[0].is_nan() && ema[1].is_nan());
        assert_approx(ema[2], 4.0, DEFAULT_EPSILON);
        assert_approx(ema[3], 7.0, DEFAULT_EPSILON);
        assert_approx(ema[4], 4.5, DEFAULT_EPSILON);
    }

    #[test]
    fn period_one_tracks_input() {
        let values = [3.5, 7.25, 1.0];
        let ema = ema_of_series(&values, 1);
        for (e, v) in ema.iter().zip(values) {
            assert_approx(*e, v, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn undefined_input_stops_the_line() {
        assert!(ema_of_series(&[1.0, f64::NAN, 3.0, 4.0], 2)
            .iter()
            .all(|v| v.is_nan()));

        let ema = ema_of_series(&[1.0, 3.0, 5.0, f64::NAN, 9.0], 2);
        assert_approx(ema[1], 2.0, DEFAULT_EPSILON);
        assert!(ema[3].is_nan() && ema[4].is_nan());
    }

    #[test]
    fn too_short_or_zero_period() {
        assert!(ema_of_series(&[1.0, 2.0], 3).iter().all(|v| v.is_nan()));
        assert!(ema_of_series(&[1.0, 2.0], 0).iter().all(|v| v.is_nan()));
        assert!(ema_of_series(&[], 12).is_empty());
    }
}
