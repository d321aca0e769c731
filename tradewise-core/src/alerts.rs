//! Price and RSI threshold alerts evaluated against the latest values.

use serde::{Deserialize, Serialize};

/// Which value an alert watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertKind {
    /// Fires when the latest close is at or above the threshold.
    Price,
    /// Fires when the latest RSI is at or below the threshold.
    Rsi,
}

/// A single threshold. A threshold of zero (or below) disables the alert.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertCondition {
    pub kind: AlertKind,
    pub threshold: f64,
}

impl AlertCondition {
    pub fn price(threshold: f64) -> Self {
        Self {
            kind: AlertKind::Price,
            threshold,
        }
    }

    pub fn rsi(threshold: f64) -> Self {
        Self {
            kind: AlertKind::Rsi,
            threshold,
        }
    }

    pub fn enabled(&self) -> bool {
        self.threshold > 0.0
    }
}

/// The pair of thresholds configured on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertConditions {
    pub price: AlertCondition,
    pub rsi: AlertCondition,
}

impl AlertConditions {
    pub fn new(price_threshold: f64, rsi_threshold: f64) -> Self {
        Self {
            price: AlertCondition::price(price_threshold),
            rsi: AlertCondition::rsi(rsi_threshold),
        }
    }
}

impl Default for AlertConditions {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// An alert that fired this cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggeredAlert {
    pub kind: AlertKind,
    pub threshold: f64,
    pub current: f64,
    pub message: String,
}

/// Outcome of one evaluation. `NotChecked` is distinct from `Clear`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum AlertStatus {
    /// Evaluation did not run (e.g. no price data).
    #[default]
    NotChecked,
    /// Evaluation ran and nothing fired.
    Clear,
    /// One or more alerts fired; price before RSI.
    Triggered(Vec<TriggeredAlert>),
}

impl AlertStatus {
    pub fn triggered(&self) -> &[TriggeredAlert] {
        match self {
            AlertStatus::Triggered(alerts) => alerts,
            _ => &[],
        }
    }

    pub fn messages(&self) -> Vec<&str> {
        self.triggered().iter().map(|a| a.message.as_str()).collect()
    }
}

/// Evaluate both thresholds.
///
/// `latest_rsi` is `None` when the RSI lookback is not yet satisfied; the RSI
/// alert is then skipped without error.
pub fn evaluate(
    ticker: &str,
    latest_close: f64,
    latest_rsi: Option<f64>,
    conditions: &AlertConditions,
) -> AlertStatus {
    let mut fired = Vec::new();

    let price = conditions.price;
    if price.enabled() && latest_close >= price.threshold {
        fired.push(TriggeredAlert {
            kind: AlertKind::Price,
            threshold: price.threshold,
            current: latest_close,
            message: format!(
                "Price alert: {ticker} >= {:.2} (current: {latest_close:.2})",
                price.threshold
            ),
        });
    }

    let rsi = conditions.rsi;
    if let Some(current) = latest_rsi.filter(|v| !v.is_nan()) {
        if rsi.enabled() && current <= rsi.threshold {
            fired.push(TriggeredAlert {
                kind: AlertKind::Rsi,
                threshold: rsi.threshold,
                current,
                message: format!(
                    "RSI alert: RSI <= {:.2} (current RSI: {current:.2})",
                    rsi.threshold
                ),
            });
        }
    }

    if fired.is_empty() {
        AlertStatus::Clear
    } else {
        AlertStatus::Triggered(fired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_alert_fires_at_or_above_threshold() {
        let status = evaluate("TSLA", 250.0, None, &AlertConditions::new(200.0, 0.0));
        assert_eq!(
            status.messages(),
            vec!["Price alert: TSLA >= 200.00 (current: 250.00)"]
        );

        let equal = evaluate("TSLA", 200.0, None, &AlertConditions::new(200.0, 0.0));
        assert_eq!(equal.triggered().len(), 1);
    }

    #[test]
    fn zero_threshold_disables_price_alert() {
        let status = evaluate("TSLA", 1_000_000.0, None, &AlertConditions::new(0.0, 0.0));
        assert_eq!(status, AlertStatus::Clear);
    }

    #[test]
    fn rsi_alert_fires_at_or_below_threshold() {
        let status = evaluate("TSLA", 10.0, Some(28.456), &AlertConditions::new(0.0, 30.0));
        assert_eq!(
            status.messages(),
            vec!["RSI alert: RSI <= 30.00 (current RSI: 28.46)"]
        );
    }

    #[test]
    fn undefined_rsi_is_skipped() {
        let conditions = AlertConditions::new(0.0, 50.0);
        assert_eq!(evaluate("X", 10.0, None, &conditions), AlertStatus::Clear);
        assert_eq!(
            evaluate("X", 10.0, Some(f64::NAN), &conditions),
            AlertStatus::Clear
        );
    }

    #[test]
    fn price_alert_precedes_rsi_alert() {
        let status = evaluate("AAPL", 190.0, Some(20.0), &AlertConditions::new(150.0, 25.0));
        let kinds: Vec<AlertKind> = status.triggered().iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![AlertKind::Price, AlertKind::Rsi]);
    }

    #[test]
    fn rsi_above_threshold_does_not_fire() {
        let status = evaluate("X", 10.0, Some(100.0), &AlertConditions::new(0.0, 50.0));
        assert_eq!(status, AlertStatus::Clear);
        let at_hundred = evaluate("X", 10.0, Some(100.0), &AlertConditions::new(0.0, 100.0));
        assert_eq!(at_hundred.triggered().len(), 1);
    }

    #[test]
    fn not_checked_is_default() {
        assert_eq!(AlertStatus::default(), AlertStatus::NotChecked);
        assert!(AlertStatus::NotChecked.triggered().is_empty());
    }
}
