//! Working-capital ratio engine.
//!
//! Converts the five reported figures of one [`FinancialSnapshot`] into the
//! day-count metrics of a [`MetricResult`]:
//!
//! | Metric | Formula | Defined when |
//! |--------|---------|--------------|
//! | DPO | `accounts_payable / cost_of_goods_sold * 365` | COGS is non-zero |
//! | DIO | `inventory / cost_of_goods_sold * 365` | COGS is non-zero |
//! | DSO | `accounts_receivable / revenue * 365` | revenue is non-zero |
//! | CCC | `DIO + DSO - DPO` | DPO, DIO and DSO are all defined |
//!
//! Every defined value is rounded to two decimals. CCC is computed from the
//! already-rounded components and rounded again, so `ccc` always equals
//! `round2(dio + dso - dpo)` over the values the caller sees.
//!
//! The engine never fails. A missing or non-numeric figure, or an arithmetic
//! result that is not finite, degrades the whole result to
//! [`MetricResult::undefined`]; a zero denominator only blanks the metrics
//! that divide by it. Callers decide whether an undefined metric means
//! "skip this entity" or "display N/A".
//!
//! ```
//! use cashcycle_core::{compute_metrics, FinancialSnapshot};
//!
//! let snapshot = FinancialSnapshot::new(1000.0, 600.0, 200.0, 150.0, 100.0);
//! let metrics = compute_metrics(&snapshot);
//!
//! assert_eq!(metrics.dpo, Some(60.83));
//! assert_eq!(metrics.dio, Some(91.25));
//! assert_eq!(metrics.dso, Some(73.0));
//! assert_eq!(metrics.ccc, Some(103.42));
//! ```

use serde::{Deserialize, Serialize};

/// Day-count factor applied to every ratio, for annual and quarterly snapshots alike.
pub const DAYS_IN_PERIOD: f64 = 365.0;

/// Reported figures for one entity in one reporting period.
///
/// `None` marks a figure the provider did not report as a number.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    pub revenue: Option<f64>,
    pub cost_of_goods_sold: Option<f64>,
    pub accounts_receivable: Option<f64>,
    pub inventory: Option<f64>,
    pub accounts_payable: Option<f64>,
}

impl FinancialSnapshot {
    /// Snapshot with every figure present.
    pub const fn new(
        revenue: f64,
        cost_of_goods_sold: f64,
        accounts_receivable: f64,
        inventory: f64,
        accounts_payable: f64,
    ) -> Self {
        Self {
            revenue: Some(revenue),
            cost_of_goods_sold: Some(cost_of_goods_sold),
            accounts_receivable: Some(accounts_receivable),
            inventory: Some(inventory),
            accounts_payable: Some(accounts_payable),
        }
    }

    /// True when all five figures are present and finite.
    pub fn is_complete(&self) -> bool {
        self.figures().is_some()
    }

    /// Names of the figures that are missing or not finite, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("revenue", self.revenue),
            ("cost_of_goods_sold", self.cost_of_goods_sold),
            ("accounts_receivable", self.accounts_receivable),
            ("inventory", self.inventory),
            ("accounts_payable", self.accounts_payable),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_some_and(f64::is_finite))
        .map(|(name, _)| name)
        .collect()
    }

    fn figures(&self) -> Option<Figures> {
        let finite = |value: Option<f64>| value.filter(|v| v.is_finite());
        Some(Figures {
            revenue: finite(self.revenue)?,
            cost_of_goods_sold: finite(self.cost_of_goods_sold)?,
            accounts_receivable: finite(self.accounts_receivable)?,
            inventory: finite(self.inventory)?,
            accounts_payable: finite(self.accounts_payable)?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct Figures {
    revenue: f64,
    cost_of_goods_sold: f64,
    accounts_receivable: f64,
    inventory: f64,
    accounts_payable: f64,
}

/// Derived day-count metrics; `None` means undefined.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricResult {
    /// Days payable outstanding.
    pub dpo: Option<f64>,
    /// Days inventory outstanding.
    pub dio: Option<f64>,
    /// Days sales outstanding.
    pub dso: Option<f64>,
    /// Cash conversion cycle.
    pub ccc: Option<f64>,
}

impl MetricResult {
    /// All four metrics undefined.
    pub const fn undefined() -> Self {
        Self {
            dpo: None,
            dio: None,
            dso: None,
            ccc: None,
        }
    }

    /// True when all four metrics are defined.
    pub const fn is_complete(&self) -> bool {
        self.dpo.is_some() && self.dio.is_some() && self.dso.is_some() && self.ccc.is_some()
    }

    /// True when no metric is defined.
    pub const fn is_undefined(&self) -> bool {
        self.dpo.is_none() && self.dio.is_none() && self.dso.is_none() && self.ccc.is_none()
    }
}

/// Computes DPO, DIO, DSO and CCC for one snapshot. Pure and total.
pub fn compute_metrics(snapshot: &FinancialSnapshot) -> MetricResult {
    let Some(figures) = snapshot.figures() else {
        return MetricResult::undefined();
    };

    // -0.0 compares equal to 0.0, so it also blanks the ratio.
    let over_cogs = |numerator: f64| {
        (figures.cost_of_goods_sold != 0.0)
            .then(|| numerator / figures.cost_of_goods_sold * DAYS_IN_PERIOD)
    };
    let dpo = over_cogs(figures.accounts_payable);
    let dio = over_cogs(figures.inventory);
    let dso = (figures.revenue != 0.0)
        .then(|| figures.accounts_receivable / figures.revenue * DAYS_IN_PERIOD);

    if [dpo, dio, dso]
        .into_iter()
        .flatten()
        .any(|value| !value.is_finite())
    {
        return MetricResult::undefined();
    }

    let (dpo, dio, dso) = (dpo.map(round2), dio.map(round2), dso.map(round2));
    let ccc = match (dpo, dio, dso) {
        (Some(dpo), Some(dio), Some(dso)) => Some(round2(dio + dso - dpo)),
        _ => None,
    };
    if ccc.is_some_and(|value| !value.is_finite()) {
        return MetricResult::undefined();
    }

    MetricResult { dpo, dio, dso, ccc }
}

/// Rounds to two decimals, ties to even on the exact binary value.
///
/// Goes through the decimal formatter rather than `(x * 100.0).round() / 100.0`,
/// which double-rounds values such as `1.005`.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.2}").parse().unwrap_or(value)
}
