//! Derived run analytics: self-sufficiency, battery trajectory, and trading.

use std::fmt;

use serde::Serialize;

use super::types::StepResult;

/// Figures derived from a finished run, alongside the [`KpiReport`](super::kpi::KpiReport).
///
/// Unlike the KPIs these are left unrounded; display code picks the precision.
/// SOC figures are in energy units, as recorded after each step.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    /// PV production as a percentage of consumption; 0 without consumption.
    pub self_sufficiency_pct: f64,
    /// SOC after the first step.
    pub initial_soc: f64,
    /// SOC after the last step.
    pub final_soc: f64,
    /// `final_soc − initial_soc`.
    pub delta_soc: f64,
    /// Final SOC as a percentage of total capacity; 0 without storage.
    pub final_soc_pct: f64,
    /// Mean SOC over the run.
    pub avg_soc: f64,
    /// Sum of traded volumes.
    pub total_traded: f64,
    /// Mean trading price over all steps.
    pub avg_trade_price: f64,
    /// Largest single-step traded volume.
    pub peak_trade: f64,
}

impl RunSummary {
    /// Summarizes `results` for a microgrid storing at most `total_capacity`.
    ///
    /// Returns all zeros for an empty slice.
    pub fn from_results(results: &[StepResult], total_capacity: f64) -> Self {
        let (Some(first), Some(last)) = (results.first(), results.last()) else {
            return Self::default();
        };
        let n = results.len() as f64;

        let mut consumption = 0.0_f64;
        let mut pv = 0.0_f64;
        let mut soc = 0.0_f64;
        let mut traded = 0.0_f64;
        let mut price = 0.0_f64;
        let mut peak_trade = f64::NEG_INFINITY;
        for r in results {
            consumption += r.consumption;
            pv += r.pv;
            soc += r.soc;
            traded += r.traded;
            price += r.trade_price;
            peak_trade = peak_trade.max(r.traded);
        }

        Self {
            self_sufficiency_pct: if consumption > 0.0 {
                pv / consumption * 100.0
            } else {
                0.0
            },
            initial_soc: first.soc,
            final_soc: last.soc,
            delta_soc: last.soc - first.soc,
            final_soc_pct: if total_capacity > 0.0 {
                last.soc / total_capacity * 100.0
            } else {
                0.0
            },
            avg_soc: soc / n,
            total_traded: traded,
            avg_trade_price: price / n,
            peak_trade,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Run Summary ---")?;
        writeln!(f, "Self-sufficiency:      {:.1} %", self.self_sufficiency_pct)?;
        writeln!(
            f,
            "Battery SOC:           {:.1} -> {:.1} ({:+.1}), {:.1} % of capacity",
            self.initial_soc, self.final_soc, self.delta_soc, self.final_soc_pct
        )?;
        writeln!(f, "Average SOC:           {:.1}", self.avg_soc)?;
        write!(
            f,
            "Traded:                {:.1} total, peak {:.1}, avg price {:.2}",
            self.total_traded, self.peak_trade, self.avg_trade_price
        )
    }
}
