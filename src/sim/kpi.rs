//! Post-hoc KPI computation from simulation results.

use std::fmt;

use serde::Serialize;

use super::types::StepResult;

/// Cost per unit of consumption.
pub const CONSUMPTION_COST: f64 = 0.015;
/// Credit per unit of PV production.
pub const PV_CREDIT: f64 = 0.08;
/// Credit per unit of traded energy.
pub const TRADE_CREDIT: f64 = 0.03;
/// Grid carbon intensity avoided per kWh of PV (kg CO2).
pub const CO2_KG_PER_KWH: f64 = 0.45;

/// Rounds `value` to `decimals` places, half away from zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Aggregate key performance indicators derived from a complete simulation run.
///
/// Computed post-hoc from `&[StepResult]` to ensure consistency between
/// step data and reported metrics. Every figure is rounded as displayed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KpiReport {
    /// Net cost of the run, 2 decimals.
    pub total_cost: f64,
    /// PV energy (kWh), 1 decimal.
    pub total_pv_kwh: f64,
    /// Consumed energy (kWh), 1 decimal.
    pub total_consumption_kwh: f64,
    /// Mean comfort score, 3 decimals.
    pub avg_comfort: f64,
    /// CO2 avoided (kg), 1 decimal, derived from the rounded PV figure.
    pub co2_saved_kg: f64,
    /// Value of traded energy, 2 decimals.
    pub trading_savings: f64,
}

impl KpiReport {
    /// Computes all KPIs from the complete step record vector.
    ///
    /// Returns all zeros for an empty slice.
    pub fn from_results(results: &[StepResult]) -> Self {
        if results.is_empty() {
            return Self::default();
        }

        let mut consumption = 0.0_f64;
        let mut pv = 0.0_f64;
        let mut traded = 0.0_f64;
        let mut comfort = 0.0_f64;
        for r in results {
            consumption += r.consumption;
            pv += r.pv;
            traded += r.traded;
            comfort += r.comfort;
        }

        let total_pv_kwh = round_to(pv / 1000.0, 1);
        Self {
            total_cost: round_to(
                consumption * CONSUMPTION_COST - pv * PV_CREDIT - traded * TRADE_CREDIT,
                2,
            ),
            total_pv_kwh,
            total_consumption_kwh: round_to(consumption / 1000.0, 1),
            avg_comfort: round_to(comfort / results.len() as f64, 3),
            co2_saved_kg: round_to(total_pv_kwh * CO2_KG_PER_KWH, 1),
            trading_savings: round_to(traded * TRADE_CREDIT / 1000.0, 2),
        }
    }
}

impl fmt::Display for KpiReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- KPI Report ---")?;
        writeln!(f, "Total cost:            {:.2}", self.total_cost)?;
        writeln!(f, "PV production:         {:.1} kWh", self.total_pv_kwh)?;
        writeln!(f, "Consumption:           {:.1} kWh", self.total_consumption_kwh)?;
        writeln!(f, "Average comfort:       {:.3}", self.avg_comfort)?;
        writeln!(f, "CO2 saved:             {:.1} kg", self.co2_saved_kg)?;
        write!(f, "Trading savings:       {:.2}", self.trading_savings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_result(consumption: f64, pv: f64, comfort: f64) -> StepResult {
        StepResult {
            timestep: 0,
            outdoor_temp_c: 10.0,
            irradiance_w_m2: 0.0,
            action: 0.0,
            used_fallback: false,
            consumption,
            pv,
            hvac: 0.0,
            indoor_temp_c: 22.0,
            comfort,
            soc: 0.0,
            battery_flow: 0.0,
            traded: 0.0,
            trade_price: 0.0,
        }
    }

    #[test]
    fn totals_and_rounding() {
        let results = vec![
            make_result(1000.0, 600.0, 1.0),
            make_result(1500.0, 900.0, 0.5),
            make_result(500.0, 0.0, 0.25),
        ];
        let kpi = KpiReport::from_results(&results);
        // Σcons = 3000, Σpv = 1500
        assert_eq!(kpi.total_consumption_kwh, 3.0);
        assert_eq!(kpi.total_pv_kwh, 1.5);
        // 3000 × 0.015 − 1500 × 0.08 = 45 − 120
        assert_eq!(kpi.total_cost, -75.0);
        assert_eq!(kpi.avg_comfort, 0.583);
        assert_eq!(kpi.co2_saved_kg, 0.7);
        assert_eq!(kpi.trading_savings, 0.0);
    }

    #[test]
    fn co2_uses_rounded_pv() {
        // 1.049 kWh rounds to 1.0 before the CO2 factor applies
        let kpi = KpiReport::from_results(&[make_result(0.0, 1049.0, 1.0)]);
        assert_eq!(kpi.total_pv_kwh, 1.0);
        assert_eq!(kpi.co2_saved_kg, round_to(1.0 * 0.45, 1));
    }

    #[test]
    fn round_to_places() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(-1.25, 1), -1.3);
        assert_eq!(round_to(0.5833333, 3), 0.583);
    }

    #[test]
    fn empty_results() {
        let kpi = KpiReport::from_results(&[]);
        assert_eq!(kpi, KpiReport::default());
        assert_eq!(kpi.total_cost, 0.0);
    }

    #[test]
    fn display_lists_every_kpi() {
        let text = KpiReport::from_results(&[make_result(100.0, 50.0, 1.0)]).to_string();
        for label in ["Total cost", "PV production", "Consumption", "comfort", "CO2", "Trading"] {
            assert!(text.contains(label), "missing {label}");
        }
    }
}
