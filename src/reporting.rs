//! Plain-text reports for the command-line front end.

use std::fmt::{self, Write as _};

use crate::runner::SimulationOutcome;
use crate::session::History;
use crate::sim::kpi::KpiReport;

/// Display currency for cost figures. Amounts are never converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    Eur,
    Mad,
}

impl Currency {
    /// Moroccan dirham for `MA`, euro everywhere else.
    pub fn for_country(country_code: &str) -> Self {
        if country_code.trim().eq_ignore_ascii_case("MA") {
            Currency::Mad
        } else {
            Currency::Eur
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Mad => "MAD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// KPI block with monetary lines tagged in `currency`.
pub fn render_kpi_report(kpi: &KpiReport, currency: Currency) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "--- KPI Report ---");
    let _ = writeln!(out, "Total cost:            {:.2} {currency}", kpi.total_cost);
    let _ = writeln!(out, "PV production:         {:.1} kWh", kpi.total_pv_kwh);
    let _ = writeln!(out, "Consumption:           {:.1} kWh", kpi.total_consumption_kwh);
    let _ = writeln!(out, "Average comfort:       {:.3}", kpi.avg_comfort);
    let _ = writeln!(out, "CO2 saved:             {:.1} kg", kpi.co2_saved_kg);
    let _ = write!(out, "Trading savings:       {:.2} {currency}", kpi.trading_savings);
    out
}

/// KPI block and run summary, followed by a fallback notice when the
/// controller misbehaved.
pub fn render_outcome(outcome: &SimulationOutcome, currency: Currency) -> String {
    let mut out = render_kpi_report(&outcome.kpis, currency);
    let _ = write!(out, "\n{}", outcome.summary);
    if outcome.fallback_steps > 0 {
        let _ = write!(
            out,
            "\nFallback steps:        {} of {}",
            outcome.fallback_steps,
            outcome.results.len()
        );
    }
    out
}

/// Table of recorded runs, oldest first. Each cost is tagged with the
/// currency of its own run's site.
pub fn render_history(history: &History) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "--- Run History ---");
    let _ = writeln!(
        out,
        "{:<19}  {:<20}  {:>12}  {:<3}  {:>9}  {:>7}  {:>8}",
        "date", "label", "cost", "cur", "pv (kWh)", "comfort", "co2 (kg)"
    );
    for e in history {
        let _ = writeln!(
            out,
            "{:<19}  {:<20}  {:>12.2}  {:<3}  {:>9.1}  {:>7.3}  {:>8.1}",
            e.date.format("%Y-%m-%d %H:%M:%S").to_string(),
            e.label,
            e.cost,
            Currency::for_country(&e.country_code),
            e.pv,
            e.comfort,
            e.co2_saved_kg
        );
    }
    let _ = write!(out, "{} run(s)", history.len());
    out
}
