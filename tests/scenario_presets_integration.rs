use std::process::{Command, Output};

#[derive(Debug)]
struct Kpis {
    total_cost: f64,
    currency: String,
    pv_kwh: f64,
    avg_comfort: f64,
    co2_saved_kg: f64,
}

#[test]
fn presets_run_via_cli_and_produce_distinct_results() {
    let default = run_and_parse_kpis(&["run", "--preset", "default"]);
    let summer = run_and_parse_kpis(&["run", "--preset", "summer_solar"]);
    let no_storage = run_and_parse_kpis(&["run", "--preset", "no_storage"]);

    assert!(
        summer.pv_kwh > default.pv_kwh,
        "expected summer_solar to out-produce default: summer={:.1}, default={:.1}",
        summer.pv_kwh,
        default.pv_kwh
    );
    // nothing is exported, so storage only moves energy in time
    assert_eq!(default.total_cost, no_storage.total_cost);
    assert_eq!(default.pv_kwh, no_storage.pv_kwh);
    assert_eq!(default.co2_saved_kg, no_storage.co2_saved_kg);
    for k in [&default, &summer, &no_storage] {
        assert_eq!(k.currency, "EUR");
        assert!((0.0..=1.0).contains(&k.avg_comfort), "{k:?}");
    }
}

#[test]
fn scenario_files_match_matching_presets() {
    let from_file = run_and_parse_kpis(&["run", "--scenario", "scenarios/default.toml"]);
    let from_preset = run_and_parse_kpis(&["run", "--preset", "default"]);

    assert_eq!(from_file.total_cost, from_preset.total_cost);
    assert_eq!(from_file.pv_kwh, from_preset.pv_kwh);
    assert_eq!(from_file.avg_comfort, from_preset.avg_comfort);
}

#[test]
fn seed_override_is_deterministic() {
    let a = run_and_parse_kpis(&["run", "--preset", "summer_solar", "--seed", "11"]);
    let b = run_and_parse_kpis(&["run", "--preset", "summer_solar", "--seed", "11"]);
    assert_eq!(a.total_cost, b.total_cost);
    assert_eq!(a.pv_kwh, b.pv_kwh);
}

#[test]
fn moroccan_site_reports_dirham() {
    let output = run_cli(&["run", "--scenario", "scenarios/casablanca_summer.toml"]);
    let stdout = stdout_of(&output);
    let kpis = parse_kpis(&stdout);

    assert_eq!(kpis.currency, "MAD");
    assert!(stdout.contains("Scenario: casablanca_summer (3 buildings, 168 h, seed 7)"));
    assert!(kpis.pv_kwh > 0.0);
}

#[test]
fn broken_formula_falls_back_on_every_step() {
    let output = run_cli(&["run", "--scenario", "scenarios/broken_formula.toml"]);
    let stdout = stdout_of(&output);

    assert!(
        stdout.contains("Fallback steps:        48 of 48"),
        "stdout was:\n{stdout}"
    );
}

#[test]
fn invalid_scenario_exits_non_zero() {
    let output = Command::new(env!("CARGO_BIN_EXE_microgrid-sim"))
        .args(["run", "--scenario", "scenarios/invalid.toml"])
        .output()
        .expect("microgrid-sim process should run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("simulation.buildings"), "stderr was:\n{stderr}");
    assert!(stderr.contains("simulation.horizon_hours"), "stderr was:\n{stderr}");
    assert!(stderr.contains("battery.initial_soc"), "stderr was:\n{stderr}");
}

#[test]
fn missing_scenario_file_exits_non_zero() {
    let output = Command::new(env!("CARGO_BIN_EXE_microgrid-sim"))
        .args(["run", "--scenario", "scenarios/does_not_exist.toml"])
        .output()
        .expect("microgrid-sim process should run");
    assert!(!output.status.success());
}

#[test]
fn steps_flag_prints_one_line_per_hour() {
    let output = run_cli(&["run", "--scenario", "scenarios/broken_formula.toml", "--steps"]);
    let stdout = stdout_of(&output);
    let step_lines = stdout.lines().filter(|l| l.starts_with("t=")).count();
    assert_eq!(step_lines, 48);
}

#[test]
fn dated_scenario_stamps_step_lines() {
    let output = run_cli(&["run", "--scenario", "scenarios/casablanca_summer.toml", "--steps"]);
    let stdout = stdout_of(&output);
    let second = stdout
        .lines()
        .find(|l| l.starts_with("t=   1"))
        .expect("step 1 line");
    assert!(second.ends_with("| 2025-07-01 01:00:00"), "line was: {second}");
}

#[test]
fn batch_runs_every_preset_and_prints_history() {
    let output = run_cli(&["batch"]);
    let stdout = stdout_of(&output);

    for preset in ["default", "summer_solar", "no_storage"] {
        assert!(stdout.contains(&format!("== {preset} ==")), "missing {preset}");
    }
    assert!(stdout.contains("--- Run History ---"));
    assert!(stdout.trim_end().ends_with("3 run(s)"), "stdout was:\n{stdout}");
}

#[test]
fn batch_with_explicit_sources() {
    let output = run_cli(&[
        "batch",
        "--preset",
        "no_storage",
        "--scenario",
        "scenarios/broken_formula.toml",
    ]);
    let stdout = stdout_of(&output);
    assert!(stdout.contains("== no_storage =="));
    assert!(stdout.contains("== broken_formula =="));
    assert!(stdout.trim_end().ends_with("2 run(s)"));
}

#[test]
fn run_prints_summary_after_kpis() {
    let output = run_cli(&["run", "--preset", "default"]);
    let stdout = stdout_of(&output);
    let kpi_at = stdout.find("--- KPI Report ---").expect("kpi block");
    let summary_at = stdout.find("--- Run Summary ---").expect("summary block");
    assert!(kpi_at < summary_at);

    let pct = parse_number(
        first_token(value_after(&stdout, "Self-sufficiency:")),
        "Self-sufficiency",
    );
    assert!(pct >= 0.0);
    assert!(stdout.contains("% of capacity"));
}

#[test]
fn batch_history_tags_each_run_with_its_site_currency() {
    let output = run_cli(&[
        "batch",
        "--scenario",
        "scenarios/casablanca_summer.toml",
        "--preset",
        "default",
    ]);
    let stdout = stdout_of(&output);
    let history = &stdout[stdout.find("--- Run History ---").expect("history table")..];
    let row = |label: &str| {
        history
            .lines()
            .find(|l| l.contains(label))
            .unwrap_or_else(|| panic!("no history row for {label}:\n{history}"))
    };

    assert!(row("casablanca_summer").contains(" MAD "), "{history}");
    assert!(row("default").contains(" EUR "), "{history}");
}

fn run_cli(args: &[&str]) -> Output {
    let output = Command::new(env!("CARGO_BIN_EXE_microgrid-sim"))
        .args(args)
        .output()
        .expect("microgrid-sim process should run");

    assert!(
        output.status.success(),
        "run failed for {args:?}: stderr={} ",
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("stdout should be valid UTF-8")
}

fn run_and_parse_kpis(args: &[&str]) -> Kpis {
    let output = run_cli(args);
    parse_kpis(&stdout_of(&output))
}

fn parse_kpis(stdout: &str) -> Kpis {
    let (total_cost, currency) = {
        let rest = value_after(stdout, "Total cost:");
        let mut parts = rest.split_whitespace();
        let amount = parse_number(parts.next().unwrap_or_default(), "Total cost");
        (amount, parts.next().unwrap_or_default().to_string())
    };

    Kpis {
        total_cost,
        currency,
        pv_kwh: parse_number(first_token(value_after(stdout, "PV production:")), "PV production"),
        avg_comfort: parse_number(
            first_token(value_after(stdout, "Average comfort:")),
            "Average comfort",
        ),
        co2_saved_kg: parse_number(first_token(value_after(stdout, "CO2 saved:")), "CO2 saved"),
    }
}

fn value_after<'a>(stdout: &'a str, label: &str) -> &'a str {
    stdout
        .lines()
        .find_map(|l| l.strip_prefix(label))
        .unwrap_or_else(|| panic!("missing `{label}` line in output:\n{stdout}"))
        .trim()
}

fn first_token(s: &str) -> &str {
    s.split_whitespace().next().unwrap_or_default()
}

fn parse_number(s: &str, what: &str) -> f64 {
    s.parse::<f64>()
        .unwrap_or_else(|e| panic!("failed to parse {what} from `{s}`: {e}"))
}
