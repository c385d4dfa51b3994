//! Microgrid simulator entry point: CLI wiring, runs, and reports.

mod cli;

use std::process::ExitCode;

use chrono::Local;
use clap::Parser;

use microgrid_sim::error::Result;
use microgrid_sim::io::weather_csv::read_weather_csv;
use microgrid_sim::reporting::{Currency, render_history, render_outcome};
use microgrid_sim::runner::{SimulationOutcome, run_scenario, run_with_weather};
use microgrid_sim::session::Session;
use microgrid_sim::sim::clock::Clock;
use microgrid_sim::telemetry::init_tracing;

use cli::{BatchArgs, Cli, Command, RunArgs};

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run(args) => run(args),
        Command::Batch(args) => batch(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: RunArgs) -> Result<()> {
    let source = args.source();
    let label = source.label();
    let scenario = source.load(args.seed)?;

    let outcome = match &args.weather_csv {
        Some(path) => run_with_weather(&scenario, read_weather_csv(path)?)?,
        None => run_scenario(&scenario)?,
    };

    let currency = Currency::for_country(&scenario.site.country_code);
    println!(
        "Scenario: {label} ({} buildings, {} h, seed {})",
        scenario.building_count(),
        scenario.simulation.horizon_hours,
        scenario.simulation.seed
    );
    if args.steps {
        let clock = scenario
            .start_date()
            .map(|d| Clock::new(scenario.simulation.horizon_hours).starting_on(d));
        for r in &outcome.results {
            match clock.as_ref().and_then(|c| c.timestamp(r.timestep)) {
                Some(ts) => println!("{r} | {ts}"),
                None => println!("{r}"),
            }
        }
    }
    println!("\n{}", render_outcome(&outcome, currency));

    let mut session = Session::new(scenario);
    session.record(label, outcome, Local::now().naive_local());

    #[cfg(feature = "api")]
    if args.serve {
        serve(session, args.port)?;
    }

    Ok(())
}

fn batch(args: BatchArgs) -> Result<()> {
    let mut session = Session::default();

    for source in args.sources() {
        let label = source.label();
        let scenario = source.load(args.seed)?;
        let outcome: SimulationOutcome = run_scenario(&scenario)?;

        let currency = Currency::for_country(&scenario.site.country_code);
        println!("== {label} ==");
        println!("{}\n", render_outcome(&outcome, currency));

        session.config = scenario;
        session.record(label, outcome, Local::now().naive_local());
    }

    println!("{}", render_history(&session.history));
    Ok(())
}

#[cfg(feature = "api")]
fn serve(session: Session, port: u16) -> Result<()> {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use microgrid_sim::api::{AppState, serve};
    use microgrid_sim::error::Error;

    let Session {
        config,
        last_run,
        history,
    } = session;
    let outcome = last_run.unwrap_or_else(|| SimulationOutcome {
        results: Vec::new(),
        kpis: Default::default(),
        summary: Default::default(),
        fallback_steps: 0,
    });
    let state = Arc::new(AppState {
        config: config.to_sim_config()?,
        outcome,
        history,
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let rt = tokio::runtime::Runtime::new().map_err(Error::Server)?;
    rt.block_on(serve(state, addr)).map_err(Error::Server)
}
