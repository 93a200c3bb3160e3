//! hybrid-sizer entry point: CLI wiring and config-driven optimisation.

use std::process;

use clap::Parser;
use tracing::debug;

use hybrid_sizer::cli::Cli;
use hybrid_sizer::config::ScenarioConfig;
use hybrid_sizer::io::export::{export_candidates_csv, export_dispatch_csv, export_summary_csv};
use hybrid_sizer::logging;
use hybrid_sizer::optimize_with;
use hybrid_sizer::optimizer::control::RunControl;
use hybrid_sizer::optimizer::grid::GridSearch;

/// Candidates between progress log lines.
const PROGRESS_EVERY: usize = 100;

fn exit_with(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    process::exit(1);
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if cli.list_presets {
        for name in ScenarioConfig::PRESETS {
            println!("{name}");
        }
        return;
    }

    let scenario = cli.scenario_config().unwrap_or_else(|e| exit_with(e));

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let table = scenario.cost_table().unwrap_or_else(|e| exit_with(e));

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = hybrid_sizer::api::AppState::new(Arc::new(table))
            .with_search(GridSearch::new(scenario.search.clone()));
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new()
            .unwrap_or_else(|e| exit_with(format!("failed to create tokio runtime: {e}")));
        if let Err(e) = rt.block_on(hybrid_sizer::api::serve(Arc::new(state), addr)) {
            exit_with(format!("server error: {e}"));
        }
        return;
    }

    let strategy = GridSearch::new(scenario.search.clone())
        .parallel(!cli.sequential)
        .keep_evaluations(cli.candidates_out.is_some());
    let control = RunControl::new().with_progress(PROGRESS_EVERY, |p| {
        debug!(
            evaluated = p.evaluated,
            total = p.total,
            pct = p.fraction() * 100.0,
            "search progress"
        );
    });

    let result = optimize_with(&scenario.to_params(), &strategy, &table, &control)
        .unwrap_or_else(|e| exit_with(e));

    if cli.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{json}"),
            Err(e) => exit_with(format!("failed to serialize result: {e}")),
        }
    } else {
        println!("Site: {}", scenario.site.name);
        println!("{result}");
        println!("\nRepresentative day (MW):");
        for h in &result.representative_dispatch {
            println!("{h}");
        }
    }

    if let Some(ref path) = cli.dispatch_out {
        if let Err(e) = export_dispatch_csv(&result.dispatch_trace, path) {
            exit_with(format!("failed to write dispatch CSV: {e}"));
        }
        eprintln!("Dispatch trace written to {}", path.display());
    }
    if let Some(ref path) = cli.summary_out {
        if let Err(e) = export_summary_csv(&result.representative_dispatch, path) {
            exit_with(format!("failed to write summary CSV: {e}"));
        }
        eprintln!("Representative day written to {}", path.display());
    }
    if let Some(ref path) = cli.candidates_out {
        if let Err(e) = export_candidates_csv(&result.candidates, path) {
            exit_with(format!("failed to write candidate CSV: {e}"));
        }
        eprintln!("Candidate table written to {}", path.display());
    }
}
