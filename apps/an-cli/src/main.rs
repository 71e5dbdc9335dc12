use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use an_project::{load_model, write_steady, write_transient, ProjectResult};
use an_sim::TransientSimulation;
use an_solver::{Solver, SolverMethod};

#[derive(Parser)]
#[command(name = "an-cli")]
#[command(about = "airnet - multi-zone airflow and contaminant transport simulation", long_about = None)]
struct Cli {
    /// Input JSON file
    #[arg(short = 'i', value_name = "FILE")]
    input: PathBuf,

    /// Output results JSON file
    #[arg(short = 'o', value_name = "FILE")]
    output: PathBuf,

    /// Solver method
    #[arg(short = 'm', value_enum, default_value = "tr")]
    method: Method,

    /// Verbose output
    #[arg(short = 'v')]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Method {
    /// Sub-relaxation
    Sur,
    /// Trust region
    Tr,
}

impl From<Method> for SolverMethod {
    fn from(m: Method) -> Self {
        match m {
            Method::Sur => SolverMethod::SubRelaxation,
            Method::Tr => SolverMethod::TrustRegion,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    // Usage errors exit with code 1; 2 is reserved for non-convergence.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let is_usage_error = err.use_stderr();
            let _ = err.print();
            return if is_usage_error {
                ExitCode::from(1)
            } else {
                // --help / --version
                ExitCode::SUCCESS
            };
        }
    };

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> ProjectResult<ExitCode> {
    if cli.verbose {
        println!("Reading input: {}", cli.input.display());
    }
    let mut model = load_model(&cli.input)?;

    if cli.verbose {
        println!(
            "Network: {} nodes, {} links",
            model.network.node_count(),
            model.network.link_count()
        );
        println!("Unknown pressures: {}", model.network.unknown_count());
        if !model.species.is_empty() {
            println!("Species: {}", model.species.len());
            println!("Sources: {}", model.sources.len());
        }
    }

    if model.wants_transient() {
        run_transient(cli, &mut model)
    } else {
        run_steady(cli, &mut model)
    }
}

fn run_steady(cli: &Cli, model: &mut an_project::ModelInput) -> ProjectResult<ExitCode> {
    let method: SolverMethod = cli.method.into();
    if cli.verbose {
        println!(
            "Solving steady-state with {} method...",
            match method {
                SolverMethod::TrustRegion => "trust region",
                SolverMethod::SubRelaxation => "sub-relaxation",
            }
        );
    }

    let solver = Solver::new(method);
    let result = solver.solve(&mut model.network);

    if cli.verbose {
        println!(
            "{} in {} iterations (max residual: {:.3e} kg/s)",
            if result.converged {
                "Converged"
            } else {
                "FAILED to converge"
            },
            result.iterations,
            result.max_residual
        );
    }

    write_steady(&cli.output, &model.network, &result)?;
    if cli.verbose {
        println!("Results written to: {}", cli.output.display());
    }

    Ok(if result.converged {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

fn run_transient(cli: &Cli, model: &mut an_project::ModelInput) -> ProjectResult<ExitCode> {
    // The CLI flag overrides the method from the input file
    model.transient.airflow_method = cli.method.into();

    if cli.verbose {
        println!(
            "Running transient simulation: {}s to {}s (dt={}s)...",
            model.transient.start_time, model.transient.end_time, model.transient.time_step
        );
    }

    let mut sim = TransientSimulation::new();
    sim.set_config(model.transient);
    sim.set_species(model.species.clone());
    sim.set_sources(model.sources.clone());
    sim.set_schedules(model.schedules.clone());
    sim.set_occupants(model.occupants.clone());

    if cli.verbose {
        sim.set_progress_callback(|t, end| {
            print!("\r  t={t:.0}/{end:.0}s");
            let _ = io::stdout().flush();
            true
        });
    }

    let result = sim.run(&mut model.network);

    if cli.verbose {
        println!(
            "\n{} ({} output steps)",
            if result.completed {
                "Completed"
            } else {
                "Incomplete"
            },
            result.history.len()
        );
    }

    write_transient(&cli.output, &model.network, &result, &model.species)?;
    if cli.verbose {
        println!("Results written to: {}", cli.output.display());
    }

    Ok(if result.completed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}
