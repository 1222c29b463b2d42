mod error;

use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use bs_components::default_factory;
use bs_sim::Project;
use error::{CliError, CliResult};

#[derive(Parser)]
#[command(name = "bs-cli")]
#[command(about = "bsim CLI - building simulation projects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a definition and check the project
    Check {
        /// Path to the definition file (.yaml, .yml or .json)
        project_path: PathBuf,
    },
    /// Print the execution order of the project's components
    Order {
        /// Path to the definition file
        project_path: PathBuf,
    },
    /// Run the simulation
    Run {
        /// Path to the definition file
        project_path: PathBuf,
        /// Variables to export, as component.variable
        #[arg(short, long = "variable")]
        variables: Vec<String>,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> CliResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { project_path } => cmd_check(&project_path),
        Commands::Order { project_path } => cmd_order(&project_path),
        Commands::Run {
            project_path,
            variables,
            output,
        } => cmd_run(&project_path, &variables, output.as_deref()),
    }
}

/// Load a definition file, picking the format from its extension.
fn load(project_path: &Path) -> CliResult<(Project, Vec<String>)> {
    let mut project = Project::new("project", default_factory());
    let is_json = project_path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let errors = if is_json {
        bs_project::read_json(&mut project, project_path)?
    } else {
        bs_project::read_yaml(&mut project, project_path)?
    };
    Ok((project, errors))
}

fn cmd_check(project_path: &Path) -> CliResult<()> {
    println!("Checking project file: {}", project_path.display());
    let (_, errors) = load(project_path)?;
    if !errors.is_empty() {
        return Err(CliError::Check(errors.len()));
    }
    println!("✓ Project is valid");
    Ok(())
}

fn cmd_order(project_path: &Path) -> CliResult<()> {
    let (project, _) = load(project_path)?;
    let order = project.ordered_component_list();
    if order.is_empty() {
        println!("No components found in project");
        return Ok(());
    }
    println!("Execution order:");
    for (i, id) in order.iter().enumerate() {
        if let Some(component) = project.get(*id) {
            let registered = if project.component_list().contains(id) {
                ""
            } else {
                "  (unregistered)"
            };
            println!(
                "  {:>3}. {} ({}){}",
                i + 1,
                component.name(),
                component.type_name(),
                registered
            );
        }
    }
    Ok(())
}

fn cmd_run(project_path: &Path, variables: &[String], output: Option<&Path>) -> CliResult<()> {
    let (mut project, errors) = load(project_path)?;
    if !errors.is_empty() {
        return Err(CliError::Check(errors.len()));
    }

    let summary = project.simulate()?;
    println!("✓ Simulation completed: {}", project.name());
    println!("  Steps: {}", summary.steps.len());
    println!("  Iteration passes: {}", summary.total_passes());
    let unconverged = summary.unconverged_steps();
    if !unconverged.is_empty() {
        tracing::warn!(steps = unconverged.len(), "steps reached the iteration cap");
        println!("  Unconverged steps: {}", unconverged.len());
    }

    if variables.is_empty() {
        return Ok(());
    }
    let csv = export_csv(&project, variables)?;
    match output {
        Some(path) => {
            std::fs::write(path, csv)?;
            println!("✓ Exported {} variable(s) to {}", variables.len(), path.display());
        }
        None => print!("{csv}"),
    }
    Ok(())
}

/// One row per step: the timestamp followed by each requested variable.
fn export_csv(project: &Project, variables: &[String]) -> CliResult<String> {
    let mut columns = Vec::with_capacity(variables.len());
    for spec in variables {
        let (component, key) = spec
            .rsplit_once('.')
            .ok_or_else(|| CliError::InvalidInput(format!("'{spec}' is not component.variable")))?;
        let values = project
            .component(component)
            .ok_or_else(|| CliError::InvalidInput(format!("component '{component}' not found")))?
            .core()
            .variable(key)
            .map_err(|e| CliError::InvalidInput(e.to_string()))?
            .values()
            .to_vec();
        columns.push(values);
    }

    let mut csv = String::from("date");
    for spec in variables {
        let _ = write!(csv, ",{spec}");
    }
    csv.push('\n');
    for (i, date) in project.dates()?.iter().enumerate() {
        let _ = write!(csv, "{}", date.format(bs_sim::DATE_FORMAT));
        for column in &columns {
            match column.get(i) {
                Some(v) => {
                    let _ = write!(csv, ",{v}");
                }
                None => csv.push(','),
            }
        }
        csv.push('\n');
    }
    Ok(csv)
}
