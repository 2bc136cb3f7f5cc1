//! CLI argument definitions.
//!
//! All arguments are defined with clap's derive macros. The main entry point
//! is the [`Cli`] struct.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Compass - course planning and readiness analysis.
#[derive(Debug, Parser)]
#[command(name = "compass")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides ~/.compass/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding per-student records (overrides config)
    #[arg(long, global = true, env = "COMPASS_DATA_ROOT")]
    pub data_root: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check whether a unit can be taken this semester
    Eligibility(EligibilityArgs),

    /// List the default core units for the semester being planned
    Cores(CoresArgs),

    /// List electives open this semester, with remaining slots
    Electives(ElectivesArgs),

    /// Recommend electives matching an interest
    Recommend(RecommendArgs),

    /// Analyze readiness for a unit against a planned semester
    Readiness(ReadinessArgs),

    /// Analyze the impact of adding one more unit to a plan
    AddUnit(AddUnitArgs),

    /// Save a semester plan
    SavePlan(SavePlanArgs),

    /// View semester grades or enter results for planned units
    Results(ResultsArgs),

    /// Show full catalog detail for a unit
    Unit(UnitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// The student being planned for; shared by most subcommands.
#[derive(Debug, Clone, Args)]
pub struct ProfileArgs {
    /// Student username
    #[arg(short, long)]
    pub username: String,

    /// Stream: 1 = Data Science, 2 = Algorithms & Software
    #[arg(short, long)]
    pub stream: u8,

    /// Academic year being planned (1-3)
    #[arg(short, long)]
    pub year: u8,

    /// Semester being planned (1-2), in the student's own numbering
    #[arg(short = 'm', long)]
    pub semester: u8,

    /// Intake: 1 = February, 2 = July
    #[arg(short, long)]
    pub intake: u8,
}

/// Arguments for the `eligibility` command.
#[derive(Debug, Clone, Args)]
pub struct EligibilityArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Unit code to check
    #[arg(long)]
    pub unit: String,

    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `cores` command.
#[derive(Debug, Clone, Args)]
pub struct CoresArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `electives` command.
#[derive(Debug, Clone, Args)]
pub struct ElectivesArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `recommend` command.
#[derive(Debug, Clone, Args)]
pub struct RecommendArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Elective level to draw from (1-3)
    #[arg(short, long)]
    pub level: u8,

    /// Free-text interest to match against unit descriptions
    #[arg(long)]
    pub interest: String,

    /// Maximum number of recommendations
    #[arg(long, default_value_t = 5)]
    pub count: usize,

    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `readiness` command.
#[derive(Debug, Clone, Args)]
pub struct ReadinessArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Unit under analysis
    #[arg(long)]
    pub unit: String,

    /// The planned semester, comma-separated unit codes
    #[arg(long, value_delimiter = ',')]
    pub planned: Vec<String>,

    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `add-unit` command.
#[derive(Debug, Clone, Args)]
pub struct AddUnitArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Unit being added
    #[arg(long)]
    pub unit: String,

    /// Units already in the plan, comma-separated
    #[arg(long, value_delimiter = ',')]
    pub existing: Vec<String>,

    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `save-plan` command.
#[derive(Debug, Clone, Args)]
pub struct SavePlanArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Selected core units, comma-separated
    #[arg(long, value_delimiter = ',')]
    pub core: Vec<String>,

    /// Selected electives, comma-separated
    #[arg(long, value_delimiter = ',')]
    pub elective: Vec<String>,

    /// Core units deferred out of this semester, comma-separated
    #[arg(long, value_delimiter = ',')]
    pub defer: Vec<String>,
}

/// Arguments for the `results` command.
#[derive(Debug, Clone, Args)]
pub struct ResultsArgs {
    /// Student username
    #[arg(short, long)]
    pub username: String,

    /// Semester record to update, e.g. Y1S2
    #[arg(long)]
    pub period: Option<String>,

    /// Grades to enter, as CODE=GRADE pairs (grades: HD, D, C, P, F)
    #[arg(long = "set", value_delimiter = ',')]
    pub grades: Vec<String>,

    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `unit` command.
#[derive(Debug, Clone, Args)]
pub struct UnitArgs {
    /// Unit code to show
    pub unit: String,

    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_an_eligibility_invocation() {
        let cli = Cli::try_parse_from([
            "compass",
            "eligibility",
            "--username",
            "alice",
            "--stream",
            "1",
            "--year",
            "2",
            "--semester",
            "1",
            "--intake",
            "1",
            "--unit",
            "FIT2004",
        ])
        .unwrap();
        match cli.command {
            Commands::Eligibility(args) => {
                assert_eq!(args.profile.username, "alice");
                assert_eq!(args.unit, "FIT2004");
                assert!(!args.json);
            }
            other => panic!("wrong command: {other:?}"),
        }
    }

    #[test]
    fn comma_separated_plan_lists() {
        let cli = Cli::try_parse_from([
            "compass",
            "save-plan",
            "--username",
            "alice",
            "--stream",
            "1",
            "--year",
            "1",
            "--semester",
            "1",
            "--intake",
            "1",
            "--core",
            "FIT1045,FIT1047,FIT1008",
            "--elective",
            "FIT2102",
        ])
        .unwrap();
        match cli.command {
            Commands::SavePlan(args) => {
                assert_eq!(args.core.len(), 3);
                assert_eq!(args.elective, vec!["FIT2102"]);
                assert!(args.defer.is_empty());
            }
            other => panic!("wrong command: {other:?}"),
        }
    }
}
