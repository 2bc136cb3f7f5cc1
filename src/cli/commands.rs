//! Command implementations and dispatch.
//!
//! Each subcommand builds the engine from resolved configuration, runs one
//! query and prints either styled human output or `--json` machine output.

use std::collections::BTreeMap;

use clap::CommandFactory;
use console::style;
use serde::Serialize;

use crate::catalog::{Catalog, UnitCode};
use crate::community::SnapshotDifficultyProvider;
use crate::config::CompassConfig;
use crate::engine::PlannerEngine;
use crate::error::{CompassError, Result};
use crate::profile::StudentProfile;
use crate::readiness::ReadinessReport;
use crate::records::{Grade, PeriodKey, RecordStore};

use super::args::{
    AddUnitArgs, Cli, Commands, CompletionsArgs, CoresArgs, ElectivesArgs, EligibilityArgs,
    ProfileArgs, RecommendArgs, ReadinessArgs, ResultsArgs, SavePlanArgs, UnitArgs,
};

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    pub success: bool,
    pub exit_code: i32,
}

impl CommandResult {
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Route a parsed CLI invocation to its implementation.
pub fn dispatch(cli: &Cli) -> Result<CommandResult> {
    if let Commands::Completions(args) = &cli.command {
        return completions(args);
    }

    let engine = build_engine(cli)?;
    match &cli.command {
        Commands::Eligibility(args) => eligibility(&engine, args),
        Commands::Cores(args) => cores(&engine, args),
        Commands::Electives(args) => electives(&engine, args),
        Commands::Recommend(args) => recommend(&engine, args),
        Commands::Readiness(args) => readiness(&engine, args),
        Commands::AddUnit(args) => add_unit(&engine, args),
        Commands::SavePlan(args) => save_plan(&engine, args),
        Commands::Results(args) => results(&engine, args),
        Commands::Unit(args) => unit(&engine, args),
        Commands::Completions(_) => unreachable!("handled above"),
    }
}

fn build_engine(cli: &Cli) -> Result<PlannerEngine> {
    let mut config = CompassConfig::load(cli.config.as_deref())?;
    if let Some(root) = &cli.data_root {
        config.data_root = root.clone();
    }
    Ok(PlannerEngine::new(
        Catalog::load(&config.catalog_dir),
        RecordStore::new(&config.data_root),
        Box::new(SnapshotDifficultyProvider::new(&config.community_dir)),
    ))
}

fn profile_from(args: &ProfileArgs) -> Result<StudentProfile> {
    StudentProfile::new(
        &args.username,
        args.stream,
        args.year,
        args.semester,
        args.intake,
    )
}

fn parse_codes(raw: &[String]) -> Result<Vec<UnitCode>> {
    raw.iter().map(|c| UnitCode::parse(c)).collect()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| CompassError::Other(e.into()))?;
    println!("{rendered}");
    Ok(())
}

fn yes_no(flag: bool) -> console::StyledObject<&'static str> {
    if flag {
        style("yes").green()
    } else {
        style("no").red()
    }
}

fn eligibility(engine: &PlannerEngine, args: &EligibilityArgs) -> Result<CommandResult> {
    let profile = profile_from(&args.profile)?;
    let code = UnitCode::parse(&args.unit)?;
    let result = engine.check_eligibility(&profile, &code)?;

    if args.json {
        print_json(&result)?;
    } else {
        println!("{} - {}", style(&result.unit).bold(), result.name);
        println!("  available this semester: {}", yes_no(result.available_this_sem));
        println!("  prerequisites fulfilled: {}", yes_no(result.prereq_fulfilled));
        if result.can_take {
            println!("  {}", style("You can take this unit.").green());
        } else {
            println!("  {}", style(&result.reason).red());
        }
    }
    Ok(CommandResult::success())
}

fn cores(engine: &PlannerEngine, args: &CoresArgs) -> Result<CommandResult> {
    let profile = profile_from(&args.profile)?;
    let listing = engine.list_core_units(&profile)?;

    if args.json {
        print_json(&listing)?;
    } else {
        println!(
            "{} ({})",
            style(format!("Core units for {}", listing.period)).bold().magenta(),
            listing.semester_name
        );
        for unit in &listing.units {
            let marker = if unit.prereq_fulfilled {
                style("ok").green()
            } else {
                style("prereq").red()
            };
            println!("  {} {} [{}]", style(&unit.code).bold(), unit.name, marker);
        }
        if !listing.deferred.is_empty() {
            println!("{}", style("Deferred cores still outstanding:").color256(208));
            for d in &listing.deferred {
                println!("  {} (from {})", d.code, d.from_semester);
            }
        }
    }
    Ok(CommandResult::success())
}

fn electives(engine: &PlannerEngine, args: &ElectivesArgs) -> Result<CommandResult> {
    let profile = profile_from(&args.profile)?;
    let listing = engine.list_elective_candidates(&profile)?;

    if args.json {
        print_json(&listing)?;
    } else {
        println!(
            "{} (slots open: {})",
            style("Electives available this semester").bold().magenta(),
            listing.elective_space
        );
        for unit in &listing.units {
            println!("  {} {}", style(&unit.code).bold(), unit.name);
        }
        if !listing.current_chosen.is_empty() {
            let chosen: Vec<&str> =
                listing.current_chosen.iter().map(|c| c.as_str()).collect();
            println!("{} {}", style("Already chosen:").dim(), chosen.join(", "));
        }
    }
    Ok(CommandResult::success())
}

fn recommend(engine: &PlannerEngine, args: &RecommendArgs) -> Result<CommandResult> {
    let profile = profile_from(&args.profile)?;
    let ranked = engine.recommend_electives(&profile, args.level, &args.interest, args.count)?;

    if args.json {
        print_json(&ranked)?;
    } else if ranked.is_empty() {
        println!("No level {} electives match your interest.", args.level);
    } else {
        println!(
            "{}",
            style(format!("Recommended level {} electives:", args.level)).bold().magenta()
        );
        for (i, unit) in ranked.iter().enumerate() {
            println!("  {}. {} {}", i + 1, style(&unit.code).bold(), unit.name);
        }
    }
    Ok(CommandResult::success())
}

fn print_report(report: &ReadinessReport) {
    println!(
        "{} readiness: {}",
        style(&report.unit).bold(),
        style(report.score).bold().magenta()
    );
    println!(
        "  prerequisites: {} (strength {})",
        yes_no(report.prereq_fulfilled),
        report.prereq_strength
    );
    println!(
        "  community difficulty: {} (struggling: {})",
        report.difficulty_score, report.struggling_percent
    );
    println!(
        "  workload: {} assignments, {} tests across {} units ({})",
        report.workload.total_assignments,
        report.workload.total_tests,
        report.workload.total_units,
        report.workload.status.label()
    );
    for line in &report.recommendations {
        println!("  - {line}");
    }
}

fn readiness(engine: &PlannerEngine, args: &ReadinessArgs) -> Result<CommandResult> {
    let profile = profile_from(&args.profile)?;
    let code = UnitCode::parse(&args.unit)?;
    let planned = parse_codes(&args.planned)?;
    let report = engine.analyze_readiness(&profile, &code, &planned)?;

    if args.json {
        print_json(&report)?;
    } else {
        print_report(&report);
    }
    Ok(CommandResult::success())
}

fn add_unit(engine: &PlannerEngine, args: &AddUnitArgs) -> Result<CommandResult> {
    let profile = profile_from(&args.profile)?;
    let code = UnitCode::parse(&args.unit)?;
    let existing = parse_codes(&args.existing)?;
    let report = engine.analyze_adding_unit(&profile, &code, &existing)?;

    if args.json {
        print_json(&report)?;
    } else {
        print_report(&report);
        println!(
            "  adds {} assignments and {} tests",
            report.workload.added_assignments, report.workload.added_tests
        );
    }
    Ok(CommandResult::success())
}

fn save_plan(engine: &PlannerEngine, args: &SavePlanArgs) -> Result<CommandResult> {
    let profile = profile_from(&args.profile)?;
    engine.verify_history(&profile)?;

    let cores = parse_codes(&args.core)?;
    let electives = parse_codes(&args.elective)?;
    let deferred = parse_codes(&args.defer)?;

    let label = engine.save_plan(&profile, &cores, &electives, &deferred)?;
    println!("{}", style(format!("Plan saved for {label}")).green());
    Ok(CommandResult::success())
}

fn results(engine: &PlannerEngine, args: &ResultsArgs) -> Result<CommandResult> {
    if args.grades.is_empty() {
        let plans = engine.store().all_plans(&args.username);
        if args.json {
            let view: BTreeMap<String, BTreeMap<String, String>> = plans
                .iter()
                .map(|(period, plan)| {
                    (
                        period.label(),
                        plan.iter()
                            .map(|(c, s)| (c.as_str().to_string(), s.as_wire().to_string()))
                            .collect(),
                    )
                })
                .collect();
            print_json(&view)?;
        } else if plans.is_empty() {
            println!("No semester records for {}.", args.username);
        } else {
            for (period, plan) in &plans {
                println!("{}", style(period.label()).bold().magenta());
                for (code, status) in plan {
                    println!("  {} {}", style(code).bold(), status);
                }
            }
        }
        return Ok(CommandResult::success());
    }

    let period_label = args.period.as_deref().ok_or_else(|| {
        CompassError::PlanRejected {
            reason: "--period is required when entering grades".to_string(),
        }
    })?;
    let period = PeriodKey::parse(period_label).ok_or_else(|| CompassError::PlanRejected {
        reason: format!("invalid period label: {period_label}"),
    })?;

    let mut grades = BTreeMap::new();
    for pair in &args.grades {
        let (code, grade) = pair
            .split_once('=')
            .ok_or_else(|| CompassError::PlanRejected {
                reason: format!("expected CODE=GRADE, got: {pair}"),
            })?;
        let code = UnitCode::parse(code)?;
        let grade = Grade::parse(grade).ok_or_else(|| CompassError::PlanRejected {
            reason: format!("invalid grade: {grade} (expected HD, D, C, P or F)"),
        })?;
        grades.insert(code, grade);
    }

    let updated = engine.record_results(&args.username, period, &grades)?;
    if updated == 0 {
        println!("No planned units matched; nothing updated.");
    } else {
        println!(
            "{}",
            style(format!("Updated {updated} result(s) for {}", period.label())).green()
        );
    }
    Ok(CommandResult::success())
}

fn unit(engine: &PlannerEngine, args: &UnitArgs) -> Result<CommandResult> {
    let code = UnitCode::parse(&args.unit)?;
    let detail = engine.unit_detail(&code)?;

    if args.json {
        print_json(&detail)?;
    } else {
        println!("{} - {}", style(&detail.code).bold(), detail.name);
        if !detail.description.is_empty() {
            println!("  {}", detail.description);
        }
        println!("  offered: {}", detail.semesters.join(", "));
        println!("  {}", detail.prerequisites);
        println!("  assignments: {}", detail.workload.assign);
        println!("  tests: {}", detail.workload.test);
        println!("  final exam: {}", detail.workload.final_exam);
    }
    Ok(CommandResult::success())
}

fn completions(args: &CompletionsArgs) -> Result<CommandResult> {
    let mut cmd = Cli::command();
    clap_complete::generate(args.shell, &mut cmd, "compass", &mut std::io::stdout());
    Ok(CommandResult::success())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn generates_bash_completions() {
        let mut cmd = Cli::command();
        let mut buf = Vec::new();
        clap_complete::generate(clap_complete::Shell::Bash, &mut cmd, "compass", &mut buf);
        assert!(!buf.is_empty());
    }

    #[test]
    fn grade_pairs_must_be_well_formed() {
        let cli = Cli::parse_from([
            "compass", "results", "--username", "alice", "--period", "Y1S1", "--set",
            "FIT1045",
        ]);
        let Commands::Results(args) = &cli.command else {
            panic!("wrong command");
        };
        assert_eq!(args.grades, vec!["FIT1045"]);
        // The malformed pair is rejected at execution time, not parse time.
        let err = args
            .grades
            .iter()
            .find(|p| !p.contains('='))
            .map(|p| format!("expected CODE=GRADE, got: {p}"));
        assert!(err.is_some());
    }
}
