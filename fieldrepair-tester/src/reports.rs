use anyhow::Result;
use colored::Colorize;

use crate::simulation::SeedReport;

pub fn generate_console_report(reports: &[SeedReport]) {
    println!();
    println!("{}", "📊 Damage Allocation Summary".bright_cyan().bold());
    println!("{}", "============================".cyan());

    for report in reports {
        let status = if report.passed() {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        println!(
            "{} seed {} ({} iterations)",
            status,
            report.seed.to_string().bold(),
            report.iterations
        );
        println!(
            "   Armor: {}  Structure: {}  Pilot skill: {}",
            report.armor_hits, report.structure_hits, report.pilot_skill_hits
        );
        for (category, count) in &report.components_by_category {
            println!("   {category:10} {count}");
        }
        println!(
            "   Abandoned rolls: {}  Draws: {}",
            report.abandoned_rolls, report.attempts
        );
        if !report.failures.is_empty() {
            println!("   Failures:");
            for failure in &report.failures {
                println!("     • {}", failure.red());
            }
        }
        println!();
    }
}

pub fn generate_json_report(reports: &[SeedReport]) -> Result<()> {
    let json_output = serde_json::to_string_pretty(reports)?;
    println!("{json_output}");
    Ok(())
}
