use anyhow::Result;
use colored::*;
use vxmod_core::installer_protocol::InstallOutcome;
use vxmod_core::module_manager::ModuleManager;
use vxmod_core::resolver::ResolutionReport;

pub async fn execute(manager: &mut ModuleManager) -> Result<()> {
    println!("{} {}", "Resolving includes for".bold(), manager.module.to_string().cyan());

    let report = manager
        .resolve_includes()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to resolve includes: {}", e))?;

    print_report(&report);

    println!();
    println!("{}", "Registered dependencies".bold().underline());
    for configuration in [manager.dependencies.includes(), manager.dependencies.libs()] {
        let files = configuration.files()?;
        println!("{} ({})", configuration.name().blue().bold(), files.len());
        for file in files {
            println!("  {}", file.display());
        }
    }

    Ok(())
}

pub fn print_report(report: &ResolutionReport) {
    if report.resolutions.is_empty() {
        println!("  {}", "No includes declared".dimmed());
        return;
    }

    for resolution in &report.resolutions {
        let status = match &resolution.outcome {
            InstallOutcome::Success => "installed".green().bold(),
            InstallOutcome::AlreadyInstalled => "already installed".dimmed(),
            InstallOutcome::Failed(_) => "failed".red().bold(),
        };
        println!("  {} {}", resolution.module.to_string().cyan(), status);
        if let Some(reason) = resolution.outcome.failure() {
            println!("    {}", reason.red());
        }
    }

    let failed = report.failed().count();
    if failed > 0 {
        println!(
            "{} {}",
            "Warning:".yellow().bold(),
            format!("{} include(s) could not be installed", failed).yellow()
        );
    }
}
