use anyhow::Result;
use colored::*;
use vxmod_core::module_manager::ModuleManager;

use super::resolve::print_report;

pub async fn execute(manager: &mut ModuleManager) -> Result<()> {
    println!("{} {}", "Building module".bold(), manager.module.to_string().cyan());
    println!();

    let result = manager
        .build()
        .await
        .map_err(|e| anyhow::anyhow!("Build failed: {}", e))?;

    println!("{}", "Includes".bold().underline());
    print_report(&result.resolution);

    println!();
    println!(
        "{} {} ({} output file(s), {} lib(s))",
        "Assembled".bold(),
        result.assembly.module_dir.display(),
        result.assembly.output_files,
        result.assembly.libs.len()
    );

    println!();
    println!(
        "{} {}",
        "✓".green().bold(),
        format!("Packaged {}", result.archive.display()).green().bold()
    );

    Ok(())
}
