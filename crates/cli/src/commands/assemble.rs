use anyhow::Result;
use colored::*;
use vxmod_core::module_manager::ModuleManager;

pub fn execute(manager: &ModuleManager) -> Result<()> {
    println!("{} {}", "Assembling".bold(), manager.module.to_string().cyan());

    let report = manager
        .assemble()
        .map_err(|e| anyhow::anyhow!("Failed to assemble module: {}", e))?;

    println!("  {} {}", "Module directory:".dimmed(), report.module_dir.display());
    println!("  {} {}", "Output files:".dimmed(), report.output_files);
    println!("  {} {}", "Libraries:".dimmed(), report.libs.len());
    for lib in &report.libs {
        println!("    {}", lib.display());
    }

    Ok(())
}
