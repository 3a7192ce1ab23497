use anyhow::Result;
use colored::*;
use vxmod_core::module_manager::ModuleManager;

pub fn execute(manager: &ModuleManager) -> Result<()> {
    let archive = manager
        .package()
        .map_err(|e| anyhow::anyhow!("Failed to package module: {}", e))?;

    println!("{} {}", "Packaged".green().bold(), archive.display());
    Ok(())
}
