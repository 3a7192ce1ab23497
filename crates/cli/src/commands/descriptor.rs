use anyhow::Result;
use colored::*;
use vxmod_core::module_manager::ModuleManager;

pub fn execute(manager: &ModuleManager) -> Result<()> {
    let path = manager
        .generate_descriptor()
        .map_err(|e| anyhow::anyhow!("Failed to generate descriptor: {}", e))?;

    println!("{} {}", "Wrote".green().bold(), path.display());
    Ok(())
}
