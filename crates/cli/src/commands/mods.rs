use anyhow::Result;
use vxmod_core::module_manager::ModuleManager;

use crate::ModsCommands;

pub async fn execute(manager: &ModuleManager, command: ModsCommands) -> Result<()> {
    match command {
        ModsCommands::List => {
            let modules = manager.installed_modules()?;
            if modules.is_empty() {
                println!("No installed modules found.");
            } else {
                println!("Installed modules in {}:", manager.mods_dir().display());
                for module in modules {
                    println!("  {}", module);
                }
            }
        }
        ModsCommands::Clear => {
            manager.clear_installed().await?;
            println!("Installed modules cleared successfully.");
        }
    }

    Ok(())
}
