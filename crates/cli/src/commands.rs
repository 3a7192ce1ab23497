pub mod assemble;
pub mod build;
pub mod descriptor;
pub mod mods;
pub mod package;
pub mod resolve;
