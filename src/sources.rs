use anyhow::Result;

use crate::traits::ProfileRegistry;

pub fn list_sources(registry: &ProfileRegistry) -> Result<()> {
    println!("{:<14} {:<8} DESCRIPTION", "PROFILE", "FIELDS");
    for profile in registry.profiles() {
        let table = profile.table();
        println!(
            "{:<14} {:<8} {}",
            profile.name(),
            table.fields.len() + table.lists.len(),
            profile.description()
        );
    }
    Ok(())
}
