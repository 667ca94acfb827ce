//! `packmux formats` command

use anyhow::Result;

use super::Session;

pub fn execute(session: &Session) -> Result<()> {
    let registry = session.umbrella.registry();

    if registry.is_empty() {
        println!("No package managers registered");
        return Ok(());
    }

    for (key, manager) in registry.snapshot() {
        println!("{:<12} {}", key.as_str(), manager.format());
    }

    Ok(())
}
