//! `souschef trace`: Show how a token is produced.

use crate::menu::build_kitchen;
use souschef_config::SousChefConfig;

pub fn run(config: &SousChefConfig, token: &str) -> anyhow::Result<()> {
    let kitchen = build_kitchen(config)?;
    let edges = kitchen.trace(token)?;

    println!("🔎 Lineage of {token}");
    for edge in &edges {
        println!("   {} ← {}", edge.token, edge.provider_name);
        for dep in &edge.deps {
            match &dep.via {
                Some(via) => println!("      needs {}{via}", dep.token),
                None => println!("      needs {}", dep.token),
            }
        }
    }
    Ok(())
}
