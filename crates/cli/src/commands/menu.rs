//! `souschef menu`: List configured recipes and pantry values.

use crate::menu::build_kitchen;
use souschef_config::SousChefConfig;

pub fn run(config: &SousChefConfig) -> anyhow::Result<()> {
    let kitchen = build_kitchen(config)?;
    let cookbook = kitchen.cookbook();

    println!("📖 Cookbook ({} tokens)", cookbook.len());
    for token in cookbook.tokens() {
        let Some(recipe) = cookbook.get(token) else {
            continue;
        };
        if recipe.name() != token {
            println!("   {token} → alias of {}", recipe.name());
            continue;
        }

        let description = recipe.description();
        if description.is_empty() {
            println!("   {token}");
        } else {
            println!("   {token} — {description}");
        }
        let ingredients: Vec<String> = recipe.ingredients().iter().map(|i| i.to_string()).collect();
        if !ingredients.is_empty() {
            println!("      ingredients: {}", ingredients.join(", "));
        }
        if let Some(priority) = recipe.priority() {
            println!("      priority:    {priority}");
        }
        if let Some(summary) = recipe.summary_recipe().filter(|_| recipe.compressible()) {
            println!("      compresses:  {summary}");
        }
        let labels = recipe.detail_labels();
        if !labels.is_empty() {
            println!("      details:     {}", labels.join(", "));
        }
    }

    let pantry = kitchen.pantry();
    if !pantry.is_empty() {
        println!();
        println!("🧺 Pantry ({} values)", pantry.len());
        let mut tokens = pantry.tokens();
        tokens.sort_unstable();
        for token in tokens {
            println!("   {token}");
        }
    }
    Ok(())
}
