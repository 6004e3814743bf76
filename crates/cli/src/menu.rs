//! Builds a kitchen from the `[[recipes]]` and `[pantry]` sections of the
//! config file.

use souschef_config::{DetailProfileConfig, RecipeConfig, SousChefConfig};
use souschef_core::{
    CharHeuristic, Cookbook, Ingredient, Pantry, PriorityTag, Recipe, RecipeError, Value,
};
use souschef_kitchen::{Kitchen, render};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A recipe whose output is a text template over its rendered ingredients.
#[derive(Debug, Clone)]
pub struct TemplateRecipe {
    name: String,
    description: String,
    ingredients: Vec<Ingredient>,
    template: String,
    priority: Option<PriorityTag>,
    compressible: bool,
    summary: Option<String>,
    details: BTreeMap<String, DetailProfileConfig>,
}

impl TemplateRecipe {
    pub fn from_config(config: &RecipeConfig) -> souschef_core::Result<Self> {
        let ingredients = config
            .ingredients
            .iter()
            .map(|d| Ingredient::parse(d))
            .collect::<souschef_core::Result<Vec<_>>>()?;
        Ok(Self {
            name: config.name.clone(),
            description: config.description.clone(),
            ingredients,
            template: config.template.clone(),
            priority: config.priority.clone(),
            compressible: config.compressible,
            summary: config.summary.clone(),
            details: config.details.clone(),
        })
    }
}

#[async_trait::async_trait]
impl Recipe for TemplateRecipe {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    async fn prepare(&self, ingredients: Vec<Arc<Value>>) -> Result<Value, RecipeError> {
        let rendered = ingredients
            .iter()
            .map(|v| render(v).map_err(|e| RecipeError::new(e.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::String(fill_template(&self.template, &rendered)))
    }

    fn priority(&self) -> Option<PriorityTag> {
        self.priority.clone()
    }

    fn compressible(&self) -> bool {
        self.compressible
    }

    fn summary_recipe(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    fn detail(&self, label: &str, value: &Value) -> Option<Value> {
        let profile = self.details.get(label)?;
        let rendered = render(value).ok()?;
        Some(Value::String(profile.apply(&rendered)))
    }

    fn detail_labels(&self) -> Vec<String> {
        self.details.keys().cloned().collect()
    }
}

/// Replace each `{N}` with `args[N]`. Placeholders with no matching
/// argument, and braces that don't hold an index, are kept verbatim.
pub fn fill_template(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replaced = after.find('}').and_then(|close| {
            let index: usize = after[..close].parse().ok()?;
            let arg = args.get(index)?;
            Some((arg, close))
        });
        match replaced {
            Some((arg, close)) => {
                out.push_str(arg);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Register every configured recipe, plus its aliases, in file order.
pub fn build_cookbook(config: &SousChefConfig) -> anyhow::Result<Cookbook> {
    let mut cookbook = Cookbook::new();
    for recipe in &config.recipes {
        let added = cookbook.add(TemplateRecipe::from_config(recipe)?);
        for alias in &recipe.aliases {
            cookbook.register(alias.clone(), Arc::clone(&added));
        }
    }
    Ok(cookbook)
}

pub fn build_pantry(config: &SousChefConfig) -> Pantry {
    config
        .pantry
        .iter()
        .map(|(token, value)| (token.clone(), value.clone()))
        .collect()
}

pub fn build_kitchen(config: &SousChefConfig) -> anyhow::Result<Kitchen> {
    let cookbook = build_cookbook(config)?;
    tracing::debug!(
        recipes = config.recipes.len(),
        tokens = cookbook.len(),
        pantry = config.pantry.len(),
        "Built kitchen from config"
    );
    Ok(Kitchen::new(Arc::new(cookbook), build_pantry(config))
        .with_default_detail(config.kitchen.default_detail.clone())
        .with_counter(CharHeuristic::new(config.kitchen.chars_per_token)))
}
