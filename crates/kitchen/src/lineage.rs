//! Lineage tracing: a metadata walk over declared ingredients.
//!
//! No recipe is invoked. Every reachable token appears exactly once (first
//! visit wins), root first, then depth-first in declared ingredient order.
//! The visited set also keeps cyclic graphs finite.

use souschef_core::{Cookbook, DependencyRef, Error, LineageEdge, Pantry, Result};
use std::collections::HashSet;

/// Provider name reported for caller-supplied values.
pub const PANTRY_PROVIDER: &str = "pantry";

/// Build the lineage of `token`.
pub fn trace(cookbook: &Cookbook, pantry: &Pantry, token: &str) -> Result<Vec<LineageEdge>> {
    let mut edges = Vec::new();
    let mut visited = HashSet::new();
    visit(cookbook, pantry, token, &mut visited, &mut edges)?;
    Ok(edges)
}

fn visit<'a>(
    cookbook: &'a Cookbook,
    pantry: &Pantry,
    token: &'a str,
    visited: &mut HashSet<&'a str>,
    edges: &mut Vec<LineageEdge>,
) -> Result<()> {
    if !visited.insert(token) {
        return Ok(());
    }

    if pantry.contains(token) {
        edges.push(LineageEdge {
            token: token.to_string(),
            provider_name: PANTRY_PROVIDER.to_string(),
            deps: Vec::new(),
        });
        return Ok(());
    }

    let recipe = cookbook.get(token).ok_or_else(|| Error::UnresolvedToken {
        token: token.to_string(),
    })?;

    edges.push(LineageEdge {
        token: token.to_string(),
        provider_name: recipe.name().to_string(),
        deps: recipe
            .ingredients()
            .iter()
            .map(|i| DependencyRef {
                token: i.root.clone(),
                via: i.via().map(str::to_string),
            })
            .collect(),
    });

    for ingredient in recipe.ingredients() {
        visit(cookbook, pantry, &ingredient.root, visited, edges)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use souschef_core::SimpleRecipe;

    fn recipe(name: &str, ingredients: &[&str]) -> SimpleRecipe {
        ingredients
            .iter()
            .fold(SimpleRecipe::builder(name), |b, i| b.ingredient(*i))
            .constant("x")
            .unwrap()
    }

    #[test]
    fn leaf_recipe_yields_single_edge() {
        let mut book = Cookbook::new();
        book.add(recipe("Directive", &[]));
        let edges = trace(&book, &Pantry::new(), "Directive").unwrap();
        assert_eq!(
            edges,
            vec![LineageEdge {
                token: "Directive".into(),
                provider_name: "Directive".into(),
                deps: vec![],
            }]
        );
    }

    #[test]
    fn walks_depth_first_and_dedupes() {
        let mut book = Cookbook::new();
        book.add(recipe("Top", &["Left", "Right.items[0]"]));
        book.add(recipe("Left", &["Seed"]));
        book.add(recipe("Right", &["Seed.name"]));
        let pantry = Pantry::new().with_value("Seed", "s");

        let edges = trace(&book, &pantry, "Top").unwrap();
        let order: Vec<&str> = edges.iter().map(|e| e.token.as_str()).collect();
        assert_eq!(order, vec!["Top", "Left", "Seed", "Right"]);

        assert_eq!(edges[0].deps[1].token, "Right");
        assert_eq!(edges[0].deps[1].via.as_deref(), Some(".items[0]"));
        assert_eq!(edges[2].provider_name, PANTRY_PROVIDER);
        assert!(edges[2].deps.is_empty());
        assert_eq!(edges[3].deps[0].via.as_deref(), Some(".name"));
    }

    #[test]
    fn alias_reports_recipe_name() {
        let mut book = Cookbook::new();
        book.add(recipe("Character", &[]));
        book.alias("Hero", "Character").unwrap();
        let edges = trace(&book, &Pantry::new(), "Hero").unwrap();
        assert_eq!(edges[0].token, "Hero");
        assert_eq!(edges[0].provider_name, "Character");
    }

    #[test]
    fn cycles_terminate() {
        let mut book = Cookbook::new();
        book.add(recipe("A", &["B"]));
        book.add(recipe("B", &["A"]));
        let edges = trace(&book, &Pantry::new(), "A").unwrap();
        assert_eq!(edges.len(), 2);
    }

    #[test]
    fn missing_token_is_unresolved() {
        let mut book = Cookbook::new();
        book.add(recipe("A", &["Ghost"]));
        let err = trace(&book, &Pantry::new(), "A").unwrap_err();
        assert!(matches!(err, Error::UnresolvedToken { ref token } if token == "Ghost"));
    }
}
