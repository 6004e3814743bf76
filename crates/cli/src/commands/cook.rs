//! `souschef cook`: Assemble context from the configured menu.

use crate::menu::build_kitchen;
use souschef_config::SousChefConfig;
use souschef_core::{CookReport, Decision, OrderItem};
use souschef_kitchen::CookRequest;

pub struct CookOptions {
    pub items: Vec<String>,
    pub budget: Option<usize>,
    pub explain: bool,
    pub json: bool,
}

pub fn parse_order(items: &[String]) -> Vec<OrderItem> {
    items
        .iter()
        .map(|item| item.parse().unwrap_or_else(|never| match never {}))
        .collect()
}

pub async fn run(config: &SousChefConfig, options: CookOptions) -> anyhow::Result<()> {
    let kitchen = build_kitchen(config)?;

    let mut request = CookRequest::new()
        .order(parse_order(&options.items))
        .explain(options.explain || options.json || config.kitchen.explain);
    if let Some(budget) = options.budget.or(config.kitchen.budget) {
        request = request.budget(budget);
    }

    let report = kitchen.cook(request).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print!("{}", report.context);
    if report.plates.is_some() {
        println!();
        print_explanation(&report);
    }
    Ok(())
}

fn print_explanation(report: &CookReport) {
    let budget = report
        .budget
        .map_or_else(|| "unbounded".to_string(), |b| b.to_string());
    println!("🍽️  {} tokens served (budget: {budget})", report.total_tokens);

    for plate in report.plates.iter().flatten() {
        let mark = match plate.decision {
            Decision::ForcedInclude => "📌",
            Decision::Included if plate.was_compressed => "🗜️ ",
            Decision::Included => "✅",
            Decision::Dropped => "❌",
        };
        println!(
            "   {mark} {:<24} {:>6} tok  [{} → {}]  {}",
            plate.token,
            plate.cost,
            plate.running_total_before,
            plate.running_total_after,
            plate.reason
        );
        if let Some(note) = &plate.compression_note {
            println!("        {note}");
        }
    }
}
