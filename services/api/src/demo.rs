use crate::infra::open_store;
use clap::Args;
use credit_risk::accounts::Credentials;
use credit_risk::applications::ApplicationInput;
use credit_risk::catalog::{Catalog, ItemId};
use credit_risk::config::DatabaseConfig;
use credit_risk::error::AppError;
use credit_risk::{RiskScoringService, ScoringRequest, SqliteStore};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct CatalogArgs {
    /// SQLite database to read the catalog from
    #[arg(long, default_value = "credit-risk.db")]
    pub(crate) database: String,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print the stored answer details after the final submission
    #[arg(long)]
    pub(crate) show_details: bool,
}

pub(crate) fn run_catalog(args: CatalogArgs) -> Result<(), AppError> {
    let store = open_store(&DatabaseConfig {
        path: args.database,
    })?;
    let service = RiskScoringService::with_defaults(Arc::new(store), 1);
    let catalog = service.catalog()?;
    render_catalog(&catalog);
    Ok(())
}

fn render_catalog(catalog: &Catalog) {
    if catalog.is_empty() {
        println!("Weight catalog is empty");
        return;
    }

    for entry in catalog.groups() {
        println!(
            "{} (group #{}, weight {:.2})",
            entry.group.name, entry.group.id.0, entry.group.weight_b
        );
        let mut current: Option<&str> = None;
        for item in &entry.items {
            if current != Some(item.category.as_str()) {
                println!("  {} (weight {:.2})", item.category, item.weight_d);
                current = Some(item.category.as_str());
            }
            let label = if item.option.is_empty() {
                item.display_name.as_str()
            } else {
                item.option.as_str()
            };
            println!("    [{}] {} -> {}", item.id.0, label, item.weight_f);
        }
    }
}

/// Highest- or lowest-contribution option in every category.
fn pick_options(catalog: &Catalog, best: bool) -> Vec<ItemId> {
    catalog
        .categories()
        .into_iter()
        .filter_map(|key| {
            let options = catalog.items().filter(|item| item.category_key() == key);
            let chosen = if best {
                options.max_by(|a, b| a.contribution().total_cmp(&b.contribution()))
            } else {
                options.min_by(|a, b| a.contribution().total_cmp(&b.contribution()))
            };
            chosen.map(|item| item.id)
        })
        .collect()
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = Arc::new(SqliteStore::open_in_memory()?);
    let service = RiskScoringService::with_defaults(store, 30);

    println!("Credit Risk Scoring Demo");
    println!("========================");

    let admin = service.register(&Credentials::new("demo@lender.co.id", "demo1234"))?;
    let token = service.login(&Credentials::new("demo@lender.co.id", "demo1234"))?;
    println!("Registered admin #{} ({})", admin.id.0, admin.email);
    println!("Issued access token {}...", token.chars().take(8).collect::<String>());

    let application = service.create_application(
        &admin,
        ApplicationInput {
            application_number: Some("DEMO-0001".to_string()),
            name: Some("Budi".to_string()),
            birth_date: Some("1990-04-12".to_string()),
            birth_place: Some("Bandung".to_string()),
            gender: Some("male".to_string()),
            address: Some("Jl. Merdeka No. 10, Bandung".to_string()),
            postal_code: Some("40115".to_string()),
        },
    )?;
    println!(
        "Created application #{} ({}) for {}",
        application.id, application.application_number, application.name
    );

    let catalog = service.catalog()?;
    println!(
        "Catalog: {} groups, {} categories",
        catalog.groups().len(),
        catalog.categories().len()
    );

    for (label, best) in [("Strong profile", true), ("Weak profile", false)] {
        let selection = pick_options(&catalog, best);
        let outcome =
            service.submit_scoring(&admin, ScoringRequest::new(application.id, &selection))?;
        println!(
            "{label}: {} -> total {:.2}, {}",
            outcome.message, outcome.score.total_score, outcome.score.status
        );
    }

    if args.show_details {
        let view = service.scoring_details(&admin, application.id)?;
        println!("Stored answers:");
        for detail in &view.details {
            println!(
                "  - {} / {}",
                detail.group.name, detail.item.display_name
            );
        }
    }

    Ok(())
}
