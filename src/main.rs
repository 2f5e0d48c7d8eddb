//! dealpool demo driver.
//!
//! Stands in for the presentation layer: it drives the registry through the
//! same operations a UI would call (register, login, browse, start a group,
//! join until settlement) and renders whatever comes back.

use anyhow::Result;
use tracing::info;

use dealpool::config::AppConfig;
use dealpool::logging::init_logging;
use dealpool::{Catalog, JoinResult, Registry};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "default".to_string()
}

fn load_catalog(config: &AppConfig) -> Result<Catalog> {
    match &config.catalog.path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            Ok(Catalog::from_yaml(&content)?)
        }
        None => Ok(Catalog::builtin()),
    }
}

fn main() -> Result<()> {
    let config = AppConfig::load(&get_env());
    let _guard = init_logging(&config);

    let catalog = load_catalog(&config)?;
    let mut registry = Registry::new(catalog);

    for entry in registry.catalog_list() {
        info!(
            product_id = entry.product_id,
            product = %entry.name,
            price = %entry.base_price,
            discount = entry.discount_percent,
            min_members = entry.min_members,
            "catalog entry"
        );
    }

    // Scripted session: three buyers chase the first deal in the catalog.
    let alice = registry.register("alice", "hunter22")?;
    let bob = registry.register("bob", "secret99")?;
    let carol = registry.register("carol", "pass1234")?;
    registry.authenticate("alice", "hunter22")?;

    let product_id = registry
        .catalog_list()
        .first()
        .map(|entry| entry.product_id)
        .ok_or_else(|| anyhow::anyhow!("catalog is empty"))?;
    let group_id = registry.create_group(product_id, alice)?;

    for user in [bob, carol] {
        match registry.join_group(group_id, user)? {
            JoinResult::Pending {
                current_count,
                remaining,
            } => {
                info!(group_id, current_count, remaining, "waiting for more buyers");
            }
            JoinResult::Settled(report) => {
                info!(
                    group_id,
                    members = report.member_count,
                    price_per_person = %report.price_per_person,
                    total_revenue = %report.total_revenue,
                    "group settled"
                );
                for line in &report.buyers {
                    info!(buyer = %line.username, paid = %line.settled_price, "buyer settled");
                }
            }
        }
    }

    let open = registry.list_open_groups(None);
    info!(open_groups = open.len(), "session finished");

    // Dashboard dump for whoever renders it
    println!("{}", serde_json::to_string_pretty(&registry.ledger_snapshot())?);
    Ok(())
}
