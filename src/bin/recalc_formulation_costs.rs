// Small dev utility: recompute the cached total cost for every formulation
// (or a single one) in the given database.
//
// Usage:
//   cargo run --bin recalc-formulation-costs -- [db_path] [formulation_id]
//
// This is intentionally lightweight and does not start the application shell.

use formulation_costing::api::CostApi;
use formulation_costing::db::{open_sqlite_connection, warn_if_schema_stale};
use formulation_costing::logging;
use formulation_costing::repository::{
    ActionLogRepository, FormulationIngredientLineRepository, FormulationPackagingLineRepository,
    FormulationRepository,
};
use std::sync::{Arc, Mutex};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let db_path = args
        .next()
        .unwrap_or_else(|| "formulation_costing.db".to_string());

    let conn = Arc::new(Mutex::new(open_sqlite_connection(&db_path)?));
    {
        let c = conn.lock().unwrap();
        warn_if_schema_stale(&c)?;
    }

    let formulation_repo = Arc::new(FormulationRepository::from_connection(conn.clone()));
    let api = CostApi::new(
        formulation_repo.clone(),
        Arc::new(FormulationIngredientLineRepository::from_connection(
            conn.clone(),
        )),
        Arc::new(FormulationPackagingLineRepository::from_connection(
            conn.clone(),
        )),
        Arc::new(ActionLogRepository::from_connection(conn.clone())),
    );

    let ids = match args
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
    {
        Some(id) => vec![id],
        None => formulation_repo.list_ids()?,
    };

    let mut updated = 0usize;
    let mut skipped = 0usize;
    for id in &ids {
        if api.update_formulation_cost(id, "recalc_formulation_costs bin")? {
            updated += 1;
        } else {
            skipped += 1;
        }
    }

    println!(
        "recalc done: total={}, updated={}, skipped={}",
        ids.len(),
        updated,
        skipped
    );
    Ok(())
}
