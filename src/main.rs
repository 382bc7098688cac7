mod db;
mod format;
mod import;
mod models;
mod query;
mod run;

use anyhow::{Context, Result};

const DB_ENV_VAR: &str = "BUDGETQUERY_DB";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();
    let db_path = get_db_path()?;
    log::debug!("Using database {}", db_path.display());
    run::as_cli(&args, &db_path)
}

fn get_db_path() -> Result<std::path::PathBuf> {
    if let Some(path) = std::env::var_os(DB_ENV_VAR) {
        return Ok(path.into());
    }
    let proj_dirs = directories::ProjectDirs::from("com", "budgetquery", "BudgetQuery")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.join("budgetquery.db"))
}
