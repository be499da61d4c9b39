//! CLI entry point.
//!
//! # Responsibility
//! - Load configuration from the environment and start logging when a log
//!   directory is configured.
//! - Seed the demo customers and print what the read cache holds.

use customers_core::{init_logging, CoreConfig, CustomerRuntime};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("customers: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = CoreConfig::from_env();
    if let Some(log_dir) = config.log_dir.as_deref() {
        let log_dir = log_dir
            .to_str()
            .ok_or_else(|| format!("log dir is not valid UTF-8: {}", log_dir.display()))?;
        init_logging(&config.log_level, log_dir)?;
    }

    let runtime = CustomerRuntime::open(&config).map_err(|err| err.to_string())?;
    runtime
        .seed_demo_customers()
        .map_err(|err| err.to_string())?;

    println!("customers_core version={}", customers_core::core_version());
    println!("db_path={}", config.db_path.display());
    for customer in runtime.cache().snapshot() {
        let id = customer.id().map_or_else(|| "-".to_string(), |id| id.to_string());
        println!(
            "customer id={} name={} subscribed={}",
            id, customer.name(), customer.subscribed()
        );
    }
    Ok(())
}
