use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use landivo::buyers::{parse_buyer_rows, BuyerService};
use landivo::config::AppConfig;
use landivo::error::AppError;
use landivo::store::{self, SqliteBuyerRepository};

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// Path to a CSV export with firstName,lastName,email,phone columns
    /// (buyerType and preferredAreas optional)
    pub(crate) file: PathBuf,
    /// Persist the valid rows into the configured database instead of only
    /// validating them
    #[arg(long)]
    pub(crate) persist: bool,
}

pub(crate) async fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let csv_text = tokio::fs::read_to_string(&args.file).await?;

    if args.persist {
        let config = AppConfig::load()?;
        let pool = store::init_pool(&config.database.url).await?;
        store::run_migrations(&pool).await?;

        let service = BuyerService::new(Arc::new(SqliteBuyerRepository::new(pool)));
        let outcome = service
            .import_csv(&csv_text)
            .await
            .map_err(|err| invalid_data(err.to_string()))?;

        println!("imported {} buyer(s)", outcome.imported.len());
        for error in &outcome.errors {
            println!("  {}", error.message);
        }
        return Ok(());
    }

    let report = parse_buyer_rows(Cursor::new(csv_text.as_bytes()))
        .map_err(|err| invalid_data(err.to_string()))?;

    println!(
        "{} valid row(s), {} rejected",
        report.accepted_count(),
        report.errors.len()
    );
    for accepted in &report.accepted {
        println!(
            "  row {}: {} {} <{}>",
            accepted.row, accepted.draft.first_name, accepted.draft.last_name, accepted.draft.email
        );
    }
    for error in &report.errors {
        println!("  {}", error.message);
    }
    Ok(())
}

fn invalid_data(message: String) -> AppError {
    AppError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, message))
}
