mod cli;
mod import;
mod infra;
mod routes;
mod server;

use landivo::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
