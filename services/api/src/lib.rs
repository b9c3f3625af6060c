mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use fare_currency::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
