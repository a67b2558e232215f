//! Storefront entry point.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    storefront::init_tracing();

    match storefront::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Storefront failed to run");
            ExitCode::FAILURE
        }
    }
}
