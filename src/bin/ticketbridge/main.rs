mod app;
mod cli;

use tracing::error;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse_args();
    if let Err(err) = app::run(cli).await {
        error!(error = %err, "invocation failed");
        eprintln!("ticketbridge: {err}");
        std::process::exit(1);
    }
}
