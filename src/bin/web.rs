use clap::Parser;
use fuel_dashboard::app;
use fuel_dashboard::config::{ServerArgs, init_logging};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = ServerArgs::parse();
    init_logging(&args.log_level);

    log::info!(
        "Starting fuel dashboard on {} (uploads up to {} MB)",
        args.bind_address(),
        args.max_upload_mb
    );
    app::run(args).await
}
