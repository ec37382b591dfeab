use scorecard::app;
use std::env;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    // Optional overrides: bind address, then data directory.
    let addr = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| "127.0.0.1:3000".to_string());
    let data_dir = args.get(2).cloned().unwrap_or_else(|| "database".to_string());

    // Start the web application
    app::run(&addr, Path::new(&data_dir)).await
}
