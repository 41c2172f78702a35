#[tokio::main]
async fn main() {
    if let Err(e) = syntax_health::run().await {
        tracing::error!("{e}");
        eprintln!("syntax-health: {e}");
        std::process::exit(1);
    }
}
