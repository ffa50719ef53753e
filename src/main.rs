#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = quiz_results::run().await {
        eprintln!("quiz-results fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
