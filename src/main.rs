#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = courseflow::run().await {
        eprintln!("courseflow fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
