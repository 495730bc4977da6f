#[tokio::main]
async fn main() {
    // A missing .env is normal; flags and the real environment still apply.
    let _ = dotenvy::dotenv();
    std::process::exit(pvectl::cli::run().await);
}
