use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    product_search_cli::main_entry().await
}
