//! Check article access against the sandbox API.
//!
//! ```sh
//! TOLLGATE_MERCHANT_ID=... TOLLGATE_API_KEY=... TOLLGATE_TOKEN=... \
//!     cargo run --example get_access
//! ```

use tollgate_client::{Client, ClientConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = ClientConfig::builder()
        .merchant_id(std::env::var("TOLLGATE_MERCHANT_ID")?)
        .api_key(std::env::var("TOLLGATE_API_KEY")?)
        .sandbox(true)
        .build();

    let mut client = Client::new(config)?;
    client.set_token(std::env::var("TOLLGATE_TOKEN")?);

    let response = client.get_access(&["7", "9"], None).await?;
    for (article_id, article) in &response.articles {
        println!("article {article_id}: access = {}", article.access);
    }

    println!("token after call: {:?}", client.token());
    Ok(())
}
