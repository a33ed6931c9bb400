use aria2_jsonrpc::{Client, ClientOptions, Result};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    let options = ClientOptions::new("localhost", 6800)
        .path("/jsonrpc")
        .secret("<rpc-secret>");
    let token = options.token();

    let client = Client::new(options);
    println!("Aria2 using HTTP");
    match client.call("aria2.getVersion", token.clone().map(|t| json!([t]))).await {
        Ok(version) => println!("{version}"),
        Err(e) => println!("{e}"),
    }

    println!("Aria2 using WebSocket");
    client.open().await?;
    let batch = client
        .batch(vec![
            ("aria2.getVersion", token.clone().map(|t| json!([t]))),
            ("system.listMethods", None),
        ])
        .await?;
    for pending in batch {
        match pending.await {
            Ok(result) => println!("{result}"),
            Err(e) => println!("{e}"),
        }
    }
    client.close().await?;
    Ok(())
}
