use tokio::signal;

use aria2_jsonrpc::{Client, ClientOptions, Event, Result};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    let client = Client::new(ClientOptions::new("localhost", 6800));
    let mut events = client.events();
    let mut complete = client.on_notification("aria2.onDownloadComplete");
    client.open().await?;

    println!("waiting for ctrl-c");
    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                break;
            }
            Some(params) = complete.recv() => {
                println!("download complete: {params:?}");
            }
            Some(event) = events.recv() => {
                match event {
                    Event::Notification { method, params } => println!("{method} {params:?}"),
                    Event::Close => break,
                    Event::Error(e) => println!("error: {e}"),
                    _ => {}
                }
            }
        }
    }

    if client.state() == aria2_jsonrpc::ConnectionState::Open {
        client.close().await?;
    }
    Ok(())
}
