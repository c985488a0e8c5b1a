//! Lists live streams and the blacklist using credentials from the environment.
//!
//! ```bash
//! export KSYUN_ACCESS_KEY_ID=...
//! export KSYUN_SECRET_ACCESS_KEY=...
//! export KLS_API_VERSION=2017-01-01
//! RUST_LOG=info cargo run --example list_streams
//! ```

use futures_util::future::join3;
use kls_client::prelude::*;
use log::{error, info};

#[tokio::main]
async fn main() {
    env_logger::init();

    // Everything the client can raise ends up here; nothing is installed globally.
    if let Err(e) = run().await {
        error!("list_streams failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let client = KlsClient::from_env()?;
    info!(
        "Using {} in region {}",
        client.config().endpoint(),
        client.config().region()
    );

    let streams = client.streams();
    let blacklist = client.blacklist();
    let (publishing, live, forbidden) = join3(
        streams.list_realtime_pub_streams_info(None),
        streams.list_realtime_streams_info(None),
        blacklist.get_blacklist(None),
    )
    .await;

    for (name, result) in [
        ("ListRealtimePubStreamsInfo", publishing),
        ("ListRealtimeStreamsInfo", live),
        ("GetBlacklist", forbidden),
    ] {
        match result {
            Ok(payload) => println!("{}: {}", name, serde_json::to_string_pretty(&payload)?),
            Err(KlsError::Application { message, .. }) => {
                println!("{}: rejected by KLS: {}", name, message)
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
