use chrono::Local;
use clap::Parser;
use reqwest::Url;

use crate::{api::feed::Feed, prelude::*};

#[derive(Parser)]
pub struct WatchArgs {
    /// Push channel base URL.
    #[clap(long = "ws-url", env = "WS_URL", default_value = "ws://192.168.1.6:8800")]
    ws_url: Url,

    #[clap(long = "device-id", env = "DEVICE_ID", default_value = "PV001001DEV")]
    device_id: String,

    /// Ping period which keeps the connection alive.
    #[clap(long = "keepalive", env = "WS_KEEPALIVE", default_value = "25s")]
    keepalive: humantime::Duration,

    #[clap(long = "reconnect-delay", env = "WS_RECONNECT_DELAY", default_value = "5s")]
    reconnect_delay: humantime::Duration,
}

impl WatchArgs {
    /// Print the push channel events until interrupted.
    pub async fn run(self) -> Result {
        let feed = Feed::builder()
            .url(Feed::device_url(&self.ws_url, &self.device_id)?)
            .keepalive(self.keepalive.into())
            .reconnect_delay(self.reconnect_delay.into())
            .build();
        feed.run(|event| println!("{} {event}", Local::now().format("%H:%M:%S"))).await;
        Ok(())
    }
}
