use std::{
    fmt::{Display, Formatter},
    time::Duration,
};

use bon::Builder;
use futures_util::{SinkExt, StreamExt};
use reqwest::Url;
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::time::{MissedTickBehavior, interval, sleep};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::prelude::*;

const PING: &str = "ping";
const PONG: &str = "pong";

/// Push channel event.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedEvent {
    MeasurementUpdate {
        device_id: Option<String>,
        timestamp: Option<String>,

        #[serde(default)]
        data: Map<String, Value>,
    },

    AlarmUpdate {
        device_id: Option<String>,
        alarm_name: Option<String>,
        is_active: Option<bool>,
    },

    ScheduleUpdate {
        device_id: Option<String>,

        #[serde(default)]
        data: Map<String, Value>,
    },

    ConnectionStatus {
        #[serde(default)]
        data: Map<String, Value>,
    },

    #[serde(rename = "heartbeat")]
    Heartbeat,
}

impl FeedEvent {
    /// Parse the text frame.
    ///
    /// Keep-alive traffic yields `None`, and so do malformed payloads, which are logged and dropped.
    pub fn parse(text: &str) -> Option<Self> {
        if text == PONG {
            trace!("pong");
            return None;
        }
        match serde_json::from_str::<Self>(text) {
            Ok(Self::Heartbeat) => {
                trace!("heartbeat");
                None
            }
            Ok(event) => Some(event),
            Err(error) => {
                warn!("dropping a malformed payload: {error:#}");
                None
            }
        }
    }
}

impl Display for FeedEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MeasurementUpdate { timestamp, data, .. } => {
                write!(f, "measurement")?;
                if let Some(timestamp) = timestamp {
                    write!(f, " at {timestamp}")?;
                }
                for key in ["grid_power", "house_power", "battery_power", "solar_power", "soc"] {
                    if let Some(value) = data.get(key).and_then(Value::as_f64) {
                        write!(f, " {key}={value}")?;
                    }
                }
                Ok(())
            }
            Self::AlarmUpdate { alarm_name, is_active, .. } => {
                let state = match is_active {
                    Some(true) => "active",
                    Some(false) => "cleared",
                    None => "unknown",
                };
                write!(f, "alarm {}: {state}", alarm_name.as_deref().unwrap_or("?"))
            }
            Self::ScheduleUpdate { data, .. } => write!(f, "schedule {}", Value::Object(data.clone())),
            Self::ConnectionStatus { data } => {
                write!(f, "connection {}", Value::Object(data.clone()))
            }
            Self::Heartbeat => write!(f, "heartbeat"),
        }
    }
}

/// Push channel client, which reconnects indefinitely.
#[derive(Builder)]
pub struct Feed {
    url: Url,

    #[builder(default = Duration::from_secs(25))]
    keepalive: Duration,

    #[builder(default = Duration::from_secs(5))]
    reconnect_delay: Duration,
}

impl Feed {
    /// Push channel URL of the device.
    pub fn device_url(base_url: &Url, device_id: &str) -> Result<Url> {
        let mut url = base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::msg(format!("`{base_url}` cannot be a base URL")))?
            .pop_if_empty()
            .extend(["api", "ws", "devices", device_id]);
        Ok(url)
    }

    /// Deliver the events to the callback, forever.
    #[instrument(skip_all, fields(url = %self.url))]
    pub async fn run(&self, mut on_event: impl FnMut(FeedEvent)) {
        loop {
            match self.run_connection(&mut on_event).await {
                Ok(()) => warn!("the connection closed"),
                Err(error) => warn!("the connection failed: {error:#}"),
            }
            info!(reconnect_delay = ?self.reconnect_delay, "reconnecting…");
            sleep(self.reconnect_delay).await;
        }
    }

    async fn run_connection(&self, on_event: &mut impl FnMut(FeedEvent)) -> Result {
        let (stream, _) = connect_async(self.url.as_str())
            .await
            .with_context(|| format!("failed to connect to `{}`", self.url))?;
        info!("connected");
        let (mut sink, mut stream) = stream.split();

        let mut keepalive = interval(self.keepalive);
        keepalive.reset();
        keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = keepalive.tick() => {
                    sink.send(Message::text(PING)).await.context("failed to send a ping")?;
                }
                message = stream.next() => {
                    let Some(message) = message else {
                        return Ok(());
                    };
                    match message.context("failed to receive a message")? {
                        Message::Text(text) => {
                            if let Some(event) = FeedEvent::parse(&text) {
                                on_event(event);
                            }
                        }
                        Message::Close(frame) => {
                            debug!(?frame, "closing");
                            return Ok(());
                        }
                        _ => {}
                    }
                }
            }
        }
    }
}
