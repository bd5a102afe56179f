use clap::{Parser, Subcommand};

use crate::{
    api::settings::{CollectionMode, CollectionSettings},
    cli::backend::BackendArgs,
    prelude::*,
    tables::build_settings_table,
};

#[derive(Parser)]
pub struct SettingsArgs {
    #[clap(flatten)]
    backend: BackendArgs,

    #[command(subcommand)]
    command: SettingsCommand,
}

#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Show the backend collection settings.
    Show,

    /// Update the backend collection settings, keeping what is not specified.
    Set(SettingsUpdate),
}

#[derive(Parser)]
pub struct SettingsUpdate {
    #[clap(long = "collection-mode", value_enum)]
    collection_mode: Option<CollectionMode>,

    #[clap(long = "collection-interval")]
    collection_interval: Option<humantime::Duration>,

    #[clap(long = "mqtt-host")]
    mqtt_host: Option<String>,

    #[clap(long = "mqtt-port")]
    mqtt_port: Option<u16>,

    /// Device the backend collects from.
    #[clap(long = "collected-device-id")]
    device_id: Option<String>,
}

impl SettingsUpdate {
    fn apply(self, mut settings: CollectionSettings) -> CollectionSettings {
        if let Some(collection_mode) = self.collection_mode {
            settings.collection_mode = collection_mode;
        }
        if let Some(collection_interval) = self.collection_interval {
            settings.collection_interval = collection_interval.into();
        }
        if let Some(mqtt_host) = self.mqtt_host {
            settings.mqtt_host = mqtt_host;
        }
        if let Some(mqtt_port) = self.mqtt_port {
            settings.mqtt_port = mqtt_port;
        }
        if let Some(device_id) = self.device_id {
            settings.device_id = device_id;
        }
        settings
    }
}

impl SettingsArgs {
    pub async fn run(self) -> Result {
        let client = self.backend.client()?;
        let settings = client.get_collection_settings().await?;
        let settings = match self.command {
            SettingsCommand::Show => settings,
            SettingsCommand::Set(update) => {
                let updated = update.apply(settings.clone());
                if updated == settings {
                    info!("nothing to update");
                    settings
                } else {
                    client.put_collection_settings(&updated).await?
                }
            }
        };
        println!("{}", build_settings_table(&settings));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn settings() -> CollectionSettings {
        CollectionSettings {
            collection_mode: CollectionMode::Browser,
            collection_interval: Duration::from_secs(5),
            mqtt_host: "192.168.1.215".into(),
            mqtt_port: 1883,
            device_id: "PV001001DEV".into(),
        }
    }

    #[test]
    fn apply_keeps_unspecified_ok() -> Result {
        let update = SettingsUpdate::try_parse_from([
            "set",
            "--collection-mode",
            "server",
            "--collection-interval",
            "30s",
        ])?;
        let updated = update.apply(settings());
        assert_eq!(updated.collection_mode, CollectionMode::Server);
        assert_eq!(updated.collection_interval, Duration::from_secs(30));
        assert_eq!(updated.mqtt_host, "192.168.1.215");
        assert_eq!(updated.mqtt_port, 1883);
        Ok(())
    }

    #[test]
    fn empty_update_ok() -> Result {
        let update = SettingsUpdate::try_parse_from(["set"])?;
        assert_eq!(update.apply(settings()), settings());
        Ok(())
    }
}
