use clap::Parser;
use reqwest::Url;

use crate::{api::backend, prelude::*};

#[derive(Parser)]
pub struct BackendArgs {
    /// Backend HTTP API base URL.
    #[clap(long = "api-url", env = "API_URL", default_value = "http://192.168.1.6:8800")]
    pub api_url: Url,

    #[clap(long = "device-id", env = "DEVICE_ID", default_value = "PV001001DEV")]
    pub device_id: String,
}

impl BackendArgs {
    pub fn client(&self) -> Result<backend::Client> {
        backend::Client::new(self.api_url.clone(), self.device_id.clone())
    }
}
