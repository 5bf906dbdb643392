use crate::config::Config;
use crate::fetch::Fetcher;

#[derive(Clone)]
pub struct AppState {
    pub http: Fetcher,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> reqwest::Result<Self> {
        let http = Fetcher::new(&config)?;
        Ok(Self { http, config })
    }
}
