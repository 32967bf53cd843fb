//! Gateway configuration from flags and `NATION_*` environment variables

use clap::Parser;
use flag_lookup::client::RESTCOUNTRIES_NAME_URL;
use flag_lookup::FlagClientConfig;
use nation_ranker::choropleth::DEFAULT_NAME_PROPERTY;
use nation_ranker::view::DEFAULT_SCORE_FIELD;
use nation_ranker::{DisplayConfig, ListSize};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "nation-gateway", about = "HTTP API for weighted country rankings")]
pub struct GatewayConfig {
    /// Country CSV file
    #[arg(long, env = "NATION_DATA", default_value = "data/data.csv")]
    pub data: PathBuf,

    /// Listen port (falls back to PORT)
    #[arg(long, env = "NATION_GATEWAY_PORT")]
    pub port: Option<u16>,

    /// World GeoJSON for the choropleth
    #[arg(long, env = "NATION_GEOMETRY")]
    pub geometry: Option<PathBuf>,

    /// Feature property carrying the country name
    #[arg(long, env = "NATION_NAME_PROPERTY", default_value = DEFAULT_NAME_PROPERTY)]
    pub name_property: String,

    /// Extra flag aliases (JSON object), merged over the built-ins
    #[arg(long, env = "NATION_ALIASES")]
    pub aliases: Option<PathBuf>,

    /// Flag directory name endpoint
    #[arg(long, env = "NATION_FLAGS_URL", default_value = RESTCOUNTRIES_NAME_URL)]
    pub flags_url: String,

    /// Flag lookup timeout in seconds
    #[arg(long, env = "NATION_FLAGS_TIMEOUT", default_value_t = 10)]
    pub flags_timeout_sec: u64,

    /// Entries per best/worst list ("all" or a count)
    #[arg(long, env = "NATION_LIST_SIZE", default_value_t = ListSize::default())]
    pub list_size: ListSize,

    /// JSON key used for scores in ranking responses
    #[arg(long, env = "NATION_SCORE_FIELD", default_value = DEFAULT_SCORE_FIELD)]
    pub score_field: String,

    /// Static UI directory, served at `/` when it exists
    #[arg(long, env = "NATION_UI_DIR", default_value = "ui/dist")]
    pub ui_dir: PathBuf,
}

pub const DEFAULT_PORT: u16 = 18602;

impl GatewayConfig {
    /// `--port`/`NATION_GATEWAY_PORT`, then `PORT`, then the default
    pub fn resolved_port(&self) -> u16 {
        self.port
            .or_else(|| std::env::var("PORT").ok().and_then(|p| p.parse().ok()))
            .unwrap_or(DEFAULT_PORT)
    }

    pub fn display(&self) -> DisplayConfig {
        DisplayConfig {
            list_size: self.list_size,
            score_field: self.score_field.clone(),
        }
    }

    pub fn flag_client(&self) -> FlagClientConfig {
        FlagClientConfig {
            base_url: self.flags_url.clone(),
            timeout_sec: self.flags_timeout_sec,
        }
    }
}
