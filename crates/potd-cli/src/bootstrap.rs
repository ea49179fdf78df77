//! Translate parsed arguments into the server configuration.

use potd_axum::{CorsConfig, ServerConfig};
use potd_core::{FaultToleranceSettings, ScraperSettings};
use potd_gemini::GeminiConfig;
use potd_wiki::WikiClientConfig;

use crate::commands::{ServeArgs, ServiceArgs};

impl ServiceArgs {
    /// Server configuration for one-shot commands (no scheduler, no listener).
    pub fn server_config(&self) -> ServerConfig {
        let mut wiki = WikiClientConfig::new().with_main_page_url(&self.wikipedia_url);
        if let Some(agent) = &self.user_agent {
            wiki = wiki.with_user_agent(agent);
        }

        let fault_tolerance = if self.fault_tolerance {
            FaultToleranceSettings::default()
        } else {
            FaultToleranceSettings::disabled()
        };

        ServerConfig {
            database_path: self.database.clone(),
            wiki,
            gemini: GeminiConfig::new()
                .with_api_key(self.gemini_api_key.clone())
                .with_model(&self.gemini_model),
            scraper: ScraperSettings {
                fault_tolerance,
                ..ScraperSettings::with_defaults()
            },
            cache_capacity: self.cache_capacity,
            noise_amplitude: self.dither_noise,
            ..ServerConfig::with_defaults()
        }
    }
}

impl ServeArgs {
    pub fn server_config(&self) -> ServerConfig {
        let base = self.service.server_config();
        let cors = if self.allowed_origins.is_empty() {
            CorsConfig::AllowAll
        } else {
            CorsConfig::AllowOrigins(self.allowed_origins.clone())
        };
        ServerConfig {
            port: self.port,
            scraper: ScraperSettings {
                cron: self.cron.clone(),
                scrape_on_start: self.scrape_on_start,
                ..base.scraper.clone()
            },
            cors,
            ..base
        }
    }
}
