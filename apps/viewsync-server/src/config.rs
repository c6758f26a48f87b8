//! Server configuration from command line and environment.

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use clap::Parser;
use tower_http::cors::{AllowOrigin, CorsLayer};
use viewsync_core::{RelayPolicy, SessionConfig};

#[derive(Parser, Debug, Clone)]
#[command(name = "viewsync-server")]
#[command(about = "Shared map session server: one driver, many followers")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "VIEWSYNC_HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "VIEWSYNC_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Origin allowed to open sessions (repeatable; none means any origin)
    #[arg(long = "allowed-origin", env = "VIEWSYNC_ALLOWED_ORIGIN", value_delimiter = ',')]
    pub allowed_origins: Vec<String>,

    /// Drop connections silent for this many seconds (0 disables)
    #[arg(long, env = "VIEWSYNC_IDLE_TIMEOUT_SECS", default_value_t = 0)]
    pub idle_timeout_secs: u64,

    /// Send panoramaVisible ahead of every relayed updatePano
    #[arg(long, env = "VIEWSYNC_ANNOUNCE_PANORAMA_ON_PANO")]
    pub announce_panorama_on_pano: bool,
}

impl Config {
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    #[must_use]
    pub const fn idle_timeout(&self) -> Option<Duration> {
        match self.idle_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            relay: RelayPolicy {
                announce_panorama_on_pano: self.announce_panorama_on_pano,
            },
            ..SessionConfig::default()
        }
    }

    /// CORS policy: permissive unless origins are listed.
    ///
    /// # Errors
    /// Returns error if an origin is not a valid header value.
    pub fn cors_layer(&self) -> Result<CorsLayer> {
        if self.allowed_origins.is_empty() {
            return Ok(CorsLayer::permissive());
        }

        let origins = self
            .allowed_origins
            .iter()
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .with_context(|| format!("Invalid allowed origin: {origin}"))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET]))
    }
}
