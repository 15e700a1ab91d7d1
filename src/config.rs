//! Process configuration. Every flag can also be supplied through the
//! environment (a `.env` file is loaded at startup).

use std::net::{IpAddr, SocketAddr};

use clap::Args;

use crate::core::{DEFAULT_HORIZON_MONTHS, EngineConfig};

#[derive(Args, Debug, Clone, Copy)]
pub struct EngineArgs {
    /// Months simulated before a plan is reported as non-convergent
    #[arg(
        long,
        env = "PAYOFF_HORIZON_MONTHS",
        default_value_t = DEFAULT_HORIZON_MONTHS,
        value_parser = clap::value_parser!(u32).range(1..=1200)
    )]
    pub horizon_months: u32,
}

impl EngineArgs {
    pub fn engine_config(self) -> EngineConfig {
        EngineConfig {
            horizon_months: self.horizon_months,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP API to
    #[arg(long, env = "PAYOFF_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to bind the HTTP API to
    #[arg(long, short, env = "PAYOFF_PORT", default_value_t = 8080)]
    pub port: u16,

    #[command(flatten)]
    pub engine: EngineArgs,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
