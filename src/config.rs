//! Application configuration
//!
//! Everything is read from the environment once at startup, tests build a [`Config`] directly

use std::net::SocketAddr;

use anyhow::Result;

use crate::password::generate;
use crate::utils::env_var;
use crate::utils::env_var_or_else;

const DEFAULT_ADDRESS: &str = "0.0.0.0:6000";

/// Runtime configuration of the service
#[derive(Clone, Debug)]
pub struct Config {
    /// Address to listen on
    pub address: SocketAddr,

    /// Secret used to sign the session tokens
    pub jwt_secret: String,

    /// Username of the account created on an empty storage
    pub initial_username: Option<String>,

    /// Password of the account created on an empty storage
    pub initial_password: Option<String>,

    /// Connection string for the Postgres storage
    pub database_url: Option<String>,
}

impl Config {
    /// Read the configuration from the environment
    ///
    /// - `ADDRESS`, defaults to `0.0.0.0:6000`
    /// - `PORT`, overrides just the port of the address
    /// - `JWT_SECRET`, a temporary one is generated when missing
    /// - `INITIAL_USERNAME` and `INITIAL_PASSWORD`
    /// - `DATABASE_URL`
    ///
    /// # Errors
    ///
    /// Will return `Err` when the address or port can not be parsed
    pub fn from_env() -> Result<Self> {
        let mut address =
            env_var_or_else("ADDRESS", || String::from(DEFAULT_ADDRESS)).parse::<SocketAddr>()?;

        // optional override of just the port
        if let Some(port) = env_var("PORT") {
            address.set_port(port.parse::<u16>()?);
        }

        let jwt_secret = env_var_or_else("JWT_SECRET", || {
            let jwt_secret = generate();
            tracing::info!("`JWT_SECRET` is not set, generating temporary one: {jwt_secret}");
            jwt_secret
        });

        Ok(Self {
            address,
            jwt_secret,
            initial_username: env_var("INITIAL_USERNAME"),
            initial_password: env_var("INITIAL_PASSWORD"),
            database_url: env_var("DATABASE_URL"),
        })
    }
}
