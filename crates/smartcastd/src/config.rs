use smartcast::types::DEFAULT_PORT;

/// Device configuration consumed from the environment.
///
/// The address may legitimately be absent at startup; it only becomes an
/// error on first device use.
#[derive(Debug, Clone)]
pub struct Config {
    /// VIZIO_IP; required before the first device operation
    pub tv_ip: Option<String>,
    /// VIZIO_PORT; defaults to the well-known control port 7345
    pub tv_port: u16,
    /// VIZIO_AUTH_TOKEN; empty when the device has not been paired
    pub auth_token: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let tv_ip = std::env::var("VIZIO_IP").ok().filter(|ip| !ip.is_empty());

        let tv_port = match std::env::var("VIZIO_PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("VIZIO_PORT is not a valid port: {raw}"))?,
            Err(_) => DEFAULT_PORT,
        };

        let auth_token = std::env::var("VIZIO_AUTH_TOKEN").unwrap_or_default();

        Ok(Self {
            tv_ip,
            tv_port,
            auth_token,
        })
    }

    pub fn auth_token_set(&self) -> bool {
        !self.auth_token.is_empty()
    }
}
