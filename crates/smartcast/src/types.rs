use strum::Display;
use strum::EnumString;

/// Default port for the SmartCast control API
pub const DEFAULT_PORT: u16 = 7345;

/// The device class a SmartCast identity is declared as.
///
/// The same physical device may answer as either class depending on
/// firmware: televisions and SmartCast speakers/soundbars expose their
/// settings under different URI roots, and some TV firmwares only accept
/// the speaker layout. Exactly one class is active per identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DeviceClass {
    Tv,
    Speaker,
}

impl DeviceClass {
    /// Maximum volume assumed when the device omits a MAXIMUM field.
    ///
    /// TVs report volume on a 0-100 scale, speakers on 0-31.
    pub fn default_max_volume(self) -> u32 {
        match self {
            DeviceClass::Tv => 100,
            DeviceClass::Speaker => 31,
        }
    }
}

/// Configuration identifying the one device this process controls.
///
/// Built once, never mutated afterwards.
#[derive(Debug, Clone)]
pub struct DeviceIdentity {
    pub ip: String,
    pub port: u16,
    /// Pairing token; empty when the device has not been paired
    pub auth_token: String,
}

impl DeviceIdentity {
    pub fn new(ip: impl Into<String>, port: u16, auth_token: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            port,
            auth_token: auth_token.into(),
        }
    }

    pub fn base_url(&self) -> String {
        format!("https://{}:{}", self.ip, self.port)
    }

    pub fn has_auth_token(&self) -> bool {
        !self.auth_token.is_empty()
    }
}

/// Interpreted power state of the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PowerState {
    Off,
    On,
    Standby,
    Unknown,
}

impl PowerState {
    /// Interpret the raw power_mode code reported by the device.
    ///
    /// Codes other than 0/1/2 (and absence) map to Unknown.
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(0) => PowerState::Off,
            Some(1) => PowerState::On,
            Some(2) => PowerState::Standby,
            _ => PowerState::Unknown,
        }
    }
}

/// Remote control keys supported by the key-command endpoint.
///
/// Key names are case-sensitive, matching the wire-level remote protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum RemoteKey {
    Up,
    Down,
    Left,
    Right,
    Ok,
}
