use std::time::Duration;

use serde::Serialize;

use crate::error::Error;
use crate::error::Result;
use crate::protocol;
use crate::protocol::Envelope;
use crate::protocol::Item;
use crate::protocol::KeyCommand;
use crate::protocol::KeyCode;
use crate::protocol::Modify;
use crate::types::DeviceClass;
use crate::types::DeviceIdentity;
use crate::types::RemoteKey;

/// Transport timeout for one device round-trip
const ROUND_TRIP_TIMEOUT: Duration = Duration::from_secs(10);

/// Blocking client for one SmartCast device.
///
/// Holds the process's single connection identity. Every method performs a
/// blocking HTTPS round-trip; async callers should go through
/// [`DeviceHandle`](crate::DeviceHandle) instead. There is no reconnect
/// logic: if the device becomes unreachable each call fails independently
/// and the next one tries again.
pub struct Device {
    identity: DeviceIdentity,
    class: DeviceClass,
    http: reqwest::blocking::Client,
}

impl Device {
    /// Build a client declared as `class` and probe the device for it.
    ///
    /// The probe fetches the class's settings root without requiring auth:
    /// any well-formed envelope, including an auth rejection, proves the URI
    /// space exists. A `uri_not_found` answer means the device does not
    /// speak this class's layout and construction fails, letting the caller
    /// retry with the other class.
    pub fn connect(identity: DeviceIdentity, class: DeviceClass) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            // SmartCast devices serve a self-signed certificate
            .danger_accept_invalid_certs(true)
            .timeout(ROUND_TRIP_TIMEOUT)
            .build()?;

        let device = Self {
            identity,
            class,
            http,
        };
        device.probe()?;
        tracing::debug!(
            ip = %device.identity.ip,
            class = %device.class,
            "SmartCast device reachable"
        );
        Ok(device)
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    pub fn class(&self) -> DeviceClass {
        self.class
    }

    fn probe(&self) -> Result<()> {
        let path = protocol::audio_root_path(self.class);
        let envelope = self.get_unchecked(&path)?;
        if envelope.status.is_uri_not_found() {
            return Err(Error::UriNotFound { path });
        }
        Ok(())
    }

    /// Raw power_mode code as reported by the device
    pub fn power_state(&self) -> Result<i64> {
        let envelope = self.get(protocol::POWER_MODE_PATH)?;
        envelope
            .first_item()
            .and_then(|item| item.value.as_ref())
            .and_then(|value| value.as_i64())
            .ok_or_else(|| Error::InvalidResponse("power_mode item missing".to_string()))
    }

    /// Current volume, or None if the device does not expose it
    pub fn current_volume(&self) -> Result<Option<u32>> {
        let item = self.audio_setting("volume")?;
        Ok(item
            .and_then(|item| item.value)
            .and_then(|value| value.as_u64())
            .map(|value| value as u32))
    }

    /// Maximum volume for this device. Taken from the volume setting's
    /// MAXIMUM field when reported, otherwise the class default.
    pub fn max_volume(&self) -> Result<u32> {
        let item = self.audio_setting("volume")?;
        Ok(item
            .and_then(|item| item.maximum)
            .map(|max| max as u32)
            .unwrap_or_else(|| self.class.default_max_volume()))
    }

    /// Mute state, or None if the device does not expose it
    pub fn is_muted(&self) -> Result<Option<bool>> {
        let item = self.audio_setting("mute")?;
        // the mute setting is a string toggle, "On" / "Off"
        Ok(item.and_then(|item| item.value).and_then(|value| {
            value
                .as_str()
                .map(|s| s.eq_ignore_ascii_case("on"))
                .or_else(|| value.as_bool())
        }))
    }

    /// Name of the current input, or None if the device does not expose it
    pub fn current_input(&self) -> Result<Option<String>> {
        let envelope = self.get(&protocol::current_input_path(self.class))?;
        Ok(envelope
            .first_item()
            .and_then(|item| item.value.as_ref())
            .and_then(|value| value.as_str())
            .map(str::to_string))
    }

    /// Available input names, in device order
    pub fn list_inputs(&self) -> Result<Vec<String>> {
        let envelope = self.get(&protocol::input_list_path(self.class))?;
        Ok(envelope
            .items
            .iter()
            .filter(|item| !item.name.is_empty())
            .map(|item| item.name.clone())
            .collect())
    }

    /// Names of launchable apps, in registry order
    pub fn list_apps(&self) -> Result<Vec<String>> {
        Ok(protocol::APPS
            .iter()
            .map(|app| app.name.to_string())
            .collect())
    }

    pub fn power_on(&self) -> Result<()> {
        self.press_key(protocol::KEY_POW_ON, 1)
    }

    pub fn power_off(&self) -> Result<()> {
        self.press_key(protocol::KEY_POW_OFF, 1)
    }

    pub fn volume_up(&self, steps: u32) -> Result<()> {
        self.press_key(protocol::KEY_VOL_UP, steps)
    }

    pub fn volume_down(&self, steps: u32) -> Result<()> {
        self.press_key(protocol::KEY_VOL_DOWN, steps)
    }

    pub fn mute_on(&self) -> Result<()> {
        self.press_key(protocol::KEY_MUTE_ON, 1)
    }

    pub fn mute_off(&self) -> Result<()> {
        self.press_key(protocol::KEY_MUTE_OFF, 1)
    }

    pub fn send_key(&self, key: RemoteKey) -> Result<()> {
        self.press_key(protocol::key_code(key), 1)
    }

    /// Write an absolute audio setting via MODIFY.
    ///
    /// Returns Ok(true) when the device accepted the write and Ok(false)
    /// when it answered with a rejection (some firmwares refuse absolute
    /// volume writes); transport failures are errors. Callers use the
    /// rejection signal to fall back to stepwise adjustment.
    pub fn set_audio_setting(&self, name: &str, value: u32) -> Result<bool> {
        let Some(item) = self.audio_setting(name)? else {
            return Ok(false);
        };
        let Some(hashval) = item.hashval else {
            return Ok(false);
        };

        let path = protocol::audio_setting_path(self.class, name);
        let envelope = self.put_unchecked(&path, &Modify::new(hashval, value))?;
        if !envelope.status.is_success() {
            tracing::debug!(
                setting = name,
                detail = %envelope.status.detail,
                "device rejected audio setting write"
            );
        }
        Ok(envelope.status.is_success())
    }

    /// Switch to the named input. Fire-and-forget beyond envelope success.
    pub fn set_input(&self, name: &str) -> Result<()> {
        let path = protocol::current_input_path(self.class);
        let envelope = self.get(&path)?;
        let hashval = envelope
            .first_item()
            .and_then(|item| item.hashval)
            .ok_or_else(|| Error::InvalidResponse("current_input has no HASHVAL".to_string()))?;

        self.put(&path, &Modify::new(hashval, name))?;
        Ok(())
    }

    /// Launch an app by registry name. Fire-and-forget.
    pub fn launch_app(&self, name: &str) -> Result<()> {
        let app = protocol::find_app(name).ok_or_else(|| Error::UnknownApp(name.to_string()))?;
        self.put(protocol::APP_LAUNCH_PATH, &protocol::AppLaunch::new(app))?;
        Ok(())
    }

    fn press_key(&self, key: KeyCode, repeat: u32) -> Result<()> {
        if repeat == 0 {
            return Ok(());
        }
        self.put(protocol::KEY_COMMAND_PATH, &KeyCommand::new(key, repeat))?;
        Ok(())
    }

    /// Read a setting from the audio tree. Returns None when the setting is
    /// absent from the device's settings list (absence-signal, not an error).
    fn audio_setting(&self, name: &str) -> Result<Option<Item>> {
        self.require_auth()?;
        let path = protocol::audio_setting_path(self.class, name);
        let mut envelope = self.get_unchecked(&path)?;
        if envelope.status.is_uri_not_found() {
            return Ok(None);
        }
        if !envelope.status.is_success() {
            return Err(Error::Rejected {
                detail: envelope.status.detail,
            });
        }
        if envelope.items.is_empty() {
            return Ok(None);
        }
        Ok(Some(envelope.items.remove(0)))
    }

    fn require_auth(&self) -> Result<()> {
        if !self.identity.has_auth_token() {
            return Err(Error::EmptyAuthToken);
        }
        Ok(())
    }

    fn get(&self, path: &str) -> Result<Envelope> {
        self.require_auth()?;
        let envelope = self.get_unchecked(path)?;
        self.check(path, envelope)
    }

    fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Envelope> {
        let envelope = self.put_unchecked(path, body)?;
        self.check(path, envelope)
    }

    fn check(&self, path: &str, envelope: Envelope) -> Result<Envelope> {
        if envelope.status.is_uri_not_found() {
            return Err(Error::UriNotFound {
                path: path.to_string(),
            });
        }
        if !envelope.status.is_success() {
            return Err(Error::Rejected {
                detail: envelope.status.detail,
            });
        }
        Ok(envelope)
    }

    /// GET without auth or result checks; used by the construction probe
    /// and by reads that interpret non-success results themselves
    fn get_unchecked(&self, path: &str) -> Result<Envelope> {
        let url = format!("{}{}", self.identity.base_url(), path);
        tracing::trace!(%url, "GET");
        let mut request = self.http.get(&url);
        if self.identity.has_auth_token() {
            request = request.header("AUTH", &self.identity.auth_token);
        }
        let envelope = request.send()?.json::<Envelope>()?;
        Ok(envelope)
    }

    fn put_unchecked<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Envelope> {
        self.require_auth()?;
        let url = format!("{}{}", self.identity.base_url(), path);
        tracing::trace!(%url, "PUT");
        let envelope = self
            .http
            .put(&url)
            .header("AUTH", &self.identity.auth_token)
            .json(body)
            .send()?
            .json::<Envelope>()?;
        Ok(envelope)
    }
}
