use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::OnceCell;

use smartcast::DeviceClass;
use smartcast::DeviceHandle;
use smartcast::DeviceIdentity;
use smartcast::RemoteKey;

use crate::config::Config;

/// Errors raised while obtaining the shared device handle
#[derive(Debug, Error)]
pub enum TvError {
    #[error("VIZIO_IP environment variable not set")]
    MissingAddress,

    #[error(transparent)]
    Device(#[from] smartcast::Error),
}

/// The adapter surface the request handlers consume.
///
/// Implemented by [`DeviceHandle`] in production and by mocks in tests.
#[async_trait]
pub trait TvControl: Send + Sync {
    async fn power_state(&self) -> smartcast::Result<i64>;
    async fn current_volume(&self) -> smartcast::Result<Option<u32>>;
    async fn max_volume(&self) -> smartcast::Result<u32>;
    async fn is_muted(&self) -> smartcast::Result<Option<bool>>;
    async fn current_input(&self) -> smartcast::Result<Option<String>>;
    async fn list_inputs(&self) -> smartcast::Result<Vec<String>>;
    async fn list_apps(&self) -> smartcast::Result<Vec<String>>;
    async fn power_on(&self) -> smartcast::Result<()>;
    async fn power_off(&self) -> smartcast::Result<()>;
    async fn set_audio_setting(&self, name: &str, value: u32) -> smartcast::Result<bool>;
    async fn volume_up(&self, steps: u32) -> smartcast::Result<()>;
    async fn volume_down(&self, steps: u32) -> smartcast::Result<()>;
    async fn set_input(&self, name: &str) -> smartcast::Result<()>;
    async fn launch_app(&self, name: &str) -> smartcast::Result<()>;
    async fn mute_on(&self) -> smartcast::Result<()>;
    async fn mute_off(&self) -> smartcast::Result<()>;
    async fn send_key(&self, key: RemoteKey) -> smartcast::Result<()>;
}

#[async_trait]
impl TvControl for DeviceHandle {
    async fn power_state(&self) -> smartcast::Result<i64> {
        DeviceHandle::power_state(self).await
    }

    async fn current_volume(&self) -> smartcast::Result<Option<u32>> {
        DeviceHandle::current_volume(self).await
    }

    async fn max_volume(&self) -> smartcast::Result<u32> {
        DeviceHandle::max_volume(self).await
    }

    async fn is_muted(&self) -> smartcast::Result<Option<bool>> {
        DeviceHandle::is_muted(self).await
    }

    async fn current_input(&self) -> smartcast::Result<Option<String>> {
        DeviceHandle::current_input(self).await
    }

    async fn list_inputs(&self) -> smartcast::Result<Vec<String>> {
        DeviceHandle::list_inputs(self).await
    }

    async fn list_apps(&self) -> smartcast::Result<Vec<String>> {
        DeviceHandle::list_apps(self).await
    }

    async fn power_on(&self) -> smartcast::Result<()> {
        DeviceHandle::power_on(self).await
    }

    async fn power_off(&self) -> smartcast::Result<()> {
        DeviceHandle::power_off(self).await
    }

    async fn set_audio_setting(&self, name: &str, value: u32) -> smartcast::Result<bool> {
        DeviceHandle::set_audio_setting(self, name.to_string(), value).await
    }

    async fn volume_up(&self, steps: u32) -> smartcast::Result<()> {
        DeviceHandle::volume_up(self, steps).await
    }

    async fn volume_down(&self, steps: u32) -> smartcast::Result<()> {
        DeviceHandle::volume_down(self, steps).await
    }

    async fn set_input(&self, name: &str) -> smartcast::Result<()> {
        DeviceHandle::set_input(self, name.to_string()).await
    }

    async fn launch_app(&self, name: &str) -> smartcast::Result<()> {
        DeviceHandle::launch_app(self, name.to_string()).await
    }

    async fn mute_on(&self) -> smartcast::Result<()> {
        DeviceHandle::mute_on(self).await
    }

    async fn mute_off(&self) -> smartcast::Result<()> {
        DeviceHandle::mute_off(self).await
    }

    async fn send_key(&self, key: RemoteKey) -> smartcast::Result<()> {
        DeviceHandle::send_key(self, key).await
    }
}

/// Construction strategy for the device handle; a seam for tests
#[async_trait]
pub trait TvConnector: Send + Sync {
    async fn connect(
        &self,
        identity: DeviceIdentity,
        class: DeviceClass,
    ) -> smartcast::Result<Arc<dyn TvControl>>;
}

/// Connects to a real SmartCast device
pub struct SmartCastConnector;

#[async_trait]
impl TvConnector for SmartCastConnector {
    async fn connect(
        &self,
        identity: DeviceIdentity,
        class: DeviceClass,
    ) -> smartcast::Result<Arc<dyn TvControl>> {
        let handle = DeviceHandle::connect(identity, class).await?;
        Ok(Arc::new(handle))
    }
}

/// Lazily-initialized, process-wide device handle.
///
/// The first caller performs construction with the two-class fallback:
/// declare the identity as a television, and if that fails retry as a
/// speaker. The winning handle is cached for the process lifetime; later
/// callers (and concurrent first callers) share it without re-running
/// construction.
pub struct SharedTv {
    connector: Arc<dyn TvConnector>,
    cell: OnceCell<Arc<dyn TvControl>>,
}

impl SharedTv {
    pub fn new(connector: Arc<dyn TvConnector>) -> Self {
        Self {
            connector,
            cell: OnceCell::new(),
        }
    }

    /// Build a SharedTv already holding a device; used by tests
    pub fn with_device(tv: Arc<dyn TvControl>) -> Self {
        Self {
            connector: Arc::new(SmartCastConnector),
            cell: OnceCell::new_with(Some(tv)),
        }
    }

    pub async fn get(&self, config: &Config) -> Result<Arc<dyn TvControl>, TvError> {
        let ip = config.tv_ip.as_ref().ok_or(TvError::MissingAddress)?;
        let identity = DeviceIdentity::new(ip.clone(), config.tv_port, config.auth_token.clone());

        let tv = self
            .cell
            .get_or_try_init(|| self.init(identity))
            .await
            .map_err(TvError::Device)?;
        Ok(tv.clone())
    }

    async fn init(&self, identity: DeviceIdentity) -> smartcast::Result<Arc<dyn TvControl>> {
        match self
            .connector
            .connect(identity.clone(), DeviceClass::Tv)
            .await
        {
            Ok(tv) => {
                tracing::info!(ip = %identity.ip, class = %DeviceClass::Tv, "TV connection initialized");
                Ok(tv)
            }
            Err(err) => {
                tracing::warn!(
                    ip = %identity.ip,
                    error = %err,
                    "tv-class connection failed, retrying as speaker"
                );
                let tv = self
                    .connector
                    .connect(identity.clone(), DeviceClass::Speaker)
                    .await?;
                tracing::info!(ip = %identity.ip, class = %DeviceClass::Speaker, "TV connection initialized");
                Ok(tv)
            }
        }
    }
}
