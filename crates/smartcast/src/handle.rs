use std::sync::Arc;

use crate::device::Device;
use crate::error::Result;
use crate::types::DeviceClass;
use crate::types::DeviceIdentity;
use crate::types::RemoteKey;

/// Async wrapper around a [`Device`].
///
/// Every call runs the blocking round-trip on the tokio blocking worker
/// pool and awaits the result, so a slow device never stalls the async
/// request dispatcher. Calls are not serialized against each other; the
/// device handles sequential semantics on its side.
#[derive(Clone)]
pub struct DeviceHandle {
    inner: Arc<Device>,
}

impl DeviceHandle {
    pub fn new(device: Device) -> Self {
        Self {
            inner: Arc::new(device),
        }
    }

    /// Connect on the worker pool; see [`Device::connect`]
    pub async fn connect(identity: DeviceIdentity, class: DeviceClass) -> Result<Self> {
        let device = tokio::task::spawn_blocking(move || Device::connect(identity, class)).await??;
        Ok(Self::new(device))
    }

    pub fn identity(&self) -> &DeviceIdentity {
        self.inner.identity()
    }

    pub fn class(&self) -> DeviceClass {
        self.inner.class()
    }

    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&Device) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let device = self.inner.clone();
        tokio::task::spawn_blocking(move || op(&device)).await?
    }

    pub async fn power_state(&self) -> Result<i64> {
        self.run(|device| device.power_state()).await
    }

    pub async fn current_volume(&self) -> Result<Option<u32>> {
        self.run(|device| device.current_volume()).await
    }

    pub async fn max_volume(&self) -> Result<u32> {
        self.run(|device| device.max_volume()).await
    }

    pub async fn is_muted(&self) -> Result<Option<bool>> {
        self.run(|device| device.is_muted()).await
    }

    pub async fn current_input(&self) -> Result<Option<String>> {
        self.run(|device| device.current_input()).await
    }

    pub async fn list_inputs(&self) -> Result<Vec<String>> {
        self.run(|device| device.list_inputs()).await
    }

    pub async fn list_apps(&self) -> Result<Vec<String>> {
        self.run(|device| device.list_apps()).await
    }

    pub async fn power_on(&self) -> Result<()> {
        self.run(|device| device.power_on()).await
    }

    pub async fn power_off(&self) -> Result<()> {
        self.run(|device| device.power_off()).await
    }

    pub async fn set_audio_setting(&self, name: String, value: u32) -> Result<bool> {
        self.run(move |device| device.set_audio_setting(&name, value))
            .await
    }

    pub async fn volume_up(&self, steps: u32) -> Result<()> {
        self.run(move |device| device.volume_up(steps)).await
    }

    pub async fn volume_down(&self, steps: u32) -> Result<()> {
        self.run(move |device| device.volume_down(steps)).await
    }

    pub async fn set_input(&self, name: String) -> Result<()> {
        self.run(move |device| device.set_input(&name)).await
    }

    pub async fn launch_app(&self, name: String) -> Result<()> {
        self.run(move |device| device.launch_app(&name)).await
    }

    pub async fn mute_on(&self) -> Result<()> {
        self.run(|device| device.mute_on()).await
    }

    pub async fn mute_off(&self) -> Result<()> {
        self.run(|device| device.mute_off()).await
    }

    pub async fn send_key(&self, key: RemoteKey) -> Result<()> {
        self.run(move |device| device.send_key(key)).await
    }
}
