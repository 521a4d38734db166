//! Output devices.
//!
//! An [`AudioBackend`] hands out a [`DeviceHandle`] and turns a
//! [`ProcessingUnit`] into a running stream. Dropping the stream stops the
//! callback and frees the unit along with every stage in it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{debug, error};

use crate::engine::unit::ProcessingUnit;
use crate::error::{EngineError, Result};

/// The acquired output device, as the engine sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceHandle {
    pub name: String,
    pub sample_rate: u32,
    pub channels: u16,
}

pub trait AudioBackend {
    /// Live stream. Audio stops when it is dropped.
    type Stream;

    /// Find the output device and its configuration.
    fn acquire_device(&mut self) -> Result<DeviceHandle>;

    /// Backend-specific checks before a processing unit is built for `device`.
    fn prepare(&mut self, device: &DeviceHandle) -> Result<()> {
        let _ = device;
        Ok(())
    }

    /// Move `unit` onto the audio thread and start playing.
    fn open_stream(&mut self, device: &DeviceHandle, unit: ProcessingUnit) -> Result<Self::Stream>;
}

/// Default output device through `cpal`.
#[derive(Default)]
pub struct CpalBackend {
    device: Option<(cpal::Device, cpal::SupportedStreamConfig)>,
}

impl CpalBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioBackend for CpalBackend {
    type Stream = cpal::Stream;

    fn acquire_device(&mut self) -> Result<DeviceHandle> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| EngineError::DeviceUnavailable("no default output device available".into()))?;
        let config = device
            .default_output_config()
            .map_err(|e| EngineError::DeviceUnavailable(format!("failed to fetch default output config: {e}")))?;

        let handle = DeviceHandle {
            name: device.name().unwrap_or_else(|_| "unknown".to_string()),
            sample_rate: config.sample_rate().0,
            channels: config.channels(),
        };
        debug!(host = ?host.id(), format = ?config.sample_format(), "output device found");

        self.device = Some((device, config));
        Ok(handle)
    }

    fn prepare(&mut self, _device: &DeviceHandle) -> Result<()> {
        if self.device.is_none() {
            return Err(EngineError::ProcessingUnitLoadFailed(
                "no device acquired".into(),
            ));
        }
        Ok(())
    }

    fn open_stream(&mut self, device: &DeviceHandle, mut unit: ProcessingUnit) -> Result<Self::Stream> {
        let (cpal_device, config) = self
            .device
            .as_ref()
            .ok_or_else(|| EngineError::ProcessingUnitLoadFailed("no device acquired".into()))?;

        let channels = device.channels as usize;
        let stream = cpal_device
            .build_output_stream(
                &config.config(),
                move |data: &mut [f32], _| unit.render_interleaved(data, channels),
                |err| error!("audio stream error: {err}"),
                None,
            )
            .map_err(|e| EngineError::ProcessingUnitLoadFailed(e.to_string()))?;

        stream
            .play()
            .map_err(|e| EngineError::StreamFailed(e.to_string()))?;

        Ok(stream)
    }
}

struct HeadlessShared {
    unit: Mutex<Option<ProcessingUnit>>,
    active: AtomicUsize,
    opened: AtomicUsize,
}

impl HeadlessShared {
    fn slot(&self) -> MutexGuard<'_, Option<ProcessingUnit>> {
        self.unit.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A device that does not exist: the caller pulls frames by hand.
///
/// Used by the tests and the `bounce` command. It can also be told to fail
/// at any acquisition step.
pub struct HeadlessBackend {
    sample_rate: u32,
    channels: u16,
    fail_device: bool,
    fail_unit: bool,
    fail_stream: bool,
    shared: Arc<HeadlessShared>,
}

impl HeadlessBackend {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
            fail_device: false,
            fail_unit: false,
            fail_stream: false,
            shared: Arc::new(HeadlessShared {
                unit: Mutex::new(None),
                active: AtomicUsize::new(0),
                opened: AtomicUsize::new(0),
            }),
        }
    }

    /// Make device acquisition fail with `DeviceUnavailable`.
    pub fn fail_device(mut self) -> Self {
        self.fail_device = true;
        self
    }

    /// Make processing unit loading fail with `ProcessingUnitLoadFailed`.
    pub fn fail_processing_unit(mut self) -> Self {
        self.fail_unit = true;
        self
    }

    /// Make starting the stream fail with `StreamFailed`.
    pub fn fail_stream(mut self) -> Self {
        self.fail_stream = true;
        self
    }

    /// Handle for pulling audio out of whatever stream is running.
    pub fn handle(&self) -> HeadlessHandle {
        HeadlessHandle {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl AudioBackend for HeadlessBackend {
    type Stream = HeadlessStream;

    fn acquire_device(&mut self) -> Result<DeviceHandle> {
        if self.fail_device {
            return Err(EngineError::DeviceUnavailable("headless device disabled".into()));
        }
        Ok(DeviceHandle {
            name: "headless".to_string(),
            sample_rate: self.sample_rate,
            channels: self.channels,
        })
    }

    fn prepare(&mut self, _device: &DeviceHandle) -> Result<()> {
        if self.fail_unit {
            return Err(EngineError::ProcessingUnitLoadFailed(
                "headless processing unit disabled".into(),
            ));
        }
        Ok(())
    }

    fn open_stream(&mut self, _device: &DeviceHandle, unit: ProcessingUnit) -> Result<Self::Stream> {
        if self.fail_stream {
            return Err(EngineError::StreamFailed("headless stream disabled".into()));
        }

        let mut slot = self.shared.slot();
        if slot.is_some() {
            return Err(EngineError::StreamFailed("stream already running".into()));
        }
        *slot = Some(unit);
        drop(slot);

        self.shared.active.fetch_add(1, Ordering::SeqCst);
        self.shared.opened.fetch_add(1, Ordering::SeqCst);
        Ok(HeadlessStream {
            shared: Arc::clone(&self.shared),
        })
    }
}

/// Running headless stream. Dropping it removes the processing unit.
pub struct HeadlessStream {
    shared: Arc<HeadlessShared>,
}

impl Drop for HeadlessStream {
    fn drop(&mut self) {
        self.shared.slot().take();
        self.shared.active.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Clone)]
pub struct HeadlessHandle {
    shared: Arc<HeadlessShared>,
}

impl HeadlessHandle {
    /// Render mono frames from the running stream.
    ///
    /// Returns the number of frames rendered; with no stream running the
    /// buffer is filled with silence and 0 is returned.
    pub fn pull(&self, out: &mut [f32]) -> usize {
        match self.shared.slot().as_mut() {
            Some(unit) => {
                unit.render_mono(out);
                out.len()
            }
            None => {
                out.fill(0.0);
                0
            }
        }
    }

    /// Streams currently alive.
    pub fn active_streams(&self) -> usize {
        self.shared.active.load(Ordering::SeqCst)
    }

    /// Streams opened over the backend's lifetime.
    pub fn streams_opened(&self) -> usize {
        self.shared.opened.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.shared.slot().is_some()
    }
}
