//! Live input through cpal
//!
//! The cpal callback runs on the backend's thread and only appends to a
//! bounded [`CaptureQueue`]. `read_frame` waits on the queue's condvar until a
//! full frame is there. If the reader falls behind by more than the configured
//! backlog the oldest samples are dropped and the next read reports an
//! overflow.

use super::{quantize, AudioFrame, SampleSource};
use crate::config::{SampleFormat, SourceConfig};
use crate::error::{DeviceError, StreamError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::Sample;
use std::collections::VecDeque;
use std::fs::File;
use std::os::unix::io::AsRawFd;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

/// RAII guard to suppress stderr during ALSA device enumeration
/// Restores stderr when dropped
struct StderrSuppressor {
    saved_fd: i32,
    dev_null: File,
}

impl StderrSuppressor {
    fn new() -> Option<Self> {
        let dev_null = File::open("/dev/null").ok()?;

        let saved_fd = unsafe { libc::dup(2) };
        if saved_fd < 0 {
            return None;
        }

        let dup2_result = unsafe { libc::dup2(dev_null.as_raw_fd(), 2) };
        if dup2_result < 0 {
            unsafe { libc::close(saved_fd); }
            return None;
        }

        Some(Self { saved_fd, dev_null })
    }
}

impl Drop for StderrSuppressor {
    fn drop(&mut self) {
        unsafe {
            libc::dup2(self.saved_fd, 2);
            libc::close(self.saved_fd);
        }
        let _ = &self.dev_null; // Keep dev_null alive until here
    }
}

struct CaptureBuffer {
    samples: VecDeque<i32>,
    capacity: usize,
    dropped: usize,
    error: Option<String>,
}

/// Bounded sample queue shared between the capture callback and the reader
pub struct CaptureQueue {
    buffer: Mutex<CaptureBuffer>,
    ready: Condvar,
}

impl CaptureQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Mutex::new(CaptureBuffer {
                samples: VecDeque::with_capacity(capacity),
                capacity: capacity.max(1),
                dropped: 0,
                error: None,
            }),
            ready: Condvar::new(),
        }
    }

    /// Append captured samples, dropping the oldest ones when full
    pub fn push<I: IntoIterator<Item = i32>>(&self, samples: I) {
        if let Ok(mut buf) = self.buffer.lock() {
            for sample in samples {
                if buf.samples.len() == buf.capacity {
                    buf.samples.pop_front();
                    buf.dropped += 1;
                }
                buf.samples.push_back(sample);
            }
        }
        self.ready.notify_one();
    }

    /// Record a backend error; the next read fails with it
    pub fn fail(&self, message: String) {
        if let Ok(mut buf) = self.buffer.lock() {
            buf.error = Some(message);
        }
        self.ready.notify_one();
    }

    /// Discard everything captured so far
    pub fn clear(&self) {
        if let Ok(mut buf) = self.buffer.lock() {
            buf.samples.clear();
            buf.dropped = 0;
        }
    }

    /// Wait up to `timeout` for `len` samples
    pub fn wait_frame(&self, len: usize, timeout: Duration) -> Result<Vec<i32>, StreamError> {
        let deadline = Instant::now() + timeout;
        let mut buf = self
            .buffer
            .lock()
            .map_err(|_| StreamError::Disconnected("capture buffer poisoned".to_string()))?;

        loop {
            if let Some(message) = buf.error.take() {
                return Err(StreamError::Disconnected(message));
            }
            if buf.dropped > 0 {
                let dropped = std::mem::take(&mut buf.dropped);
                return Err(StreamError::Overflow { dropped });
            }
            if buf.samples.len() >= len {
                return Ok(buf.samples.drain(..len).collect());
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(StreamError::Stalled(timeout));
            }
            let (guard, _) = self
                .ready
                .wait_timeout(buf, deadline - now)
                .map_err(|_| StreamError::Disconnected("capture buffer poisoned".to_string()))?;
            buf = guard;
        }
    }
}

/// Input device held for the lifetime of the value
pub struct DeviceSource {
    stream: cpal::Stream,
    queue: Arc<CaptureQueue>,
    chunk_size: usize,
    format: SampleFormat,
    read_timeout: Duration,
    device_name: String,
}

impl DeviceSource {
    /// Acquire the configured input device and start capturing
    pub fn open(config: &SourceConfig) -> Result<Self, DeviceError> {
        // ALSA prints enumeration noise straight to stderr
        let stderr_guard = StderrSuppressor::new();

        let host = cpal::default_host();
        log::debug!("Host: {:?}", host.id());

        let device = find_device(&host, config.device.as_deref())?;
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        log::info!("Using input device: {}", device_name);

        let native_format = supported_format(&device, config)?;
        log::debug!(
            "Native format {:?}, requested {}Hz {} channel(s) {:?}",
            native_format,
            config.sample_rate,
            config.channels,
            config.sample_format
        );

        let stream_config = cpal::StreamConfig {
            channels: config.channels,
            sample_rate: cpal::SampleRate(config.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let capacity = config.chunk_size * config.max_backlog_frames.max(1);
        let queue = Arc::new(CaptureQueue::new(capacity));
        let format = config.sample_format;

        let stream = match native_format {
            cpal::SampleFormat::I8 => build_stream::<i8>(&device, &stream_config, &queue, format),
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, &queue, format),
            cpal::SampleFormat::I32 => build_stream::<i32>(&device, &stream_config, &queue, format),
            cpal::SampleFormat::U8 => build_stream::<u8>(&device, &stream_config, &queue, format),
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, &queue, format),
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, &queue, format),
            cpal::SampleFormat::F64 => build_stream::<f64>(&device, &stream_config, &queue, format),
            other => {
                return Err(DeviceError::UnsupportedConfig(format!(
                    "native sample format {:?}",
                    other
                )))
            }
        }?;

        stream.play()?;
        drop(stderr_guard);

        Ok(Self {
            stream,
            queue,
            chunk_size: config.chunk_size,
            format,
            read_timeout: Duration::from_millis(config.read_timeout_ms),
            device_name,
        })
    }
}

impl SampleSource for DeviceSource {
    fn read_frame(&mut self) -> Result<AudioFrame, StreamError> {
        let samples = self.queue.wait_frame(self.chunk_size, self.read_timeout)?;
        Ok(AudioFrame::new(samples, self.format))
    }

    fn suspend(&mut self) {
        // Not every backend can pause; stale samples are dropped on resume either way
        if let Err(e) = self.stream.pause() {
            log::warn!("Could not pause input stream: {}", e);
        }
    }

    fn resume(&mut self) -> Result<(), StreamError> {
        self.queue.clear();
        self.stream
            .play()
            .map_err(|e| StreamError::Resume(e.to_string()))
    }
}

impl Drop for DeviceSource {
    fn drop(&mut self) {
        log::info!("Releasing input device: {}", self.device_name);
    }
}

fn find_device(host: &cpal::Host, name: Option<&str>) -> Result<cpal::Device, DeviceError> {
    match name {
        None => host.default_input_device().ok_or(DeviceError::NoInputDevice),
        Some(wanted) => host
            .input_devices()?
            .find(|d| d.name().map(|n| n == wanted).unwrap_or(false))
            .ok_or_else(|| DeviceError::DeviceNotFound(wanted.to_string())),
    }
}

/// Native sample format of a config range matching the requested rate and channels
fn supported_format(device: &cpal::Device, config: &SourceConfig) -> Result<cpal::SampleFormat, DeviceError> {
    let rate = cpal::SampleRate(config.sample_rate);
    let ranges = device
        .supported_input_configs()
        .map_err(|e| DeviceError::UnsupportedConfig(e.to_string()))?;

    ranges
        .filter(|r| r.channels() == config.channels)
        .find(|r| r.min_sample_rate() <= rate && rate <= r.max_sample_rate())
        .map(|r| r.with_sample_rate(rate).sample_format())
        .ok_or_else(|| {
            DeviceError::UnsupportedConfig(format!(
                "{}Hz with {} channel(s)",
                config.sample_rate, config.channels
            ))
        })
}

/// Build an input stream for native sample type `T`, keeping only the first channel
fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    queue: &Arc<CaptureQueue>,
    format: SampleFormat,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: cpal::SizedSample,
    f32: cpal::FromSample<T>,
{
    let channels = config.channels.max(1) as usize;
    let data_queue = Arc::clone(queue);
    let error_queue = Arc::clone(queue);

    device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            data_queue.push(
                data.iter()
                    .step_by(channels)
                    .map(|&s| quantize(s.to_sample::<f32>(), format)),
            );
        },
        move |err| {
            log::error!("Audio stream error: {}", err);
            error_queue.fail(err.to_string());
        },
        None,
    )
}

/// One line of `specan devices` output
pub struct DeviceInfo {
    pub name: String,
    pub is_default: bool,
    pub default_config: Option<String>,
}

pub fn list_devices() -> Result<Vec<DeviceInfo>, DeviceError> {
    let stderr_guard = StderrSuppressor::new();
    let host = cpal::default_host();
    let default_name = host.default_input_device().and_then(|d| d.name().ok());

    let devices = host
        .input_devices()?
        .map(|device| {
            let name = device.name().unwrap_or_else(|_| "Unknown".to_string());
            let default_config = device.default_input_config().ok().map(|c| {
                format!("{}Hz, {} channel(s), {:?}", c.sample_rate().0, c.channels(), c.sample_format())
            });
            DeviceInfo {
                is_default: default_name.as_deref() == Some(name.as_str()),
                name,
                default_config,
            }
        })
        .collect();

    drop(stderr_guard);
    Ok(devices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn frame_is_returned_once_enough_samples_arrive() {
        let queue = CaptureQueue::new(64);
        queue.push(0..5);
        queue.push(5..10);
        let frame = queue.wait_frame(8, Duration::from_millis(10)).unwrap();
        assert_eq!(frame, (0..8).collect::<Vec<_>>());
        // leftovers stay queued
        queue.push(10..16);
        let frame = queue.wait_frame(8, Duration::from_millis(10)).unwrap();
        assert_eq!(frame, (8..16).collect::<Vec<_>>());
    }

    #[test]
    fn short_queue_stalls_after_timeout() {
        let queue = CaptureQueue::new(64);
        queue.push(0..3);
        let err = queue.wait_frame(8, Duration::from_millis(20)).unwrap_err();
        assert!(matches!(err, StreamError::Stalled(_)));
    }

    #[test]
    fn overflow_is_reported_once() {
        let queue = CaptureQueue::new(8);
        queue.push(0..12);
        let err = queue.wait_frame(8, Duration::from_millis(10)).unwrap_err();
        assert!(matches!(err, StreamError::Overflow { dropped: 4 }));
        // newest samples survive
        let frame = queue.wait_frame(8, Duration::from_millis(10)).unwrap();
        assert_eq!(frame, (4..12).collect::<Vec<_>>());
    }

    #[test]
    fn backend_error_surfaces_as_disconnect() {
        let queue = CaptureQueue::new(16);
        queue.fail("device unplugged".to_string());
        let err = queue.wait_frame(4, Duration::from_millis(10)).unwrap_err();
        assert!(matches!(err, StreamError::Disconnected(ref m) if m == "device unplugged"));
    }

    #[test]
    fn clear_discards_backlog() {
        let queue = CaptureQueue::new(8);
        queue.push(0..12);
        queue.clear();
        queue.push(100..104);
        let frame = queue.wait_frame(4, Duration::from_millis(10)).unwrap();
        assert_eq!(frame, vec![100, 101, 102, 103]);
    }

    #[test]
    fn reader_wakes_when_producer_delivers() {
        let queue = Arc::new(CaptureQueue::new(1024));
        let producer = Arc::clone(&queue);
        let handle = thread::spawn(move || {
            for chunk in 0..4 {
                thread::sleep(Duration::from_millis(5));
                producer.push(chunk * 32..(chunk + 1) * 32);
            }
        });
        let frame = queue.wait_frame(128, Duration::from_secs(2)).unwrap();
        assert_eq!(frame.len(), 128);
        assert_eq!(frame[127], 127);
        handle.join().unwrap();
    }
}
