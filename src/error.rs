//! Error taxonomy for acquisition, processing and the session loop

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Failure to acquire the input device. Fatal at startup.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("No audio input device found")]
    NoInputDevice,

    #[error("Input device not found: {0}")]
    DeviceNotFound(String),

    #[error("Failed to enumerate input devices: {0}")]
    Enumerate(#[from] cpal::DevicesError),

    #[error("Device does not support the requested configuration: {0}")]
    UnsupportedConfig(String),

    #[error("Failed to build input stream: {0}")]
    Build(#[from] cpal::BuildStreamError),

    #[error("Failed to start input stream: {0}")]
    Play(#[from] cpal::PlayStreamError),
}

/// Failure while reading frames from an open source. Aborts the session.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Input stream disconnected: {0}")]
    Disconnected(String),

    #[error("Input buffer overflow, {dropped} samples dropped")]
    Overflow { dropped: usize },

    #[error("No audio received for {0:?}")]
    Stalled(Duration),

    #[error("Failed to resume input stream: {0}")]
    Resume(String),
}

/// Failure to transform one frame. The tick is skipped.
#[derive(Debug, Error, PartialEq)]
pub enum ProcessingError {
    #[error("Frame has {actual} samples, expected {expected}")]
    FrameLength { expected: usize, actual: usize },

    #[error("Transform failed: {0}")]
    Transform(String),
}

/// Errors that end a running session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error("Display error: {0}")]
    Render(#[from] io::Error),
}
