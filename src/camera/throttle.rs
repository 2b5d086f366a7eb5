//! Frame-rate throttling by discarding captures.
//!
//! The device runs at its native rate; for every displayed frame the
//! throttler performs `skip` successful captures and keeps only the last.
//! Timeouts are retried in place and never count toward `skip`.

use std::time::Duration;

use super::device::CaptureDevice;
use super::types::{CameraError, CaptureFormat, RawFrame, Wait};
use crate::shutdown::Shutdown;

/// Number of successful captures consumed per displayed frame.
///
/// `floor(device_fps / display_fps)`, never less than 1.
pub fn skip_count(device_fps: f32, display_fps: u32) -> u32 {
    if display_fps == 0 || !device_fps.is_finite() || device_fps <= 0.0 {
        return 1;
    }
    let ratio = (device_fps / display_fps as f32).floor();
    if ratio < 1.0 {
        1
    } else {
        ratio as u32
    }
}

/// Pulls frames from a streaming device at the display rate.
///
/// Owns the device exclusively; dropping the throttler closes it.
pub struct Throttler<D: CaptureDevice> {
    device: D,
    skip: u32,
    timeout: Duration,
    shutdown: Shutdown,
    timeouts: u64,
}

impl<D: CaptureDevice> std::fmt::Debug for Throttler<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttler")
            .field("skip", &self.skip)
            .field("timeout", &self.timeout)
            .field("timeouts", &self.timeouts)
            .finish_non_exhaustive()
    }
}

impl<D: CaptureDevice> Throttler<D> {
    /// Wrap a device that is already streaming in `format`.
    pub fn new(
        device: D,
        format: &CaptureFormat,
        display_fps: u32,
        timeout: Duration,
        shutdown: Shutdown,
    ) -> Self {
        let skip = skip_count(format.frame_rate, display_fps);
        log::debug!(
            "Throttling {}fps capture to {}fps: keeping 1 of every {} frames",
            format.frame_rate,
            display_fps,
            skip
        );
        Self {
            device,
            skip,
            timeout,
            shutdown,
            timeouts: 0,
        }
    }

    pub fn skip(&self) -> u32 {
        self.skip
    }

    /// Total capture timeouts seen so far.
    pub fn timeouts(&self) -> u64 {
        self.timeouts
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Produce the next frame for display.
    ///
    /// Returns `Ok(None)` if shutdown was requested while waiting. The
    /// returned frame may be empty; callers skip decoding it.
    ///
    /// # Errors
    /// Any wait or read failure other than a timeout.
    pub fn next_frame(&mut self) -> Result<Option<RawFrame>, CameraError> {
        let mut kept = None;
        let mut captured = 0;

        while captured < self.skip {
            if self.shutdown.is_triggered() {
                return Ok(None);
            }
            match self.device.wait_for_frame(self.timeout) {
                Wait::Ready => {}
                Wait::TimedOut => {
                    self.timeouts += 1;
                    log::warn!(
                        "Timed out after {:?} waiting for a frame, retrying",
                        self.timeout
                    );
                    continue;
                }
                Wait::Fatal(e) => return Err(e),
            }
            kept = Some(self.device.read_frame()?);
            captured += 1;
        }

        log::trace!("Captured {} frame(s), kept the last", captured);
        Ok(kept)
    }
}
