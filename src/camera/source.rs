//! Frame source handle and public API.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;

use super::capture_loop::{run_capture_loop, CaptureCommand};
use super::device::list_devices;
use super::types::{CameraError, CameraSettings, DeviceOrientation, Frame, Resolution};

/// Bound on frames queued between the capture and delivery threads.
///
/// A slow observer causes frames to be dropped, not buffered without bound.
const FRAME_CHANNEL_CAPACITY: usize = 4;

/// Receives frames from a running [`FrameSource`].
///
/// Both callbacks run on the delivery thread, never on the capture thread
/// and never on the caller's thread. `frame_captured` is invoked once per
/// captured frame, in capture order; blocking it for long causes frames to
/// be dropped.
pub trait FrameObserver: Send + 'static {
    /// Called once, before the first frame is delivered.
    fn capture_starting(&mut self) {}

    /// Called once per captured frame, in capture order.
    fn frame_captured(&mut self, frame: Frame);
}

/// Webcam frame source.
///
/// Owns the capture pipeline as an explicit resource: `open()` claims a
/// device, `start()` begins pushing frames to an observer, `stop()` (or
/// dropping the source) tears everything down.
///
/// Capture runs on a dedicated background thread that owns the camera;
/// delivery runs on a second thread so a slow observer never stalls the
/// camera itself.
pub struct FrameSource {
    /// Capture thread handle
    capture_thread: Option<JoinHandle<()>>,
    /// Observer delivery thread handle
    delivery_thread: Option<JoinHandle<()>>,
    /// Channel to send commands to capture thread
    command_tx: Option<Sender<CaptureCommand>>,
    /// Signal to stop the capture thread
    stop_signal: Arc<AtomicBool>,
    /// While set, the capture thread neither grabs nor delivers frames
    paused: Arc<AtomicBool>,
    /// Last meaningful device orientation reported by the host
    orientation: DeviceOrientation,
    /// Current settings
    settings: CameraSettings,
    /// Actual resolution (set after the stream opens)
    actual_resolution: Option<Resolution>,
    /// Actual FPS (set after the stream opens)
    actual_fps: Option<u32>,
}

impl std::fmt::Debug for FrameSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSource")
            .field("settings", &self.settings)
            .field("is_running", &self.is_running())
            .field("orientation", &self.orientation)
            .finish_non_exhaustive()
    }
}

impl FrameSource {
    /// Open a frame source with the specified settings.
    ///
    /// This validates that the camera exists but doesn't open the camera
    /// stream until `start()` is called. The camera is opened inside the
    /// background thread to avoid thread-safety issues.
    ///
    /// # Errors
    /// * `CameraError::DeviceNotFound` - If the device index doesn't exist
    pub fn open(settings: CameraSettings) -> Result<Self, CameraError> {
        // First check if the device exists
        let devices = list_devices()?;
        if !devices.iter().any(|d| d.index == settings.device_index) {
            return Err(CameraError::DeviceNotFound(settings.device_index));
        }

        Ok(Self {
            capture_thread: None,
            delivery_thread: None,
            command_tx: None,
            stop_signal: Arc::new(AtomicBool::new(false)),
            paused: Arc::new(AtomicBool::new(false)),
            orientation: DeviceOrientation::Unknown,
            settings,
            actual_resolution: None,
            actual_fps: None,
        })
    }

    /// Get the current camera settings.
    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// Get the actual resolution the camera is using.
    ///
    /// Returns `None` if capture hasn't been started yet. This may differ
    /// from the requested resolution if the camera doesn't support it
    /// exactly.
    pub fn actual_resolution(&self) -> Option<Resolution> {
        self.actual_resolution
    }

    /// Get the actual frame rate the camera is using.
    ///
    /// Returns `None` if capture hasn't been started yet.
    pub fn actual_fps(&self) -> Option<u32> {
        self.actual_fps
    }

    /// Record the device orientation reported by the hosting application.
    ///
    /// `Unknown`, `FaceUp` and `FaceDown` carry no information about which
    /// way the camera points and are ignored; the previous value is kept.
    pub fn set_orientation(&mut self, orientation: DeviceOrientation) {
        if orientation.is_meaningful() {
            self.orientation = orientation;
        }
    }

    /// Get the last meaningful device orientation.
    ///
    /// `Unknown` until the host reports one.
    pub fn orientation(&self) -> DeviceOrientation {
        self.orientation
    }

    /// Start capturing and deliver frames to `observer`.
    ///
    /// Spawns the capture thread (which owns the camera) and a delivery
    /// thread that invokes the observer: `capture_starting()` once, then
    /// `frame_captured()` per frame.
    ///
    /// # Errors
    /// * `CameraError::AlreadyRunning` - If capture is already running
    /// * `CameraError::StreamFailed` - If the camera stream fails to start
    /// * `CameraError::PermissionDenied` - If camera access is denied (macOS)
    /// * `CameraError::OpenFailed` - If camera fails to open for other reasons
    pub fn start<O: FrameObserver>(&mut self, observer: O) -> Result<(), CameraError> {
        if self.is_running() {
            return Err(CameraError::AlreadyRunning);
        }

        // Reset signals
        self.stop_signal.store(false, Ordering::SeqCst);
        self.paused.store(false, Ordering::SeqCst);

        // Create channel for commands
        let (tx, rx) = mpsc::channel();
        self.command_tx = Some(tx);

        // Clone values for the capture thread
        let stop = Arc::clone(&self.stop_signal);
        let paused = Arc::clone(&self.paused);
        let settings = self.settings.clone();

        // Bounded frame channel between capture and delivery
        let (frame_tx, frame_rx) = mpsc::sync_channel::<Frame>(FRAME_CHANNEL_CAPACITY);

        // Channel to receive actual resolution/fps from thread
        let (info_tx, info_rx) = mpsc::channel::<Result<(Resolution, u32), CameraError>>();

        // Spawn background capture thread
        let capture_handle = std::thread::spawn(move || {
            run_capture_loop(settings, frame_tx, stop, paused, rx, info_tx);
        });

        // Spawn delivery thread; it ends when the capture thread drops its
        // sender
        let delivery_handle = std::thread::spawn(move || {
            let mut observer = observer;
            observer.capture_starting();
            while let Ok(frame) = frame_rx.recv() {
                observer.frame_captured(frame);
            }
        });

        self.capture_thread = Some(capture_handle);
        self.delivery_thread = Some(delivery_handle);

        // Wait for the capture thread to report success or failure
        match info_rx.recv() {
            Ok(Ok((res, fps))) => {
                self.actual_resolution = Some(res);
                self.actual_fps = Some(fps);
                Ok(())
            }
            Ok(Err(e)) => {
                self.join_threads();
                Err(e)
            }
            Err(_) => {
                // Channel closed unexpectedly
                self.join_threads();
                Err(CameraError::StreamFailed(
                    "Capture thread terminated unexpectedly".to_string(),
                ))
            }
        }
    }

    /// Suspend frame capture without tearing down the camera.
    ///
    /// No frames are delivered while paused. Pausing an already-paused or
    /// stopped source is a no-op.
    pub fn pause(&mut self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    /// Resume frame capture after [`pause`](Self::pause).
    pub fn resume(&mut self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    /// Check if frame delivery is currently paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Stop capture and delivery.
    ///
    /// Signals the capture thread to stop and waits for both background
    /// threads to finish.
    pub fn stop(&mut self) {
        // Signal the thread to stop via atomic flag
        self.stop_signal.store(true, Ordering::SeqCst);

        // Also send stop command via channel (in case thread is blocked)
        if let Some(tx) = self.command_tx.take() {
            let _ = tx.send(CaptureCommand::Stop);
        }

        self.join_threads();
    }

    /// Check if the capture thread is currently running.
    pub fn is_running(&self) -> bool {
        self.capture_thread
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    fn join_threads(&mut self) {
        self.stop_signal.store(true, Ordering::SeqCst);
        if let Some(handle) = self.capture_thread.take() {
            let _ = handle.join();
        }
        // The delivery thread exits once the capture side hangs up
        if let Some(handle) = self.delivery_thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for FrameSource {
    fn drop(&mut self) {
        self.stop();
    }
}
