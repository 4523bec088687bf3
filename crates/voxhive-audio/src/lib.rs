pub mod capture;
pub mod device;
pub mod frame;
pub mod playback;
pub mod queue;
pub mod wav_source;

pub use capture::{AudioCapture, CaptureStats, CaptureThread};
pub use device::{list_input_devices, list_output_devices, open_input_device, open_output_device};
pub use frame::AudioFrame;
pub use playback::Playback;
pub use queue::{frame_queue, FrameReceiver, FrameSender};
pub use wav_source::WavFileSource;
