pub mod command_camera;
pub mod device;

pub use command_camera::CommandCamera;
pub use device::{CaptureDevice, DeviceGuard};
