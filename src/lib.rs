pub mod config;
pub mod error;
pub mod logging;
pub mod vulkan;
pub mod window;

pub use config::Config;
pub use error::{BootstrapError, CapabilityKind, QueueRole};
pub use vulkan::VulkanContext;
pub use window::WindowManager;
