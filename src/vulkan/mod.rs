mod capabilities;
mod context;
mod debug_utils;
mod instance;
mod logical_device;
mod physical_device;
mod queue_families;
mod surface;
#[cfg(test)]
mod test_support;

pub use capabilities::{negotiate, required_extensions, CapabilityCatalog, NegotiatedCapabilities};
pub use context::VulkanContext;
pub use debug_utils::{
    debug_messenger_create_info, route_message, vulkan_debug_utils_callback, DebugMessenger,
    DiagnosticStream,
};
pub use instance::Instance;
pub use logical_device::{queue_create_infos, LogicalDevice, QueueHandles};
pub use physical_device::{
    any_device, discrete_with_geometry_shader, select_physical_device, DeviceCatalog,
    DeviceProfile, SelectedDevice, SuitabilityPredicate, VulkanDeviceCatalog,
};
pub use queue_families::{find_queue_families, QueueFamilies, QueueFamilyIndices};
pub use surface::{PresentationTarget, Surface};
