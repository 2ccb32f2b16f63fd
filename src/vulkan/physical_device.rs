use std::ffi::CStr;

use ash::vk::{
    self, PhysicalDeviceFeatures, PhysicalDeviceProperties, PhysicalDeviceType,
    QueueFamilyProperties,
};
use tracing::{debug, info};

use crate::error::{BootstrapError, Result};

use super::{
    instance::Instance,
    queue_families::{find_queue_families, QueueFamilies},
    surface::Surface,
};

/// Read-only view of the physical devices the driver exposes.
pub trait DeviceCatalog {
    fn physical_devices(&self) -> Result<Vec<vk::PhysicalDevice>>;
    fn profile(&self, physical_device: vk::PhysicalDevice) -> DeviceProfile;
    fn queue_families(&self, physical_device: vk::PhysicalDevice) -> Vec<QueueFamilyProperties>;
    /// Whether the given queue family can present to the target surface
    fn supports_presentation(
        &self,
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
    ) -> Result<bool>;
}

/// Properties and features of a physical device, as used to judge its suitability.
#[derive(Clone, Copy)]
pub struct DeviceProfile {
    pub properties: PhysicalDeviceProperties,
    pub features: PhysicalDeviceFeatures,
}

impl DeviceProfile {
    pub fn name(&self) -> String {
        unsafe { CStr::from_ptr(self.properties.device_name.as_ptr()) }
            .to_string_lossy()
            .into_owned()
    }

    pub fn device_type(&self) -> PhysicalDeviceType {
        self.properties.device_type
    }
}

/// Gate a physical device has to pass to be picked.
pub type SuitabilityPredicate = fn(&DeviceProfile) -> bool;

/// Only discrete GPUs that can run geometry shaders.
pub fn discrete_with_geometry_shader(profile: &DeviceProfile) -> bool {
    profile.device_type() == PhysicalDeviceType::DISCRETE_GPU
        && profile.features.geometry_shader == vk::TRUE
}

/// Accepts every device.
pub fn any_device(_profile: &DeviceProfile) -> bool {
    true
}

/// The physical device picked for the logical device, with its resolved queue families.
#[derive(Clone, Copy)]
pub struct SelectedDevice {
    pub physical_device: vk::PhysicalDevice,
    pub profile: DeviceProfile,
    pub queue_families: QueueFamilies,
}

/// Picks the first enumerated device the predicate accepts and resolves its queue
/// families. There is no ranking between devices that pass.
pub fn select_physical_device(
    catalog: &impl DeviceCatalog,
    suitability: SuitabilityPredicate,
) -> Result<SelectedDevice> {
    let physical_devices = catalog.physical_devices()?;
    if physical_devices.is_empty() {
        return Err(BootstrapError::NoCompatibleDevice);
    }
    debug!("Found {} physical device(s)", physical_devices.len());

    let (physical_device, profile) = physical_devices
        .iter()
        .map(|&physical_device| (physical_device, catalog.profile(physical_device)))
        .find(|(_, profile)| suitability(profile))
        .ok_or(BootstrapError::NoSuitableDevice {
            inspected: physical_devices.len(),
        })?;
    info!(
        "Selected physical device {} ({:?})",
        profile.name(),
        profile.device_type()
    );

    let queue_families = find_queue_families(catalog, physical_device)?;
    Ok(SelectedDevice {
        physical_device,
        profile,
        queue_families,
    })
}

/// Answers device queries through the instance, and presentation queries against one surface.
pub struct VulkanDeviceCatalog<'a> {
    instance: &'a Instance,
    surface: &'a Surface,
}

impl<'a> VulkanDeviceCatalog<'a> {
    pub fn new(instance: &'a Instance, surface: &'a Surface) -> Self {
        Self { instance, surface }
    }
}

impl DeviceCatalog for VulkanDeviceCatalog<'_> {
    fn physical_devices(&self) -> Result<Vec<vk::PhysicalDevice>> {
        unsafe { self.instance.enumerate_physical_devices() }.map_err(|result| {
            BootstrapError::DriverQueryFailed {
                query: "vkEnumeratePhysicalDevices",
                result,
            }
        })
    }

    fn profile(&self, physical_device: vk::PhysicalDevice) -> DeviceProfile {
        unsafe {
            DeviceProfile {
                properties: self.instance.get_physical_device_properties(physical_device),
                features: self.instance.get_physical_device_features(physical_device),
            }
        }
    }

    fn queue_families(&self, physical_device: vk::PhysicalDevice) -> Vec<QueueFamilyProperties> {
        unsafe {
            self.instance
                .get_physical_device_queue_family_properties(physical_device)
        }
    }

    fn supports_presentation(
        &self,
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
    ) -> Result<bool> {
        self.surface
            .get_physical_device_surface_support(physical_device, queue_family_index)
    }
}
