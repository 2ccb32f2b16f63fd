use std::cell::RefCell;

use ash::vk::{
    self, Handle, PhysicalDeviceFeatures, PhysicalDeviceProperties, PhysicalDeviceType,
    QueueFamilyProperties, QueueFlags,
};

use crate::error::Result;

use super::physical_device::{DeviceCatalog, DeviceProfile};

pub struct FakeDevice {
    device_type: PhysicalDeviceType,
    geometry_shader: bool,
    /// Capabilities per queue family, and whether it can present
    families: Vec<(QueueFlags, bool)>,
}

impl FakeDevice {
    pub fn new(
        device_type: PhysicalDeviceType,
        geometry_shader: bool,
        families: Vec<(QueueFlags, bool)>,
    ) -> Self {
        Self {
            device_type,
            geometry_shader,
            families,
        }
    }
}

/// In-memory driver. Device `i` gets the raw handle `i`.
pub struct FakeDeviceCatalog {
    devices: Vec<FakeDevice>,
    presentation_queries: RefCell<Vec<(vk::PhysicalDevice, u32)>>,
}

impl FakeDeviceCatalog {
    pub fn new(devices: Vec<FakeDevice>) -> Self {
        Self {
            devices,
            presentation_queries: RefCell::default(),
        }
    }

    pub fn handle(index: usize) -> vk::PhysicalDevice {
        vk::PhysicalDevice::from_raw(index as u64)
    }

    pub fn presentation_queries(&self) -> Vec<(vk::PhysicalDevice, u32)> {
        self.presentation_queries.borrow().clone()
    }

    fn device(&self, physical_device: vk::PhysicalDevice) -> &FakeDevice {
        &self.devices[physical_device.as_raw() as usize]
    }
}

impl DeviceCatalog for FakeDeviceCatalog {
    fn physical_devices(&self) -> Result<Vec<vk::PhysicalDevice>> {
        Ok((0..self.devices.len()).map(Self::handle).collect())
    }

    fn profile(&self, physical_device: vk::PhysicalDevice) -> DeviceProfile {
        let index = physical_device.as_raw();
        let device = self.device(physical_device);

        let mut properties = PhysicalDeviceProperties {
            device_type: device.device_type,
            ..Default::default()
        };
        let name = format!("fake device {index}");
        for (dst, src) in properties.device_name.iter_mut().zip(name.bytes()) {
            *dst = src as _;
        }

        DeviceProfile {
            properties,
            features: PhysicalDeviceFeatures {
                geometry_shader: device.geometry_shader.into(),
                ..Default::default()
            },
        }
    }

    fn queue_families(&self, physical_device: vk::PhysicalDevice) -> Vec<QueueFamilyProperties> {
        self.device(physical_device)
            .families
            .iter()
            .map(|(queue_flags, _)| QueueFamilyProperties {
                queue_flags: *queue_flags,
                queue_count: 1,
                ..Default::default()
            })
            .collect()
    }

    fn supports_presentation(
        &self,
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
    ) -> Result<bool> {
        self.presentation_queries
            .borrow_mut()
            .push((physical_device, queue_family_index));
        Ok(self.device(physical_device).families[queue_family_index as usize].1)
    }
}
