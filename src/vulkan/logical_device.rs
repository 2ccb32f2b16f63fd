use std::{ffi::CString, ops::Deref, rc::Rc};

use ash::{
    vk::{self, DeviceCreateInfo, DeviceQueueCreateInfo, PhysicalDeviceFeatures},
    Device,
};
use tracing::{debug, info, trace};

use crate::error::{BootstrapError, QueueRole, Result};

use super::{instance::Instance, physical_device::SelectedDevice, queue_families::QueueFamilies};

static QUEUE_PRIORITIES: [f32; 1] = [1.0];

/// Handles to the queues for submitting instructions to.
#[derive(Debug, Clone, Copy)]
pub struct QueueHandles {
    pub graphics: vk::Queue,
    pub present: vk::Queue,
}

impl QueueHandles {
    /// Fetches queue 0 of each role's family. Roles sharing a family get the same queue.
    fn retrieve(families: &QueueFamilies, mut get_queue: impl FnMut(u32) -> vk::Queue) -> Self {
        let mut queue_for = |role: QueueRole| {
            let family = families.index_for(role);
            let queue = get_queue(family);
            assert!(
                queue != vk::Queue::null(),
                "no {role} queue on family {family}, the family does not belong to this device"
            );
            queue
        };
        Self {
            graphics: queue_for(QueueRole::Graphics),
            present: queue_for(QueueRole::Presentation),
        }
    }
}

/// One create info per distinct queue family, each asking for a single queue.
pub fn queue_create_infos(families: &QueueFamilies) -> Vec<DeviceQueueCreateInfo> {
    families
        .unique_indices()
        .into_iter()
        .map(|queue_family_index| {
            DeviceQueueCreateInfo::builder()
                .queue_family_index(queue_family_index)
                .queue_priorities(&QUEUE_PRIORITIES)
                .build()
        })
        .collect()
}

/// The logical device for interfacing with the selected physical device.
pub struct LogicalDevice {
    device: Device,
    queues: QueueHandles,
    selected: SelectedDevice,
    _instance: Rc<Instance>,
}

impl LogicalDevice {
    /// Creates the logical device with one queue per queue family in use and no optional
    /// features or extensions. `layers` is only looked at by older loaders.
    pub fn new(
        instance: &Rc<Instance>,
        selected: &SelectedDevice,
        layers: &[CString],
    ) -> Result<Self> {
        let queue_create_infos = queue_create_infos(&selected.queue_families);
        let physical_device_features = PhysicalDeviceFeatures::default();
        let layer_name_ptrs = layers
            .iter()
            .map(|layer_name| layer_name.as_ptr())
            .collect::<Vec<_>>();
        debug!(
            "Creating logical device with {} queue create info(s)",
            queue_create_infos.len()
        );

        let device_create_info = DeviceCreateInfo::builder()
            .queue_create_infos(&queue_create_infos)
            .enabled_features(&physical_device_features)
            .enabled_layer_names(&layer_name_ptrs);

        let device = unsafe {
            instance.create_device(selected.physical_device, &device_create_info, None)
        }
        .map_err(BootstrapError::DeviceCreationFailed)?;
        info!("Logical device created");

        let queues = QueueHandles::retrieve(&selected.queue_families, |family| unsafe {
            device.get_device_queue(family, 0)
        });

        Ok(Self {
            device,
            queues,
            selected: *selected,
            _instance: Rc::clone(instance),
        })
    }

    pub fn queues(&self) -> &QueueHandles {
        &self.queues
    }

    /// The physical device this device was created on.
    pub fn selected(&self) -> &SelectedDevice {
        &self.selected
    }
}

impl Drop for LogicalDevice {
    fn drop(&mut self) {
        unsafe { self.device.destroy_device(None) };
        trace!("Logical device destroyed");
    }
}

impl Deref for LogicalDevice {
    type Target = Device;

    fn deref(&self) -> &Self::Target {
        &self.device
    }
}
