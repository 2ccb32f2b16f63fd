use std::collections::BTreeSet;

use ash::vk::{self, QueueFlags};
use tracing::debug;

use crate::error::{BootstrapError, QueueRole, Result};

use super::physical_device::DeviceCatalog;

/// Holds the indexes of the relevant queue families while they are being looked up.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    /// family capable of running graphics related commands
    pub graphics_family: Option<u32>,
    /// family capable of displaying results on the surface
    pub present_family: Option<u32>,
}

impl QueueFamilyIndices {
    /// True if all queue families are available for this physical device.
    pub fn is_complete(&self) -> bool {
        self.graphics_family.is_some() && self.present_family.is_some()
    }

    pub fn missing(&self) -> Vec<QueueRole> {
        let mut missing = vec![];
        if self.graphics_family.is_none() {
            missing.push(QueueRole::Graphics);
        }
        if self.present_family.is_none() {
            missing.push(QueueRole::Presentation);
        }
        missing
    }

    pub fn complete(self) -> Result<QueueFamilies> {
        match (self.graphics_family, self.present_family) {
            (Some(graphics), Some(presentation)) => Ok(QueueFamilies {
                graphics,
                presentation,
            }),
            _ => Err(BootstrapError::IncompleteQueueFamilies {
                missing: self.missing(),
            }),
        }
    }
}

/// Queue family index for every role. Only exists once all roles are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilies {
    pub graphics: u32,
    pub presentation: u32,
}

impl QueueFamilies {
    pub fn index_for(&self, role: QueueRole) -> u32 {
        match role {
            QueueRole::Graphics => self.graphics,
            QueueRole::Presentation => self.presentation,
        }
    }

    /// Distinct family indices in ascending order. A family serving several roles shows up once.
    pub fn unique_indices(&self) -> Vec<u32> {
        BTreeSet::from([self.graphics, self.presentation])
            .into_iter()
            .collect()
    }
}

/// Walks the device's queue families in order, taking the first family that fits each role.
/// Stops as soon as every role has a family.
pub fn find_queue_families(
    catalog: &impl DeviceCatalog,
    physical_device: vk::PhysicalDevice,
) -> Result<QueueFamilies> {
    let mut indices = QueueFamilyIndices::default();

    for (index, properties) in catalog.queue_families(physical_device).iter().enumerate() {
        let index = index as u32;
        if indices.graphics_family.is_none() && properties.queue_flags.contains(QueueFlags::GRAPHICS)
        {
            indices.graphics_family = Some(index);
        }
        if indices.present_family.is_none()
            && catalog.supports_presentation(physical_device, index)?
        {
            indices.present_family = Some(index);
        }
        if indices.is_complete() {
            break;
        }
    }

    debug!("Queue family indices: {:?}", indices);
    indices.complete()
}
