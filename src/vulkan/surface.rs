use std::{ops::Deref, rc::Rc};

use ash::{
    extensions::khr,
    prelude::VkResult,
    vk::{self, PhysicalDevice, SurfaceKHR},
};
use tracing::{info, trace};

use crate::error::{BootstrapError, Result};

use super::instance::Instance;

/// Whatever the surface gets drawn into. The window system decides which instance
/// extensions are needed to present to it, `None` when it cannot tell.
pub trait PresentationTarget {
    fn required_instance_extensions(&self) -> Option<Vec<String>>;
    fn create_surface(&self, instance: vk::Instance) -> VkResult<SurfaceKHR>;
}

pub struct Surface {
    surface_fn: khr::Surface,
    surface_ptr: SurfaceKHR,
    // references to make sure we are dropped before these
    _instance: Rc<Instance>,
}

impl Surface {
    pub fn new(instance: &Rc<Instance>, target: &impl PresentationTarget) -> Result<Self> {
        let surface_ptr = target
            .create_surface(instance.handle())
            .map_err(BootstrapError::SurfaceCreationFailed)?;
        let surface_fn = khr::Surface::new(instance.get_entry(), instance);
        info!("Surface created");
        Ok(Self {
            surface_fn,
            surface_ptr,
            _instance: Rc::clone(instance),
        })
    }

    pub(crate) fn get_physical_device_surface_support(
        &self,
        physical_device: PhysicalDevice,
        queue_family_index: u32,
    ) -> Result<bool> {
        unsafe {
            self.surface_fn.get_physical_device_surface_support(
                physical_device,
                queue_family_index,
                self.surface_ptr,
            )
        }
        .map_err(|result| BootstrapError::DriverQueryFailed {
            query: "vkGetPhysicalDeviceSurfaceSupportKHR",
            result,
        })
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        unsafe { self.surface_fn.destroy_surface(self.surface_ptr, None) };
        trace!("Surface destroyed");
    }
}

impl Deref for Surface {
    type Target = SurfaceKHR;

    fn deref(&self) -> &Self::Target {
        &self.surface_ptr
    }
}
