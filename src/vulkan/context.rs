use std::rc::Rc;

use ash::Entry;
use tracing::{info, trace};

use crate::{config::Config, error::Result};

use super::{
    capabilities::{negotiate, required_extensions},
    debug_utils::DebugMessenger,
    instance::Instance,
    logical_device::{LogicalDevice, QueueHandles},
    physical_device::{select_physical_device, SelectedDevice, VulkanDeviceCatalog},
    surface::{PresentationTarget, Surface},
};

/// Handles in the order they have to be released. Fields drop in declaration order,
/// which is the reverse of the order `assemble` creates them in: device, surface,
/// debug messenger, instance.
struct ContextHandles<I, M, S, D> {
    device: D,
    surface: S,
    debug_messenger: Option<M>,
    instance: I,
}

impl<I, M, S, D> ContextHandles<I, M, S, D> {
    /// Runs each creation step in turn. When a step fails, only the handles made by the
    /// steps before it are dropped, newest first.
    fn assemble(
        instance: impl FnOnce() -> Result<I>,
        debug_messenger: impl FnOnce(&I) -> Result<Option<M>>,
        surface: impl FnOnce(&I) -> Result<S>,
        device: impl FnOnce(&I, &S) -> Result<D>,
    ) -> Result<Self> {
        let instance = instance()?;
        let debug_messenger = debug_messenger(&instance)?;
        let surface = surface(&instance)?;
        let device = device(&instance, &surface)?;
        Ok(Self {
            device,
            surface,
            debug_messenger,
            instance,
        })
    }
}

/// Everything the bootstrap produced.
pub struct VulkanContext {
    handles: ContextHandles<Rc<Instance>, DebugMessenger, Surface, LogicalDevice>,
}

impl VulkanContext {
    /// Runs the whole bootstrap against the given presentation target. If a step fails, the
    /// handles created by earlier steps are released before the error is returned.
    pub fn new(config: &Config, target: &impl PresentationTarget) -> Result<Self> {
        let entry = Entry::linked();

        let extensions = required_extensions(
            target.required_instance_extensions(),
            config.enable_validations,
        )?;
        let capabilities = negotiate(&entry, extensions, config.validation_layers())?;

        let handles = ContextHandles::assemble(
            || Ok(Rc::new(Instance::new(entry, config, &capabilities)?)),
            |instance| DebugMessenger::attach(instance, config.enable_validations),
            |instance| Surface::new(instance, target),
            |instance, surface| {
                let selected = select_physical_device(
                    &VulkanDeviceCatalog::new(instance, surface),
                    config.suitability,
                )?;
                let device_layers = if config.device_layers {
                    capabilities.layer_names()?
                } else {
                    vec![]
                };
                LogicalDevice::new(instance, &selected, &device_layers)
            },
        )?;
        info!("Vulkan bootstrap complete");

        Ok(Self { handles })
    }

    pub fn instance(&self) -> &Instance {
        &self.handles.instance
    }

    pub fn surface(&self) -> &Surface {
        &self.handles.surface
    }

    pub fn selected_device(&self) -> &SelectedDevice {
        self.handles.device.selected()
    }

    pub fn has_debug_messenger(&self) -> bool {
        self.handles.debug_messenger.is_some()
    }

    pub fn device(&self) -> &LogicalDevice {
        &self.handles.device
    }

    pub fn queues(&self) -> &QueueHandles {
        self.handles.device.queues()
    }
}

impl Drop for VulkanContext {
    fn drop(&mut self) {
        // handles follow: device, surface, debug messenger, instance
        trace!("Tearing down Vulkan context");
    }
}
