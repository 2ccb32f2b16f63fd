use std::{ffi::c_char, ops::Deref};

use ash::{
    vk::{
        ApplicationInfo, DebugUtilsMessengerCreateInfoEXT, InstanceCreateInfo,
        InstanceCreateInfoBuilder,
    },
    Entry,
};
use tracing::{info, trace};

use crate::{
    config::Config,
    error::{BootstrapError, Result},
};

use super::{
    capabilities::{to_cstring, NegotiatedCapabilities},
    debug_utils::debug_messenger_create_info,
};

pub struct Instance {
    instance: ash::Instance,
    entry: Entry,
}

impl Instance {
    /// Creates an Instance to interact with the core of Vulkan. Enables the negotiated
    /// extensions and layers, and when validations are on chains the debug messenger
    /// description in so instance creation itself is validated.
    pub fn new(entry: Entry, config: &Config, capabilities: &NegotiatedCapabilities) -> Result<Self> {
        let app_name = to_cstring(&config.app_name)?;
        let engine_name = to_cstring(&config.engine_name)?;
        let app_info = ApplicationInfo::builder()
            .application_name(&app_name)
            .application_version(config.app_version)
            .engine_name(&engine_name)
            .engine_version(config.engine_version)
            .api_version(config.api_version);

        let enabled_extension_names = capabilities.extension_names()?;
        let enabled_extension_name_ptrs = enabled_extension_names
            .iter()
            .map(|extension_name| extension_name.as_ptr())
            .collect::<Vec<_>>();

        let enabled_layer_names = capabilities.layer_names()?;
        let enabled_layer_name_ptrs = enabled_layer_names
            .iter()
            .map(|layer_name| layer_name.as_ptr())
            .collect::<Vec<_>>();

        let mut debug_messenger_create_info = debug_messenger_create_info();
        let instance_create_info = instance_create_info(
            &app_info,
            &enabled_extension_name_ptrs,
            &enabled_layer_name_ptrs,
            config
                .enable_validations
                .then_some(&mut debug_messenger_create_info),
        );

        let instance = unsafe { entry.create_instance(&instance_create_info, None) }
            .map_err(BootstrapError::InstanceCreationFailed)?;
        info!("Vulkan instance created");

        Ok(Self { instance, entry })
    }

    pub fn get_entry(&self) -> &Entry {
        &self.entry
    }
}

/// Assembles the instance create info. The debug messenger description, when given, is
/// chained through `p_next`.
fn instance_create_info<'a>(
    app_info: &'a ApplicationInfo,
    extension_names: &'a [*const c_char],
    layer_names: &'a [*const c_char],
    debug_messenger_create_info: Option<&'a mut DebugUtilsMessengerCreateInfoEXT>,
) -> InstanceCreateInfoBuilder<'a> {
    let instance_create_info = InstanceCreateInfo::builder()
        .application_info(app_info)
        .enabled_extension_names(extension_names)
        .enabled_layer_names(layer_names);
    match debug_messenger_create_info {
        Some(debug_messenger_create_info) => {
            instance_create_info.push_next(debug_messenger_create_info)
        }
        None => instance_create_info,
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        unsafe { self.instance.destroy_instance(None) };
        trace!("Instance destroyed");
    }
}

impl Deref for Instance {
    type Target = ash::Instance;

    fn deref(&self) -> &Self::Target {
        &self.instance
    }
}
