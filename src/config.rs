use ash::vk::{make_api_version, API_VERSION_1_0};

use crate::vulkan::{discrete_with_geometry_shader, SuitabilityPredicate};

#[cfg(feature = "enable_validations")]
pub const ENABLE_VALIDATIONS: bool = true;
#[cfg(not(feature = "enable_validations"))]
pub const ENABLE_VALIDATIONS: bool = false;

pub const VALIDATION_LAYERS: &[&str] = &["VK_LAYER_KHRONOS_validation"];

pub const WINDOW_WIDTH: u32 = 800;
pub const WINDOW_HEIGHT: u32 = 600;
pub const APP_NAME: &str = "Vulkan Tutorial";
pub const ENGINE_NAME: &str = "No Engine";

/// Everything the bootstrap can be tuned with. The defaults are fixed at compile time.
#[derive(Clone)]
pub struct Config {
    pub app_name: String,
    pub app_version: u32,
    pub engine_name: String,
    pub engine_version: u32,
    pub api_version: u32,
    pub window_width: u32,
    pub window_height: u32,
    /// Request validation layers and install the debug messenger
    pub enable_validations: bool,
    /// Also pass the validation layers at device creation. Only older loaders
    /// look at device layers, newer ones ignore them.
    pub device_layers: bool,
    /// Gate a physical device must pass to be picked
    pub suitability: SuitabilityPredicate,
}

impl Config {
    /// Layers to request, empty when validations are off.
    pub fn validation_layers(&self) -> Vec<String> {
        if self.enable_validations {
            VALIDATION_LAYERS.iter().map(|layer| (*layer).to_owned()).collect()
        } else {
            vec![]
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_owned(),
            app_version: make_api_version(0, 0, 0, 1),
            engine_name: ENGINE_NAME.to_owned(),
            engine_version: make_api_version(0, 0, 0, 1),
            api_version: API_VERSION_1_0,
            window_width: WINDOW_WIDTH,
            window_height: WINDOW_HEIGHT,
            enable_validations: ENABLE_VALIDATIONS,
            device_layers: true,
            suitability: discrete_with_geometry_shader,
        }
    }
}
