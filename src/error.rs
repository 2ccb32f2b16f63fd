use std::fmt;

use ash::vk;
use thiserror::Error;

/// Which driver catalog a requested name was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityKind {
    Extension,
    Layer,
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityKind::Extension => write!(f, "extension"),
            CapabilityKind::Layer => write!(f, "validation layer"),
        }
    }
}

/// Logical role a queue family is resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueRole {
    Graphics,
    Presentation,
}

impl fmt::Display for QueueRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueRole::Graphics => write!(f, "graphics"),
            QueueRole::Presentation => write!(f, "presentation"),
        }
    }
}

/// Errors that abort the Vulkan bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The window system could not say which instance extensions presentation needs.
    #[error("Window system cannot report the Vulkan instance extensions it requires")]
    PresentationExtensionsUnavailable,
    /// A requested instance extension or layer is not offered by the driver.
    #[error("Vulkan {kind} not supported: {name}")]
    CapabilityUnavailable { kind: CapabilityKind, name: String },
    /// An optional entry point could not be resolved through the instance.
    #[error("Vulkan entry point not present: {entry_point}")]
    ExtensionNotPresent { entry_point: String },
    #[error("Failed to set up debug messenger: {0}")]
    DiagnosticsRegistrationFailed(#[source] vk::Result),
    #[error("Failed to create Vulkan instance: {0}")]
    InstanceCreationFailed(#[source] vk::Result),
    #[error("Unable to create window surface: {0}")]
    SurfaceCreationFailed(#[source] vk::Result),
    #[error("Failed to find GPU with Vulkan support!")]
    NoCompatibleDevice,
    #[error("Failed to find a suitable GPU ({inspected} inspected)")]
    NoSuitableDevice { inspected: usize },
    #[error("Selected device does not support all required queue families, missing: {}", join_roles(.missing))]
    IncompleteQueueFamilies { missing: Vec<QueueRole> },
    #[error("Unable to create Vulkan logical device: {0}")]
    DeviceCreationFailed(#[source] vk::Result),
    /// A name handed to the driver cannot be represented as a C string.
    #[error("Name contains an interior nul byte: {0:?}")]
    InvalidName(String),
    /// A capability query against the driver returned an error status.
    #[error("Vulkan query {query} failed: {result}")]
    DriverQueryFailed {
        query: &'static str,
        #[source]
        result: vk::Result,
    },
}

fn join_roles(roles: &[QueueRole]) -> String {
    roles
        .iter()
        .map(|role| role.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T, E = BootstrapError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_error_names_the_missing_entry() {
        let err = BootstrapError::CapabilityUnavailable {
            kind: CapabilityKind::Layer,
            name: "VK_LAYER_KHRONOS_validation".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "Vulkan validation layer not supported: VK_LAYER_KHRONOS_validation"
        );
    }

    #[test]
    fn incomplete_queue_families_lists_every_missing_role() {
        let err = BootstrapError::IncompleteQueueFamilies {
            missing: vec![QueueRole::Graphics, QueueRole::Presentation],
        };
        assert!(err.to_string().ends_with("missing: graphics, presentation"));
    }
}
