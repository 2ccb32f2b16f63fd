use std::ffi::{c_char, CStr, CString};

use ash::{extensions::ext::DebugUtils, Entry};
use tracing::debug;

use crate::error::{BootstrapError, CapabilityKind, Result};

/// Instance-level capabilities the driver advertises, in driver order.
pub trait CapabilityCatalog {
    fn instance_extensions(&self) -> Result<Vec<String>>;
    fn instance_layers(&self) -> Result<Vec<String>>;
}

impl CapabilityCatalog for Entry {
    fn instance_extensions(&self) -> Result<Vec<String>> {
        let properties = unsafe { self.enumerate_instance_extension_properties(None) }.map_err(
            |result| BootstrapError::DriverQueryFailed {
                query: "vkEnumerateInstanceExtensionProperties",
                result,
            },
        )?;
        Ok(properties
            .iter()
            .map(|extension| name_from_raw(&extension.extension_name))
            .collect())
    }

    fn instance_layers(&self) -> Result<Vec<String>> {
        let properties = unsafe { self.enumerate_instance_layer_properties() }.map_err(
            |result| BootstrapError::DriverQueryFailed {
                query: "vkEnumerateInstanceLayerProperties",
                result,
            },
        )?;
        Ok(properties
            .iter()
            .map(|layer| name_from_raw(&layer.layer_name))
            .collect())
    }
}

fn name_from_raw(raw: &[c_char]) -> String {
    unsafe { CStr::from_ptr(raw.as_ptr()) }
        .to_string_lossy()
        .into_owned()
}

/// Extension and layer names that were checked against the driver catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiatedCapabilities {
    pub extensions: Vec<String>,
    pub layers: Vec<String>,
}

impl NegotiatedCapabilities {
    pub fn extension_names(&self) -> Result<Vec<CString>> {
        to_cstrings(&self.extensions)
    }

    pub fn layer_names(&self) -> Result<Vec<CString>> {
        to_cstrings(&self.layers)
    }
}

fn to_cstrings(names: &[String]) -> Result<Vec<CString>> {
    names.iter().map(|name| to_cstring(name)).collect()
}

pub(crate) fn to_cstring(name: &str) -> Result<CString> {
    CString::new(name).map_err(|_| BootstrapError::InvalidName(name.to_owned()))
}

/// Returns the instance extensions to request: whatever the window system needs, plus
/// debug utils when validations are enabled. A window system that cannot name its
/// extensions has no way to present, so that is an error rather than an empty list.
pub fn required_extensions(
    window_extensions: Option<Vec<String>>,
    enable_validations: bool,
) -> Result<Vec<String>> {
    let mut extensions =
        window_extensions.ok_or(BootstrapError::PresentationExtensionsUnavailable)?;
    if enable_validations {
        extensions.push(DebugUtils::name().to_string_lossy().into_owned());
    }
    debug!("Instance extensions to enable: {:?}", extensions);
    Ok(extensions)
}

/// Checks every requested extension and layer against what the driver offers. Nothing is
/// dropped: the first missing name fails the whole negotiation, extensions before layers.
pub fn negotiate(
    catalog: &impl CapabilityCatalog,
    extensions: Vec<String>,
    layers: Vec<String>,
) -> Result<NegotiatedCapabilities> {
    let available_extensions = catalog.instance_extensions()?;
    if cfg!(debug_assertions) {
        debug!("Available extensions:");
        for extension in &available_extensions {
            debug!("\t{}", extension);
        }
    }
    ensure_supported(CapabilityKind::Extension, &extensions, &available_extensions)?;

    if !layers.is_empty() {
        let available_layers = catalog.instance_layers()?;
        ensure_supported(CapabilityKind::Layer, &layers, &available_layers)?;
    }
    debug!("Layers to enable: {}", layers.join(", "));

    Ok(NegotiatedCapabilities { extensions, layers })
}

fn ensure_supported(kind: CapabilityKind, requested: &[String], available: &[String]) -> Result<()> {
    match requested
        .iter()
        .find(|name| !available.iter().any(|candidate| candidate == *name))
    {
        Some(missing) => Err(BootstrapError::CapabilityUnavailable {
            kind,
            name: missing.clone(),
        }),
        None => Ok(()),
    }
}
