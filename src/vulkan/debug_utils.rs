use std::{borrow::Cow, ffi::CStr, mem, ptr, rc::Rc};

use ash::vk::{
    self, Bool32, DebugUtilsMessageSeverityFlagsEXT, DebugUtilsMessageTypeFlagsEXT,
    DebugUtilsMessengerCallbackDataEXT, DebugUtilsMessengerCreateInfoEXT, DebugUtilsMessengerEXT,
};
use tracing::{debug, error, info, trace, warn};

use crate::error::{BootstrapError, Result};

use super::instance::Instance;

const CREATE_MESSENGER: &CStr = c"vkCreateDebugUtilsMessengerEXT";
const DESTROY_MESSENGER: &CStr = c"vkDestroyDebugUtilsMessengerEXT";

/// Describes which debug messages we want and where they go. Chained into instance
/// creation as well, so problems during `vkCreateInstance` get reported too.
pub fn debug_messenger_create_info() -> DebugUtilsMessengerCreateInfoEXT {
    DebugUtilsMessengerCreateInfoEXT::builder()
        .message_severity(
            DebugUtilsMessageSeverityFlagsEXT::VERBOSE
                | DebugUtilsMessageSeverityFlagsEXT::WARNING
                | DebugUtilsMessageSeverityFlagsEXT::ERROR,
        )
        .message_type(
            DebugUtilsMessageTypeFlagsEXT::GENERAL
                | DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(vulkan_debug_utils_callback))
        .build()
}

/// Destination of a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticStream {
    Error,
    Info,
}

/// Picks the stream for a message of the given severity. Release builds drop anything
/// below INFO.
pub fn route_message(
    severity: DebugUtilsMessageSeverityFlagsEXT,
    release: bool,
) -> Option<DiagnosticStream> {
    let severity = severity.as_raw();
    if release && severity < DebugUtilsMessageSeverityFlagsEXT::INFO.as_raw() {
        return None;
    }
    if severity >= DebugUtilsMessageSeverityFlagsEXT::WARNING.as_raw() {
        Some(DiagnosticStream::Error)
    } else {
        Some(DiagnosticStream::Info)
    }
}

pub unsafe extern "system" fn vulkan_debug_utils_callback(
    message_severity: DebugUtilsMessageSeverityFlagsEXT,
    message_type: DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const DebugUtilsMessengerCallbackDataEXT,
    _p_user_data: *mut std::ffi::c_void,
) -> Bool32 {
    let Some(stream) = route_message(message_severity, !cfg!(debug_assertions)) else {
        return vk::FALSE;
    };

    let message = if p_callback_data.is_null() || (*p_callback_data).p_message.is_null() {
        Cow::Borrowed("")
    } else {
        CStr::from_ptr((*p_callback_data).p_message).to_string_lossy()
    };
    let ty = format!("{:?}", message_type).to_lowercase();

    match stream {
        DiagnosticStream::Error => {
            if message_severity.contains(DebugUtilsMessageSeverityFlagsEXT::ERROR) {
                error!(ty = ty, "Validation Layer: {}", message)
            } else {
                warn!(ty = ty, "Validation Layer: {}", message)
            }
        }
        DiagnosticStream::Info => {
            if message_severity.contains(DebugUtilsMessageSeverityFlagsEXT::INFO) {
                info!(ty = ty, "Validation Layer: {}", message)
            } else {
                trace!(ty = ty, "Validation Layer: {}", message)
            }
        }
    }
    // dont skip driver
    vk::FALSE
}

/// Looks up instance-level entry points that are not part of the core API.
pub trait EntryPointResolver {
    fn resolve(&self, name: &CStr) -> vk::PFN_vkVoidFunction;
}

struct InstanceProcResolver<'a> {
    instance: &'a Instance,
}

impl EntryPointResolver for InstanceProcResolver<'_> {
    fn resolve(&self, name: &CStr) -> vk::PFN_vkVoidFunction {
        unsafe {
            self.instance
                .get_entry()
                .get_instance_proc_addr(self.instance.handle(), name.as_ptr())
        }
    }
}

/// The two debug utils entry points, resolved at runtime since the extension may be absent.
struct DebugUtilsFns {
    create: vk::PFN_vkCreateDebugUtilsMessengerEXT,
    destroy: vk::PFN_vkDestroyDebugUtilsMessengerEXT,
}

impl DebugUtilsFns {
    fn load(resolver: &impl EntryPointResolver) -> Result<Self> {
        let create = lookup(resolver, CREATE_MESSENGER)?;
        let destroy = lookup(resolver, DESTROY_MESSENGER)?;
        unsafe {
            Ok(Self {
                create: mem::transmute::<_, vk::PFN_vkCreateDebugUtilsMessengerEXT>(create),
                destroy: mem::transmute::<_, vk::PFN_vkDestroyDebugUtilsMessengerEXT>(destroy),
            })
        }
    }
}

fn lookup(
    resolver: &impl EntryPointResolver,
    name: &CStr,
) -> Result<unsafe extern "system" fn()> {
    resolver
        .resolve(name)
        .ok_or_else(|| BootstrapError::ExtensionNotPresent {
            entry_point: name.to_string_lossy().into_owned(),
        })
}

fn register(
    instance: vk::Instance,
    resolver: &impl EntryPointResolver,
) -> Result<(DebugUtilsFns, DebugUtilsMessengerEXT)> {
    let fns = DebugUtilsFns::load(resolver)?;
    let create_info = debug_messenger_create_info();
    let mut messenger = DebugUtilsMessengerEXT::null();
    unsafe { (fns.create)(instance, &create_info, ptr::null(), &mut messenger) }
        .result()
        .map_err(BootstrapError::DiagnosticsRegistrationFailed)?;
    Ok((fns, messenger))
}

/// Registers the messenger only when validations are on. Otherwise the debug utils entry
/// points are never looked up.
fn register_when_enabled(
    enabled: bool,
    instance: vk::Instance,
    resolver: &impl EntryPointResolver,
) -> Result<Option<(DebugUtilsFns, DebugUtilsMessengerEXT)>> {
    if !enabled {
        return Ok(None);
    }
    register(instance, resolver).map(Some)
}

/// Registered debug messenger. Keeps the instance alive until the messenger is gone.
pub struct DebugMessenger {
    fns: DebugUtilsFns,
    messenger: DebugUtilsMessengerEXT,
    instance: Rc<Instance>,
}

impl DebugMessenger {
    /// Attaches the messenger to `instance` if `enabled`.
    pub fn attach(instance: &Rc<Instance>, enabled: bool) -> Result<Option<Self>> {
        let resolver = InstanceProcResolver { instance };
        let Some((fns, messenger)) =
            register_when_enabled(enabled, instance.handle(), &resolver)?
        else {
            debug!("Validations disabled, no debug messenger");
            return Ok(None);
        };
        debug!("Debug messenger registered");
        Ok(Some(Self {
            fns,
            messenger,
            instance: Rc::clone(instance),
        }))
    }
}

impl Drop for DebugMessenger {
    fn drop(&mut self) {
        unsafe { (self.fns.destroy)(self.instance.handle(), self.messenger, ptr::null()) };
        trace!("Debug messenger destroyed");
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, ffi::CString};

    use ash::vk::Handle;

    use super::*;

    unsafe extern "system" fn create_ok(
        _instance: vk::Instance,
        _create_info: *const DebugUtilsMessengerCreateInfoEXT,
        _allocator: *const vk::AllocationCallbacks,
        messenger: *mut DebugUtilsMessengerEXT,
    ) -> vk::Result {
        *messenger = DebugUtilsMessengerEXT::from_raw(42);
        vk::Result::SUCCESS
    }

    unsafe extern "system" fn create_rejected(
        _instance: vk::Instance,
        _create_info: *const DebugUtilsMessengerCreateInfoEXT,
        _allocator: *const vk::AllocationCallbacks,
        _messenger: *mut DebugUtilsMessengerEXT,
    ) -> vk::Result {
        vk::Result::ERROR_OUT_OF_HOST_MEMORY
    }

    unsafe extern "system" fn destroy_noop(
        _instance: vk::Instance,
        _messenger: DebugUtilsMessengerEXT,
        _allocator: *const vk::AllocationCallbacks,
    ) {
    }

    #[derive(Default)]
    struct FakeResolver {
        create: vk::PFN_vkVoidFunction,
        destroy: vk::PFN_vkVoidFunction,
        requested: RefCell<Vec<String>>,
    }

    impl FakeResolver {
        fn with(
            create: vk::PFN_vkCreateDebugUtilsMessengerEXT,
            destroy: vk::PFN_vkDestroyDebugUtilsMessengerEXT,
        ) -> Self {
            unsafe {
                Self {
                    create: Some(mem::transmute::<_, unsafe extern "system" fn()>(create)),
                    destroy: Some(mem::transmute::<_, unsafe extern "system" fn()>(destroy)),
                    requested: RefCell::default(),
                }
            }
        }
    }

    impl EntryPointResolver for FakeResolver {
        fn resolve(&self, name: &CStr) -> vk::PFN_vkVoidFunction {
            self.requested
                .borrow_mut()
                .push(name.to_string_lossy().into_owned());
            if name == CREATE_MESSENGER {
                self.create
            } else if name == DESTROY_MESSENGER {
                self.destroy
            } else {
                None
            }
        }
    }

    #[test]
    fn missing_entry_point_is_reported_not_called() {
        let resolver = FakeResolver::default();
        let err = register(vk::Instance::null(), &resolver)
            .err()
            .expect("registration must fail");
        match err {
            BootstrapError::ExtensionNotPresent { entry_point } => {
                assert_eq!(entry_point, "vkCreateDebugUtilsMessengerEXT")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_destroy_entry_point_fails_before_creating() {
        let mut resolver = FakeResolver::with(create_ok, destroy_noop);
        resolver.destroy = None;
        let err = register(vk::Instance::null(), &resolver)
            .err()
            .expect("registration must fail");
        assert!(matches!(err, BootstrapError::ExtensionNotPresent { .. }));
    }

    #[test]
    fn registration_returns_driver_messenger() {
        let resolver = FakeResolver::with(create_ok, destroy_noop);
        let (_fns, messenger) = register(vk::Instance::null(), &resolver).unwrap();
        assert_eq!(messenger.as_raw(), 42);
        assert_eq!(
            *resolver.requested.borrow(),
            vec![
                "vkCreateDebugUtilsMessengerEXT".to_owned(),
                "vkDestroyDebugUtilsMessengerEXT".to_owned()
            ]
        );
    }

    #[test]
    fn disabled_validations_never_look_up_entry_points() {
        let resolver = FakeResolver::with(create_ok, destroy_noop);
        let registered = register_when_enabled(false, vk::Instance::null(), &resolver).unwrap();
        assert!(registered.is_none());
        assert!(resolver.requested.borrow().is_empty());

        let (_fns, messenger) = register_when_enabled(true, vk::Instance::null(), &resolver)
            .unwrap()
            .expect("messenger must be registered");
        assert_eq!(messenger.as_raw(), 42);
        assert_eq!(resolver.requested.borrow().len(), 2);
    }

    #[test]
    fn rejected_registration_carries_driver_status() {
        let resolver = FakeResolver::with(create_rejected, destroy_noop);
        let err = register(vk::Instance::null(), &resolver)
            .err()
            .expect("registration must fail");
        assert!(matches!(
            err,
            BootstrapError::DiagnosticsRegistrationFailed(vk::Result::ERROR_OUT_OF_HOST_MEMORY)
        ));
    }

    #[test]
    fn create_info_excludes_info_severity() {
        let create_info = debug_messenger_create_info();
        assert!(!create_info
            .message_severity
            .contains(DebugUtilsMessageSeverityFlagsEXT::INFO));
        assert!(create_info.message_severity.contains(
            DebugUtilsMessageSeverityFlagsEXT::VERBOSE
                | DebugUtilsMessageSeverityFlagsEXT::WARNING
                | DebugUtilsMessageSeverityFlagsEXT::ERROR
        ));
        assert_eq!(
            create_info.message_type,
            DebugUtilsMessageTypeFlagsEXT::GENERAL
                | DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | DebugUtilsMessageTypeFlagsEXT::PERFORMANCE
        );
        assert!(create_info.pfn_user_callback.is_some());
        assert!(create_info.p_user_data.is_null());
    }

    #[test]
    fn warnings_and_errors_go_to_error_stream() {
        for release in [false, true] {
            assert_eq!(
                route_message(DebugUtilsMessageSeverityFlagsEXT::WARNING, release),
                Some(DiagnosticStream::Error)
            );
            assert_eq!(
                route_message(DebugUtilsMessageSeverityFlagsEXT::ERROR, release),
                Some(DiagnosticStream::Error)
            );
            assert_eq!(
                route_message(DebugUtilsMessageSeverityFlagsEXT::INFO, release),
                Some(DiagnosticStream::Info)
            );
        }
    }

    #[test]
    fn verbose_is_suppressed_in_release_only() {
        assert_eq!(
            route_message(DebugUtilsMessageSeverityFlagsEXT::VERBOSE, false),
            Some(DiagnosticStream::Info)
        );
        assert_eq!(
            route_message(DebugUtilsMessageSeverityFlagsEXT::VERBOSE, true),
            None
        );
    }

    #[test]
    fn callback_never_aborts_the_call() {
        let message = CString::new("vkCreateDevice: something happened").unwrap();
        let callback_data = DebugUtilsMessengerCallbackDataEXT {
            p_message: message.as_ptr(),
            ..Default::default()
        };
        for severity in [
            DebugUtilsMessageSeverityFlagsEXT::VERBOSE,
            DebugUtilsMessageSeverityFlagsEXT::INFO,
            DebugUtilsMessageSeverityFlagsEXT::WARNING,
            DebugUtilsMessageSeverityFlagsEXT::ERROR,
        ] {
            let result = unsafe {
                vulkan_debug_utils_callback(
                    severity,
                    DebugUtilsMessageTypeFlagsEXT::VALIDATION,
                    &callback_data,
                    ptr::null_mut(),
                )
            };
            assert_eq!(result, vk::FALSE);
        }
    }

    #[test]
    fn callback_tolerates_missing_message() {
        let result = unsafe {
            vulkan_debug_utils_callback(
                DebugUtilsMessageSeverityFlagsEXT::ERROR,
                DebugUtilsMessageTypeFlagsEXT::GENERAL,
                ptr::null(),
                ptr::null_mut(),
            )
        };
        assert_eq!(result, vk::FALSE);
    }
}
