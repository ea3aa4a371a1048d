use std::ffi::{c_char, CStr, CString};

use ash::vk;

use crate::{
    config::ContextConfig,
    error::{Error, Result},
};

const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

// Portability drivers top out at 1.2; `synchronization2` comes from the KHR extension there.
#[cfg(any(target_os = "macos", target_os = "ios"))]
pub(crate) const API_VERSION: u32 = vk::API_VERSION_1_2;
#[cfg(not(any(target_os = "macos", target_os = "ios")))]
pub(crate) const API_VERSION: u32 = vk::API_VERSION_1_3;

/// Instance-level Vulkan state: the loader, the instance and the chosen physical device.
pub struct Core {
    pub entry: ash::Entry,
    pub instance: ash::Instance,
    pub physical_device: vk::PhysicalDevice,
    pub queue_family_index: u32,
}

impl Core {
    /// Creates a headless instance (no surface extensions) and picks the first physical device
    /// with a graphics queue.
    pub fn new(config: &ContextConfig) -> Result<Self> {
        let entry = unsafe { ash::Entry::load() }?;

        let mut instance_extensions: Vec<*const c_char> = Vec::new();
        if config.debug_utils {
            instance_extensions.push(ash::ext::debug_utils::NAME.as_ptr());
        }

        let layers: Vec<*const c_char> = if config.validation {
            vec![VALIDATION_LAYER.as_ptr()]
        } else {
            Vec::new()
        };

        let instance_create_flags;

        #[cfg(any(target_os = "macos", target_os = "ios"))]
        {
            instance_extensions.push(ash::khr::portability_enumeration::NAME.as_ptr());
            instance_extensions.push(ash::khr::get_physical_device_properties2::NAME.as_ptr());
            instance_create_flags = vk::InstanceCreateFlags::ENUMERATE_PORTABILITY_KHR;
        }

        #[cfg(not(any(target_os = "macos", target_os = "ios")))]
        {
            instance_create_flags = vk::InstanceCreateFlags::default();
        }

        let application_name = CString::new(config.application_name.as_str()).unwrap_or_default();

        let instance = unsafe {
            entry.create_instance(
                &vk::InstanceCreateInfo::default()
                    .flags(instance_create_flags)
                    .enabled_extension_names(&instance_extensions)
                    .enabled_layer_names(&layers)
                    .application_info(
                        &vk::ApplicationInfo::default()
                            .application_name(&application_name)
                            .engine_name(c"Lazy Renderpass")
                            .api_version(API_VERSION),
                    ),
                None,
            )
        }?;

        let (physical_device, queue_family_index) = match find_graphics_device(&instance) {
            Ok(Some(found)) => found,
            Ok(None) => {
                unsafe { instance.destroy_instance(None) };
                return Err(Error::NoSuitableDevice);
            }
            Err(error) => {
                unsafe { instance.destroy_instance(None) };
                return Err(error.into());
            }
        };

        Ok(Self {
            entry,
            instance,
            physical_device,
            queue_family_index,
        })
    }

    /// ## Safety
    /// - Every [`crate::Context`] created from this core must already be destroyed.
    pub unsafe fn destroy(&self) {
        self.instance.destroy_instance(None);
    }
}

fn find_graphics_device(
    instance: &ash::Instance,
) -> ash::prelude::VkResult<Option<(vk::PhysicalDevice, u32)>> {
    let physical_devices = unsafe { instance.enumerate_physical_devices() }?;

    let found = physical_devices.into_iter().find_map(|physical_device| {
        let properties = unsafe { instance.get_physical_device_properties(physical_device) };
        if properties.api_version < API_VERSION {
            return None;
        }

        unsafe { instance.get_physical_device_queue_family_properties(physical_device) }
            .iter()
            .position(|family| family.queue_flags.contains(vk::QueueFlags::GRAPHICS))
            .map(|index| (physical_device, index as u32))
    });

    if let Some((physical_device, queue_family_index)) = found {
        let properties = unsafe { instance.get_physical_device_properties(physical_device) };
        let name = properties
            .device_name_as_c_str()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        log::info!("Using device {name} (queue family {queue_family_index})");
    }

    Ok(found)
}
