use std::ffi::{c_char, CString};

use ash::{prelude::VkResult, vk};

use crate::{config::ContextConfig, core::Core, device::RenderPassDevice, error::Result};

/// Device-level Vulkan state render passes are created and recorded with.
pub struct Context {
    pub device: ash::Device,
    /// Present when `VK_EXT_debug_utils` was enabled; used to label objects.
    pub debug_utils: Option<ash::ext::debug_utils::Device>,
    pub command_pool: vk::CommandPool,
    pub draw_command_buffer: vk::CommandBuffer,
    pub graphics_queue: vk::Queue,
}

impl Context {
    pub fn new(core: &Core, config: &ContextConfig) -> Result<Self> {
        let instance = &core.instance;
        let queue_family_index = core.queue_family_index;

        #[allow(unused_mut)]
        let mut enabled_extension_names: Vec<*const c_char> = vec![];

        #[cfg(any(target_os = "macos", target_os = "ios"))]
        {
            enabled_extension_names.push(ash::khr::portability_subset::NAME.as_ptr());
            enabled_extension_names.push(ash::khr::synchronization2::NAME.as_ptr());
        }

        let mut synchronization2 = synchronization2_features();

        let device = unsafe {
            instance.create_device(
                core.physical_device,
                &vk::DeviceCreateInfo::default()
                    .enabled_extension_names(&enabled_extension_names)
                    .queue_create_infos(&[vk::DeviceQueueCreateInfo::default()
                        .queue_family_index(queue_family_index)
                        .queue_priorities(&[1.0])])
                    .push_next(&mut synchronization2),
                None,
            )
        }?;

        let command_pool = match unsafe {
            device.create_command_pool(
                &vk::CommandPoolCreateInfo::default()
                    .queue_family_index(queue_family_index)
                    .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER),
                None,
            )
        } {
            Ok(command_pool) => command_pool,
            Err(error) => {
                unsafe { device.destroy_device(None) };
                return Err(error.into());
            }
        };

        let draw_command_buffer = match unsafe {
            device.allocate_command_buffers(
                &vk::CommandBufferAllocateInfo::default()
                    .command_pool(command_pool)
                    .command_buffer_count(1),
            )
        } {
            Ok(command_buffers) => command_buffers[0],
            Err(error) => {
                unsafe {
                    device.destroy_command_pool(command_pool, None);
                    device.destroy_device(None);
                }
                return Err(error.into());
            }
        };

        let graphics_queue = unsafe { device.get_device_queue(queue_family_index, 0) };

        let debug_utils = config
            .debug_utils
            .then(|| ash::ext::debug_utils::Device::new(instance, &device));

        Ok(Self {
            device,
            debug_utils,
            command_pool,
            draw_command_buffer,
            graphics_queue,
        })
    }

    /// ## Safety
    /// - Every render pass and framebuffer created with this context must already be destroyed.
    pub unsafe fn destroy(&self) -> Result<()> {
        self.device.device_wait_idle()?;
        self.device.destroy_command_pool(self.command_pool, None);
        self.device.destroy_device(None);
        Ok(())
    }
}

/// Device features every [`Context`] enables.
///
/// Subpass dependencies whose producer only read an input attachment carry an empty source
/// stage mask, which is only valid with `synchronization2`.
pub(crate) fn synchronization2_features() -> vk::PhysicalDeviceSynchronization2Features<'static> {
    vk::PhysicalDeviceSynchronization2Features::default().synchronization2(true)
}

impl RenderPassDevice for Context {
    fn create_render_pass(
        &self,
        create_info: &vk::RenderPassCreateInfo2<'_>,
    ) -> VkResult<vk::RenderPass> {
        unsafe { self.device.create_render_pass2(create_info, None) }
    }

    fn create_framebuffer(
        &self,
        create_info: &vk::FramebufferCreateInfo<'_>,
    ) -> VkResult<vk::Framebuffer> {
        unsafe { self.device.create_framebuffer(create_info, None) }
    }

    fn set_object_name<H: vk::Handle>(&self, handle: H, name: &str) {
        let Some(debug_utils) = &self.debug_utils else {
            return;
        };

        let Ok(object_name) = CString::new(name) else {
            log::warn!("Not naming {:?}: `{name}` contains a NUL byte", H::TYPE);
            return;
        };

        let result = unsafe {
            debug_utils.set_debug_utils_object_name(
                &vk::DebugUtilsObjectNameInfoEXT::default()
                    .object_handle(handle)
                    .object_name(&object_name),
            )
        };
        if let Err(error) = result {
            log::warn!("Failed to name {:?} `{name}`: {error}", H::TYPE);
        }
    }

    unsafe fn destroy_render_pass(&self, render_pass: vk::RenderPass) {
        self.device.destroy_render_pass(render_pass, None);
    }

    unsafe fn destroy_framebuffer(&self, framebuffer: vk::Framebuffer) {
        self.device.destroy_framebuffer(framebuffer, None);
    }
}
