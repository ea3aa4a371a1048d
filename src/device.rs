use ash::{prelude::VkResult, vk};

/// The device operations render passes and framebuffers need.
///
/// [`crate::Context`] implements this on top of a real [`ash::Device`]. Anything else that can
/// realize a `VkRenderPassCreateInfo2` can stand in for it.
pub trait RenderPassDevice {
    fn create_render_pass(
        &self,
        create_info: &vk::RenderPassCreateInfo2<'_>,
    ) -> VkResult<vk::RenderPass>;

    fn create_framebuffer(
        &self,
        create_info: &vk::FramebufferCreateInfo<'_>,
    ) -> VkResult<vk::Framebuffer>;

    /// Attach a debug label to `handle`. Best effort: failures are not reported.
    fn set_object_name<H: vk::Handle>(&self, handle: H, name: &str);

    /// ## Safety
    /// - `render_pass` must have been created by this device and must no longer be in use.
    unsafe fn destroy_render_pass(&self, render_pass: vk::RenderPass);

    /// ## Safety
    /// - `framebuffer` must have been created by this device and must no longer be in use.
    unsafe fn destroy_framebuffer(&self, framebuffer: vk::Framebuffer);
}
