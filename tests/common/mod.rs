use std::cell::{Cell, RefCell};

use lazy_renderpass::{
    ash::{prelude::VkResult, vk},
    RenderPassDevice,
};

/// What the device saw when asked to create a render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRenderPass {
    pub formats: Vec<vk::Format>,
    pub final_layouts: Vec<vk::ImageLayout>,
    pub subpass_count: u32,
    pub dependencies: Vec<(u32, u32)>,
}

/// A device that hands out fake handles and remembers every call.
#[derive(Default)]
pub struct MockDevice {
    next_handle: Cell<u64>,
    pub fail_with: Cell<Option<vk::Result>>,
    pub render_passes: RefCell<Vec<RecordedRenderPass>>,
    pub framebuffers: RefCell<Vec<(vk::RenderPass, Vec<vk::ImageView>, u32, u32)>>,
    pub names: RefCell<Vec<(vk::ObjectType, u64, String)>>,
    pub destroyed_render_passes: RefCell<Vec<vk::RenderPass>>,
    pub destroyed_framebuffers: RefCell<Vec<vk::Framebuffer>>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(result: vk::Result) -> Self {
        let device = Self::default();
        device.fail_with.set(Some(result));
        device
    }

    pub fn name_of(&self, raw: u64) -> Option<String> {
        self.names
            .borrow()
            .iter()
            .find(|(_, handle, _)| *handle == raw)
            .map(|(_, _, name)| name.clone())
    }

    fn next_raw(&self) -> u64 {
        let raw = self.next_handle.get() + 1;
        self.next_handle.set(raw);
        raw
    }
}

unsafe fn slice<'a, T>(data: *const T, len: u32) -> &'a [T] {
    if len == 0 {
        &[]
    } else {
        std::slice::from_raw_parts(data, len as usize)
    }
}

impl RenderPassDevice for MockDevice {
    fn create_render_pass(
        &self,
        create_info: &vk::RenderPassCreateInfo2<'_>,
    ) -> VkResult<vk::RenderPass> {
        if let Some(error) = self.fail_with.get() {
            return Err(error);
        }

        let attachments =
            unsafe { slice(create_info.p_attachments, create_info.attachment_count) };
        let dependencies =
            unsafe { slice(create_info.p_dependencies, create_info.dependency_count) };

        self.render_passes.borrow_mut().push(RecordedRenderPass {
            formats: attachments.iter().map(|a| a.format).collect(),
            final_layouts: attachments.iter().map(|a| a.final_layout).collect(),
            subpass_count: create_info.subpass_count,
            dependencies: dependencies
                .iter()
                .map(|d| (d.src_subpass, d.dst_subpass))
                .collect(),
        });

        Ok(vk::Handle::from_raw(self.next_raw()))
    }

    fn create_framebuffer(
        &self,
        create_info: &vk::FramebufferCreateInfo<'_>,
    ) -> VkResult<vk::Framebuffer> {
        if let Some(error) = self.fail_with.get() {
            return Err(error);
        }

        let views = unsafe { slice(create_info.p_attachments, create_info.attachment_count) };
        self.framebuffers.borrow_mut().push((
            create_info.render_pass,
            views.to_vec(),
            create_info.width,
            create_info.height,
        ));

        Ok(vk::Handle::from_raw(self.next_raw()))
    }

    fn set_object_name<H: vk::Handle>(&self, handle: H, name: &str) {
        self.names
            .borrow_mut()
            .push((H::TYPE, handle.as_raw(), name.to_string()));
    }

    unsafe fn destroy_render_pass(&self, render_pass: vk::RenderPass) {
        self.destroyed_render_passes.borrow_mut().push(render_pass);
    }

    unsafe fn destroy_framebuffer(&self, framebuffer: vk::Framebuffer) {
        self.destroyed_framebuffers.borrow_mut().push(framebuffer);
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
