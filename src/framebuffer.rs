use ash::vk;

use crate::{
    device::RenderPassDevice,
    error::{Error, Result},
    render_pass::{RenderPass, RenderPassDescription},
};

/// An image view offered for one of a render pass's named attachments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramebufferAttachment<'a> {
    pub name: &'a str,
    pub view: vk::ImageView,
    pub extent: vk::Extent2D,
}

impl<'a> FramebufferAttachment<'a> {
    pub fn new(name: &'a str, view: vk::ImageView, extent: vk::Extent2D) -> Self {
        Self { name, view, extent }
    }
}

/// Image views bound to a render pass's attachment slots.
///
/// Only copies the render pass handle; the render pass must outlive the framebuffer.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    pub name: String,
    pub handle: vk::Framebuffer,
    pub extent: vk::Extent2D,
    pub render_pass: vk::RenderPass,
    /// Structural hash of the render pass this framebuffer is compatible with.
    pub render_pass_hash: u64,
}

impl Framebuffer {
    pub fn new<D: RenderPassDevice>(
        device: &D,
        name: impl Into<String>,
        render_pass: &RenderPass,
        attachments: &[FramebufferAttachment<'_>],
    ) -> Result<Self> {
        let name = name.into();
        let (views, extent) = bind_views(&name, render_pass.description(), attachments)?;

        let handle = device
            .create_framebuffer(
                &vk::FramebufferCreateInfo::default()
                    .render_pass(render_pass.handle())
                    .attachments(&views)
                    .width(extent.width)
                    .height(extent.height)
                    .layers(1),
            )
            .map_err(|source| Error::FramebufferCreationFailed {
                framebuffer: name.clone(),
                source,
            })?;
        device.set_object_name(handle, &name);

        Ok(Self {
            name,
            handle,
            extent,
            render_pass: render_pass.handle(),
            render_pass_hash: render_pass.structural_hash(),
        })
    }

    /// Whether this framebuffer was built for a render pass of the same shape as `render_pass`.
    /// Stricter than Vulkan's compatibility rules, which ignore load/store ops.
    pub fn is_compatible_with(&self, render_pass: &RenderPass) -> bool {
        self.render_pass_hash == render_pass.structural_hash()
    }

    pub fn ensure_compatible_with(&self, render_pass: &RenderPass) -> Result<()> {
        if self.is_compatible_with(render_pass) {
            return Ok(());
        }
        Err(Error::IncompatibleFramebuffer {
            framebuffer: self.name.clone(),
            pass: render_pass.name().to_string(),
        })
    }

    /// ## Safety
    /// - `device` must be the device that created this framebuffer.
    /// - No command buffer still in flight may be using it.
    pub unsafe fn destroy<D: RenderPassDevice>(self, device: &D) {
        device.destroy_framebuffer(self.handle);
    }
}

/// Orders `attachments` by the render pass's attachment indices and computes the framebuffer
/// extent: the largest width and height among them. A pass without attachments, or views that
/// are all zero-sized in one dimension, yield [`Error::ZeroSizedFramebuffer`].
pub fn bind_views(
    framebuffer: &str,
    render_pass: &RenderPassDescription,
    attachments: &[FramebufferAttachment<'_>],
) -> Result<(Vec<vk::ImageView>, vk::Extent2D)> {
    if let Some(stray) = attachments
        .iter()
        .find(|attachment| render_pass.attachment_index(attachment.name).is_none())
    {
        return Err(Error::UnknownAttachmentName {
            pass: render_pass.name().to_string(),
            subpass: None,
            attachment: stray.name.to_string(),
        });
    }

    let mut extent = vk::Extent2D::default();
    let views = render_pass
        .attachments()
        .iter()
        .map(|description| {
            let attachment = attachments
                .iter()
                .find(|attachment| attachment.name == description.name)
                .ok_or_else(|| Error::MissingFramebufferAttachment {
                    framebuffer: framebuffer.to_string(),
                    attachment: description.name.clone(),
                })?;
            extent.width = extent.width.max(attachment.extent.width);
            extent.height = extent.height.max(attachment.extent.height);
            Ok(attachment.view)
        })
        .collect::<Result<Vec<_>>>()?;

    if extent.width == 0 || extent.height == 0 {
        return Err(Error::ZeroSizedFramebuffer {
            framebuffer: framebuffer.to_string(),
        });
    }

    Ok((views, extent))
}
