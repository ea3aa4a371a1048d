use ash::vk;

use crate::{
    attachment::AttachmentRole,
    error::{Error, Result},
    registry::AttachmentBinding,
};

/// A subpass's view of one attachment: which slot, and in which layout/aspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttachmentReference {
    pub attachment: u32,
    pub layout: vk::ImageLayout,
    pub aspect_mask: vk::ImageAspectFlags,
}

impl AttachmentReference {
    /// The "not present" slot, e.g. for a subpass without a depth-stencil attachment.
    pub const UNUSED: Self = Self {
        attachment: vk::ATTACHMENT_UNUSED,
        layout: vk::ImageLayout::UNDEFINED,
        aspect_mask: vk::ImageAspectFlags::empty(),
    };

    fn for_role(binding: &AttachmentBinding) -> Self {
        let traits = binding.role.traits();
        Self {
            attachment: binding.id.index(),
            layout: traits.reference_layout,
            aspect_mask: traits.aspect_mask,
        }
    }

    pub fn is_unused(&self) -> bool {
        self.attachment == vk::ATTACHMENT_UNUSED
    }

    pub(crate) fn to_vk(self) -> vk::AttachmentReference2<'static> {
        vk::AttachmentReference2::default()
            .attachment(self.attachment)
            .layout(self.layout)
            .aspect_mask(self.aspect_mask)
    }
}

impl Default for AttachmentReference {
    fn default() -> Self {
        Self::UNUSED
    }
}

/// The attachment references of one subpass, partitioned by role.
///
/// `color_attachments` and `resolve_attachments` are positionally aligned: when resolve targets
/// are present, `resolve_attachments[i]` resolves `color_attachments[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SubpassDescription {
    pub input_attachments: Vec<AttachmentReference>,
    pub color_attachments: Vec<AttachmentReference>,
    pub resolve_attachments: Vec<AttachmentReference>,
    pub preserve_attachments: Vec<u32>,
    pub depth_stencil_attachment: AttachmentReference,
}

impl SubpassDescription {
    pub fn build(pass: &str, subpass: usize, bindings: &[AttachmentBinding]) -> Result<Self> {
        let mut description = Self::default();

        for binding in bindings {
            let reference = AttachmentReference::for_role(binding);
            match binding.role {
                AttachmentRole::Unused => {}
                AttachmentRole::Color => description.color_attachments.push(reference),
                // Only one slot exists; a second declaration replaces the first.
                AttachmentRole::DepthStencil => description.depth_stencil_attachment = reference,
                AttachmentRole::Resolve => description.resolve_attachments.push(reference),
                AttachmentRole::Input => description.input_attachments.push(reference),
                AttachmentRole::Preserve => {
                    description.preserve_attachments.push(binding.id.index())
                }
            }
        }

        let color = description.color_attachments.len();
        let resolve = description.resolve_attachments.len();
        if resolve != 0 && resolve != color {
            return Err(Error::MismatchedResolveAttachments {
                pass: pass.to_string(),
                subpass,
                color,
                resolve,
            });
        }

        Ok(description)
    }

    pub fn depth_stencil(&self) -> Option<&AttachmentReference> {
        (!self.depth_stencil_attachment.is_unused()).then_some(&self.depth_stencil_attachment)
    }

    /// Whether this subpass references `attachment` in any role.
    pub fn references(&self, attachment: u32) -> bool {
        self.input_attachments
            .iter()
            .chain(&self.color_attachments)
            .chain(&self.resolve_attachments)
            .any(|reference| reference.attachment == attachment)
            || self.preserve_attachments.contains(&attachment)
            || self.depth_stencil_attachment.attachment == attachment
    }
}
