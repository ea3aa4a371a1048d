use ash::vk;

/// How a subpass uses one of the render pass's attachments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttachmentRole {
    /// Declared but not touched. Still occupies a registry slot so indices stay stable.
    #[default]
    Unused,
    Color,
    DepthStencil,
    /// Multisample resolve target, paired positionally with a color attachment.
    Resolve,
    Input,
    /// Contents must survive this subpass without being accessed.
    Preserve,
}

/// The fixed per-role rules every stage of synthesis reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleTraits {
    /// Initial and final layout of a registry attachment first declared with this role.
    pub attachment_layout: vk::ImageLayout,
    /// Layout used by a subpass attachment reference.
    pub reference_layout: vk::ImageLayout,
    pub aspect_mask: vk::ImageAspectFlags,
    pub access_mask: vk::AccessFlags,
    /// Stage waited on when this role consumes an attachment.
    pub dst_stage_mask: vk::PipelineStageFlags,
    /// Stage waited for when this role produced an attachment.
    pub src_stage_mask: vk::PipelineStageFlags,
}

/// A stage/access pair for one side of a dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StageAccess {
    pub stage_mask: vk::PipelineStageFlags,
    pub access_mask: vk::AccessFlags,
}

impl AttachmentRole {
    pub const ALL: [AttachmentRole; 6] = [
        AttachmentRole::Unused,
        AttachmentRole::Color,
        AttachmentRole::DepthStencil,
        AttachmentRole::Resolve,
        AttachmentRole::Input,
        AttachmentRole::Preserve,
    ];

    pub const fn traits(self) -> RoleTraits {
        match self {
            AttachmentRole::Unused => RoleTraits {
                attachment_layout: vk::ImageLayout::UNDEFINED,
                reference_layout: vk::ImageLayout::UNDEFINED,
                aspect_mask: vk::ImageAspectFlags::empty(),
                access_mask: vk::AccessFlags::empty(),
                dst_stage_mask: vk::PipelineStageFlags::empty(),
                src_stage_mask: vk::PipelineStageFlags::empty(),
            },
            AttachmentRole::Color => RoleTraits {
                attachment_layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
                reference_layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
                aspect_mask: vk::ImageAspectFlags::COLOR,
                access_mask: vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
                dst_stage_mask: vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
                src_stage_mask: vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
            },
            AttachmentRole::DepthStencil => RoleTraits {
                attachment_layout: vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
                reference_layout: vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
                aspect_mask: vk::ImageAspectFlags::DEPTH,
                access_mask: vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
                dst_stage_mask: vk::PipelineStageFlags::LATE_FRAGMENT_TESTS,
                src_stage_mask: vk::PipelineStageFlags::LATE_FRAGMENT_TESTS,
            },
            // The attachment lives in GENERAL, but the subpass writes it as a color attachment.
            AttachmentRole::Resolve => RoleTraits {
                attachment_layout: vk::ImageLayout::GENERAL,
                reference_layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
                aspect_mask: vk::ImageAspectFlags::COLOR,
                access_mask: vk::AccessFlags::TRANSFER_WRITE,
                dst_stage_mask: vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
                src_stage_mask: vk::PipelineStageFlags::TRANSFER,
            },
            // No source stage: a prior input read only orders through its access mask.
            AttachmentRole::Input => RoleTraits {
                attachment_layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
                reference_layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
                aspect_mask: vk::ImageAspectFlags::COLOR,
                access_mask: vk::AccessFlags::SHADER_READ,
                dst_stage_mask: vk::PipelineStageFlags::FRAGMENT_SHADER,
                src_stage_mask: vk::PipelineStageFlags::empty(),
            },
            AttachmentRole::Preserve => RoleTraits {
                attachment_layout: vk::ImageLayout::UNDEFINED,
                reference_layout: vk::ImageLayout::UNDEFINED,
                aspect_mask: vk::ImageAspectFlags::empty(),
                access_mask: vk::AccessFlags::empty(),
                dst_stage_mask: vk::PipelineStageFlags::TOP_OF_PIPE,
                src_stage_mask: vk::PipelineStageFlags::TOP_OF_PIPE,
            },
        }
    }

    pub fn is_used(self) -> bool {
        self != AttachmentRole::Unused
    }

    /// Stage/access of a dependency whose producer had this role. `None` for [`Self::Unused`].
    pub fn src_sync(self) -> Option<StageAccess> {
        let traits = self.traits();
        self.is_used().then_some(StageAccess {
            stage_mask: traits.src_stage_mask,
            access_mask: traits.access_mask,
        })
    }

    /// Stage/access of a dependency whose consumer has this role. `None` for [`Self::Unused`].
    pub fn dst_sync(self) -> Option<StageAccess> {
        let traits = self.traits();
        self.is_used().then_some(StageAccess {
            stage_mask: traits.dst_stage_mask,
            access_mask: traits.access_mask,
        })
    }
}

/// Best guess at the last stage that touched an image left in `layout`.
pub fn layout_stage(layout: vk::ImageLayout) -> vk::PipelineStageFlags {
    match layout {
        vk::ImageLayout::GENERAL => vk::PipelineStageFlags::COMPUTE_SHADER,
        vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL => {
            vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
        }
        vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL
        | vk::ImageLayout::DEPTH_READ_ONLY_OPTIMAL
        | vk::ImageLayout::STENCIL_READ_ONLY_OPTIMAL
        | vk::ImageLayout::DEPTH_STENCIL_READ_ONLY_OPTIMAL => {
            vk::PipelineStageFlags::FRAGMENT_SHADER
        }
        vk::ImageLayout::TRANSFER_SRC_OPTIMAL | vk::ImageLayout::TRANSFER_DST_OPTIMAL => {
            vk::PipelineStageFlags::TRANSFER
        }
        vk::ImageLayout::DEPTH_ATTACHMENT_STENCIL_READ_ONLY_OPTIMAL
        | vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL
        | vk::ImageLayout::STENCIL_ATTACHMENT_OPTIMAL
        | vk::ImageLayout::DEPTH_ATTACHMENT_OPTIMAL
        | vk::ImageLayout::DEPTH_READ_ONLY_STENCIL_ATTACHMENT_OPTIMAL => {
            vk::PipelineStageFlags::LATE_FRAGMENT_TESTS
        }
        vk::ImageLayout::PRESENT_SRC_KHR | vk::ImageLayout::SHARED_PRESENT_KHR => {
            vk::PipelineStageFlags::BOTTOM_OF_PIPE
        }
        _ => vk::PipelineStageFlags::TOP_OF_PIPE,
    }
}

/// Best guess at the memory access that left an image in `layout`.
pub fn layout_access(layout: vk::ImageLayout) -> vk::AccessFlags {
    match layout {
        vk::ImageLayout::UNDEFINED | vk::ImageLayout::PRESENT_SRC_KHR => vk::AccessFlags::empty(),
        vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL => vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
        vk::ImageLayout::GENERAL => vk::AccessFlags::SHADER_READ | vk::AccessFlags::SHADER_WRITE,
        vk::ImageLayout::DEPTH_ATTACHMENT_OPTIMAL
        | vk::ImageLayout::STENCIL_ATTACHMENT_OPTIMAL
        | vk::ImageLayout::DEPTH_READ_ONLY_STENCIL_ATTACHMENT_OPTIMAL
        | vk::ImageLayout::DEPTH_ATTACHMENT_STENCIL_READ_ONLY_OPTIMAL
        | vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL => {
            vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_READ
                | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE
        }
        vk::ImageLayout::DEPTH_READ_ONLY_OPTIMAL
        | vk::ImageLayout::STENCIL_READ_ONLY_OPTIMAL
        | vk::ImageLayout::DEPTH_STENCIL_READ_ONLY_OPTIMAL => {
            vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_READ
        }
        vk::ImageLayout::TRANSFER_SRC_OPTIMAL => vk::AccessFlags::TRANSFER_READ,
        vk::ImageLayout::TRANSFER_DST_OPTIMAL => vk::AccessFlags::TRANSFER_WRITE,
        _ => vk::AccessFlags::SHADER_READ,
    }
}

/// A named attachment as seen by a single subpass.
///
/// The name is the attachment's identity across the whole render pass: every usage with the
/// same name, in any subpass, refers to the same framebuffer slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttachmentUsage {
    pub name: String,
    pub format: vk::Format,
    pub samples: vk::SampleCountFlags,
    pub role: AttachmentRole,
    pub load_op: vk::AttachmentLoadOp,
    pub store_op: vk::AttachmentStoreOp,
}

impl AttachmentUsage {
    /// A single-sampled usage that loads and stores its contents.
    pub fn new(name: impl Into<String>, role: AttachmentRole, format: vk::Format) -> Self {
        Self {
            name: name.into(),
            format,
            samples: vk::SampleCountFlags::TYPE_1,
            role,
            load_op: vk::AttachmentLoadOp::LOAD,
            store_op: vk::AttachmentStoreOp::STORE,
        }
    }

    pub fn color(name: impl Into<String>, format: vk::Format) -> Self {
        Self::new(name, AttachmentRole::Color, format)
    }

    pub fn depth_stencil(name: impl Into<String>, format: vk::Format) -> Self {
        Self::new(name, AttachmentRole::DepthStencil, format)
    }

    pub fn resolve(name: impl Into<String>, format: vk::Format) -> Self {
        Self::new(name, AttachmentRole::Resolve, format)
    }

    pub fn input(name: impl Into<String>, format: vk::Format) -> Self {
        Self::new(name, AttachmentRole::Input, format)
    }

    pub fn preserve(name: impl Into<String>, format: vk::Format) -> Self {
        Self::new(name, AttachmentRole::Preserve, format)
    }

    pub fn unused(name: impl Into<String>, format: vk::Format) -> Self {
        Self::new(name, AttachmentRole::Unused, format)
    }

    pub fn samples(mut self, samples: vk::SampleCountFlags) -> Self {
        self.samples = samples;
        self
    }

    pub fn load_op(mut self, load_op: vk::AttachmentLoadOp) -> Self {
        self.load_op = load_op;
        self
    }

    pub fn store_op(mut self, store_op: vk::AttachmentStoreOp) -> Self {
        self.store_op = store_op;
        self
    }

    pub fn ops(self, load_op: vk::AttachmentLoadOp, store_op: vk::AttachmentStoreOp) -> Self {
        self.load_op(load_op).store_op(store_op)
    }
}
