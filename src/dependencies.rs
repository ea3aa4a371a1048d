use ash::vk;

use crate::{
    attachment::{layout_access, layout_stage},
    registry::{AttachmentId, AttachmentRegistry, SubpassBindings},
};

/// An execution and memory dependency between two subpasses, caused by one shared attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubpassDependency {
    /// Index of the producing subpass, or `vk::SUBPASS_EXTERNAL`.
    pub src_subpass: u32,
    pub dst_subpass: u32,
    pub src_stage_mask: vk::PipelineStageFlags,
    pub dst_stage_mask: vk::PipelineStageFlags,
    pub src_access_mask: vk::AccessFlags,
    pub dst_access_mask: vk::AccessFlags,
    pub dependency_flags: vk::DependencyFlags,
    /// The attachment both subpasses touch. Not part of the Vulkan structure.
    pub attachment: AttachmentId,
}

impl SubpassDependency {
    pub fn is_external(&self) -> bool {
        self.src_subpass == vk::SUBPASS_EXTERNAL
    }

    pub(crate) fn to_vk(self) -> vk::SubpassDependency2<'static> {
        vk::SubpassDependency2::default()
            .src_subpass(self.src_subpass)
            .dst_subpass(self.dst_subpass)
            .src_stage_mask(self.src_stage_mask)
            .dst_stage_mask(self.dst_stage_mask)
            .src_access_mask(self.src_access_mask)
            .dst_access_mask(self.dst_access_mask)
            .dependency_flags(self.dependency_flags)
    }
}

/// For every attachment a subpass uses, emits one dependency on each earlier subpass that used
/// the same attachment. Edges are never merged, so two subpasses sharing three attachments get
/// three dependencies.
pub fn build_dependencies(subpasses: &[SubpassBindings]) -> Vec<SubpassDependency> {
    let mut dependencies = Vec::new();

    for (dst_subpass, bindings) in subpasses.iter().enumerate() {
        for binding in bindings {
            let Some(dst) = binding.role.dst_sync() else {
                continue;
            };

            for (src_subpass, earlier) in subpasses[..dst_subpass].iter().enumerate() {
                for source in earlier.iter().filter(|source| source.id == binding.id) {
                    let Some(src) = source.role.src_sync() else {
                        continue;
                    };

                    let dependency = SubpassDependency {
                        src_subpass: src_subpass as u32,
                        dst_subpass: dst_subpass as u32,
                        src_stage_mask: src.stage_mask,
                        dst_stage_mask: dst.stage_mask,
                        src_access_mask: src.access_mask,
                        dst_access_mask: dst.access_mask,
                        dependency_flags: vk::DependencyFlags::BY_REGION,
                        attachment: binding.id,
                    };
                    log::trace!(
                        "attachment {}: subpass {src_subpass} ({:?}) -> subpass {dst_subpass} ({:?})",
                        binding.id.index(),
                        source.role,
                        binding.role,
                    );
                    dependencies.push(dependency);
                }
            }
        }
    }

    dependencies
}

/// One `VK_SUBPASS_EXTERNAL` dependency per attachment, into the first subpass that uses it.
/// The source side is guessed from the layout the attachment is expected to arrive in.
pub fn build_external_dependencies(
    subpasses: &[SubpassBindings],
    registry: &AttachmentRegistry,
) -> Vec<SubpassDependency> {
    let mut seen = vec![false; registry.len()];
    let mut dependencies = Vec::new();

    for (dst_subpass, bindings) in subpasses.iter().enumerate() {
        for binding in bindings {
            let Some(dst) = binding.role.dst_sync() else {
                continue;
            };
            let Some(description) = registry.get(binding.id) else {
                continue;
            };
            let first_use = &mut seen[binding.id.index() as usize];
            if *first_use {
                continue;
            }
            *first_use = true;

            dependencies.push(SubpassDependency {
                src_subpass: vk::SUBPASS_EXTERNAL,
                dst_subpass: dst_subpass as u32,
                src_stage_mask: layout_stage(description.initial_layout),
                dst_stage_mask: dst.stage_mask,
                src_access_mask: layout_access(description.initial_layout),
                dst_access_mask: dst.access_mask,
                dependency_flags: vk::DependencyFlags::BY_REGION,
                attachment: binding.id,
            });
        }
    }

    dependencies
}
