//! Render pass assembly: turns a list of [`Subpass`] declarations into attachment descriptions,
//! subpass references and dependencies, then realizes them as a [`vk::RenderPass`].
//!
//! Synthesis and realization are split. [`RenderPassDescription`] is the pure result and can be
//! inspected (or hashed, or compared) without a device. [`RenderPass`] owns the Vulkan handle
//! built from it.

use std::hash::{BuildHasher, Hash, Hasher};

use ash::vk;
use foldhash::fast::FixedState;

use crate::{
    config::RenderPassConfig,
    dependencies::{build_dependencies, build_external_dependencies, SubpassDependency},
    device::RenderPassDevice,
    error::{Error, Result},
    references::{AttachmentReference, SubpassDescription},
    registry::{AttachmentDescription, AttachmentRegistry},
    subpass::Subpass,
};

const STRUCTURAL_HASH_SEED: u64 = 0x5ab9_a55e_5ab9_a55e;

/// Content hash of a list of subpasses: every usage's name, role, format, sample count and
/// load/store ops, in order. Subpass labels are ignored. Equal content hashes equally no matter
/// which objects it came from, so the result can key framebuffer and pipeline caches.
pub fn structural_hash(subpasses: &[Subpass]) -> u64 {
    let mut hasher = FixedState::with_seed(STRUCTURAL_HASH_SEED).build_hasher();
    subpasses.len().hash(&mut hasher);
    for subpass in subpasses {
        subpass.attachments.hash(&mut hasher);
    }
    hasher.finish()
}

/// Everything needed to create a render pass, derived from its subpasses.
#[derive(Debug, Clone)]
pub struct RenderPassDescription {
    name: String,
    declared: Vec<Subpass>,
    registry: AttachmentRegistry,
    subpasses: Vec<SubpassDescription>,
    dependencies: Vec<SubpassDependency>,
    structural_hash: u64,
}

impl RenderPassDescription {
    pub fn new(
        name: impl Into<String>,
        subpasses: &[Subpass],
        config: &RenderPassConfig,
    ) -> Result<Self> {
        let name = name.into();
        let registry = AttachmentRegistry::build(&name, subpasses, config)?;
        let bindings = registry.bind(&name, subpasses)?;

        let descriptions = bindings
            .iter()
            .enumerate()
            .map(|(index, bindings)| SubpassDescription::build(&name, index, bindings))
            .collect::<Result<Vec<_>>>()?;

        let mut dependencies = if config.external_dependencies {
            build_external_dependencies(&bindings, &registry)
        } else {
            Vec::new()
        };
        dependencies.extend(build_dependencies(&bindings));

        let structural_hash = structural_hash(subpasses);
        log::debug!(
            "[{name}] {} attachments, {} subpasses, {} dependencies, hash {structural_hash:#018x}",
            registry.len(),
            descriptions.len(),
            dependencies.len(),
        );

        Ok(Self {
            name,
            declared: subpasses.to_vec(),
            registry,
            subpasses: descriptions,
            dependencies,
            structural_hash,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The subpasses this description was built from.
    pub fn declared_subpasses(&self) -> &[Subpass] {
        &self.declared
    }

    pub fn registry(&self) -> &AttachmentRegistry {
        &self.registry
    }

    /// Attachments in framebuffer slot order.
    pub fn attachments(&self) -> &[AttachmentDescription] {
        self.registry.attachments()
    }

    pub fn attachment_index(&self, name: &str) -> Option<u32> {
        self.registry.id(name).map(|id| id.index())
    }

    pub fn attachment_name(&self, index: u32) -> Option<&str> {
        self.attachments()
            .get(index as usize)
            .map(|attachment| attachment.name.as_str())
    }

    pub fn subpasses(&self) -> &[SubpassDescription] {
        &self.subpasses
    }

    pub fn dependencies(&self) -> &[SubpassDependency] {
        &self.dependencies
    }

    pub fn structural_hash(&self) -> u64 {
        self.structural_hash
    }

    /// Whether both descriptions would produce interchangeable Vulkan objects. Names of the
    /// passes and of their subpasses do not matter.
    pub fn same_shape(&self, other: &RenderPassDescription) -> bool {
        self.structural_hash == other.structural_hash
            && self.attachments() == other.attachments()
            && self.subpasses == other.subpasses
            && self.dependencies == other.dependencies
    }

    /// Builds the `VkRenderPassCreateInfo2` for this description and hands it to `f`. The
    /// structure borrows temporaries, so it only lives for the duration of the call.
    pub fn with_create_info<R>(&self, f: impl FnOnce(&vk::RenderPassCreateInfo2<'_>) -> R) -> R {
        let attachments: Vec<_> = self
            .attachments()
            .iter()
            .map(AttachmentDescription::to_vk)
            .collect();
        let references: Vec<_> = self.subpasses.iter().map(SubpassReferences::new).collect();
        let subpasses: Vec<_> = self
            .subpasses
            .iter()
            .zip(&references)
            .map(|(subpass, references)| references.describe(&subpass.preserve_attachments))
            .collect();
        let dependencies: Vec<_> = self
            .dependencies
            .iter()
            .map(|dependency| dependency.to_vk())
            .collect();

        f(&vk::RenderPassCreateInfo2::default()
            .attachments(&attachments)
            .subpasses(&subpasses)
            .dependencies(&dependencies))
    }
}

/// Vulkan-side copies of one subpass's references, kept alive while the create info exists.
struct SubpassReferences {
    input: Vec<vk::AttachmentReference2<'static>>,
    color: Vec<vk::AttachmentReference2<'static>>,
    resolve: Vec<vk::AttachmentReference2<'static>>,
    depth_stencil: vk::AttachmentReference2<'static>,
}

impl SubpassReferences {
    fn new(subpass: &SubpassDescription) -> Self {
        Self {
            input: to_vk_references(&subpass.input_attachments),
            color: to_vk_references(&subpass.color_attachments),
            resolve: to_vk_references(&subpass.resolve_attachments),
            depth_stencil: subpass.depth_stencil_attachment.to_vk(),
        }
    }

    fn describe<'a>(&'a self, preserve: &'a [u32]) -> vk::SubpassDescription2<'a> {
        let description = vk::SubpassDescription2::default()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .input_attachments(&self.input)
            .color_attachments(&self.color)
            .preserve_attachments(preserve)
            .depth_stencil_attachment(&self.depth_stencil);

        // Sets the color count too, so it must only be applied when there is something to resolve.
        if self.resolve.is_empty() {
            description
        } else {
            description.resolve_attachments(&self.resolve)
        }
    }
}

fn to_vk_references(references: &[AttachmentReference]) -> Vec<vk::AttachmentReference2<'static>> {
    references.iter().map(|reference| reference.to_vk()).collect()
}

/// A realized render pass. The single owner of its [`vk::RenderPass`].
///
/// Framebuffers and pipelines built against it only copy the raw handle, so the owner must keep
/// it alive until they are gone and then call [`RenderPass::destroy`].
#[derive(Debug)]
pub struct RenderPass {
    handle: vk::RenderPass,
    description: RenderPassDescription,
}

impl RenderPass {
    pub fn new<D: RenderPassDevice>(
        device: &D,
        name: impl Into<String>,
        subpasses: &[Subpass],
        config: &RenderPassConfig,
    ) -> Result<Self> {
        let description = RenderPassDescription::new(name, subpasses, config)?;
        Self::realize(device, description, config)
    }

    /// Creates the Vulkan object for an already synthesized description.
    pub fn realize<D: RenderPassDevice>(
        device: &D,
        description: RenderPassDescription,
        config: &RenderPassConfig,
    ) -> Result<Self> {
        let handle = description
            .with_create_info(|create_info| device.create_render_pass(create_info))
            .map_err(|source| Error::RenderPassCreationFailed {
                pass: description.name.clone(),
                source,
            })?;

        device.set_object_name(handle, &config.label(&description.name));
        log::debug!("Created render pass `{}`: {handle:?}", description.name);

        Ok(Self {
            handle,
            description,
        })
    }

    pub fn handle(&self) -> vk::RenderPass {
        self.handle
    }

    pub fn description(&self) -> &RenderPassDescription {
        &self.description
    }

    pub fn name(&self) -> &str {
        self.description.name()
    }

    pub fn attachments(&self) -> &[AttachmentDescription] {
        self.description.attachments()
    }

    pub fn attachment_index(&self, name: &str) -> Option<u32> {
        self.description.attachment_index(name)
    }

    pub fn attachment_name(&self, index: u32) -> Option<&str> {
        self.description.attachment_name(index)
    }

    pub fn subpasses(&self) -> &[SubpassDescription] {
        self.description.subpasses()
    }

    pub fn dependencies(&self) -> &[SubpassDependency] {
        self.description.dependencies()
    }

    pub fn structural_hash(&self) -> u64 {
        self.description.structural_hash()
    }

    /// ## Safety
    /// - `device` must be the device that created this render pass.
    /// - No framebuffer, pipeline or command buffer still in flight may be using it.
    pub unsafe fn destroy<D: RenderPassDevice>(self, device: &D) {
        device.destroy_render_pass(self.handle);
    }
}
