use foldhash::HashMap;
use thunderdome::{Arena, Index};

use crate::{
    config::RenderPassConfig,
    device::RenderPassDevice,
    error::{Error, Result},
    framebuffer::{Framebuffer, FramebufferAttachment},
    render_pass::{RenderPass, RenderPassDescription},
    subpass::Subpass,
};

/// Generational handle to a render pass owned by [`RenderPasses`]. Becomes stale once the pass
/// is destroyed, even if its slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderPassId(Index);

/// Owns realized render passes and hands out [`RenderPassId`]s to everything else.
///
/// Passes with the same shape are created once: [`RenderPasses::get_or_create`] returns the
/// existing id when an equivalent pass is already alive.
#[derive(Default)]
pub struct RenderPasses {
    passes: Arena<RenderPass>,
    by_hash: HashMap<u64, Vec<RenderPassId>>,
}

impl RenderPasses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, render_pass: RenderPass) -> RenderPassId {
        let hash = render_pass.structural_hash();
        let id = RenderPassId(self.passes.insert(render_pass));
        self.by_hash.entry(hash).or_default().push(id);
        id
    }

    pub fn get(&self, id: RenderPassId) -> Option<&RenderPass> {
        self.passes.get(id.0)
    }

    /// A live pass with the same shape as `description`, if there is one.
    pub fn find(&self, description: &RenderPassDescription) -> Option<RenderPassId> {
        self.by_hash
            .get(&description.structural_hash())?
            .iter()
            .copied()
            .find(|id| {
                self.get(*id)
                    .is_some_and(|pass| pass.description().same_shape(description))
            })
    }

    pub fn get_or_create<D: RenderPassDevice>(
        &mut self,
        device: &D,
        name: impl Into<String>,
        subpasses: &[Subpass],
        config: &RenderPassConfig,
    ) -> Result<RenderPassId> {
        let description = RenderPassDescription::new(name, subpasses, config)?;
        if let Some(id) = self.find(&description) {
            log::debug!(
                "Reusing render pass `{}` for `{}`",
                self.get(id).map(RenderPass::name).unwrap_or_default(),
                description.name(),
            );
            return Ok(id);
        }

        let render_pass = RenderPass::realize(device, description, config)?;
        Ok(self.insert(render_pass))
    }

    /// Creates a framebuffer for a live pass. Fails with [`Error::StaleRenderPass`] once the pass
    /// has been destroyed.
    pub fn create_framebuffer<D: RenderPassDevice>(
        &self,
        device: &D,
        id: RenderPassId,
        name: impl Into<String>,
        attachments: &[FramebufferAttachment<'_>],
    ) -> Result<Framebuffer> {
        let render_pass = self.get(id).ok_or(Error::StaleRenderPass)?;
        Framebuffer::new(device, name, render_pass, attachments)
    }

    /// Destroys one pass. Returns `false` if `id` was already stale.
    ///
    /// ## Safety
    /// - See [`RenderPass::destroy`].
    pub unsafe fn destroy<D: RenderPassDevice>(&mut self, device: &D, id: RenderPassId) -> bool {
        let Some(render_pass) = self.passes.remove(id.0) else {
            return false;
        };

        let hash = render_pass.structural_hash();
        if let Some(ids) = self.by_hash.get_mut(&hash) {
            ids.retain(|other| *other != id);
            if ids.is_empty() {
                self.by_hash.remove(&hash);
            }
        }

        render_pass.destroy(device);
        true
    }

    /// ## Safety
    /// - See [`RenderPass::destroy`].
    pub unsafe fn destroy_all<D: RenderPassDevice>(&mut self, device: &D) {
        for (_, render_pass) in self.passes.drain() {
            render_pass.destroy(device);
        }
        self.by_hash.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (RenderPassId, &RenderPass)> {
        self.passes
            .iter()
            .map(|(index, render_pass)| (RenderPassId(index), render_pass))
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}
