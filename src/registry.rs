use ash::vk;
use foldhash::HashMap;

use crate::{
    attachment::{AttachmentRole, AttachmentUsage},
    config::{ConflictPolicy, RenderPassConfig},
    error::{Error, Result},
    subpass::Subpass,
};

/// Interned attachment name: the attachment's index in the render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttachmentId(u32);

impl AttachmentId {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub const fn index(self) -> u32 {
        self.0
    }
}

/// A registry entry: one distinct attachment of the render pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttachmentDescription {
    pub name: String,
    pub format: vk::Format,
    pub samples: vk::SampleCountFlags,
    pub initial_layout: vk::ImageLayout,
    pub final_layout: vk::ImageLayout,
    pub load_op: vk::AttachmentLoadOp,
    pub store_op: vk::AttachmentStoreOp,
    pub stencil_load_op: vk::AttachmentLoadOp,
    pub stencil_store_op: vk::AttachmentStoreOp,
}

impl AttachmentDescription {
    /// Stencil ops mirror the color ops; per-attachment stencil load/store is not supported.
    pub fn from_usage(usage: &AttachmentUsage) -> Self {
        let layout = usage.role.traits().attachment_layout;
        Self {
            name: usage.name.clone(),
            format: usage.format,
            samples: usage.samples,
            initial_layout: layout,
            final_layout: layout,
            load_op: usage.load_op,
            store_op: usage.store_op,
            stencil_load_op: usage.load_op,
            stencil_store_op: usage.store_op,
        }
    }

    pub(crate) fn to_vk(&self) -> vk::AttachmentDescription2<'static> {
        vk::AttachmentDescription2::default()
            .format(self.format)
            .samples(self.samples)
            .load_op(self.load_op)
            .store_op(self.store_op)
            .stencil_load_op(self.stencil_load_op)
            .stencil_store_op(self.stencil_store_op)
            .initial_layout(self.initial_layout)
            .final_layout(self.final_layout)
    }
}

/// An attachment usage after interning: which slot, in which role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttachmentBinding {
    pub id: AttachmentId,
    pub role: AttachmentRole,
}

/// The usages of one subpass, in declaration order, with names resolved to ids.
pub type SubpassBindings = Vec<AttachmentBinding>;

/// The deduplicated, ordered set of attachments a render pass touches.
#[derive(Debug, Clone, Default)]
pub struct AttachmentRegistry {
    attachments: Vec<AttachmentDescription>,
    lookup: HashMap<String, AttachmentId>,
}

impl AttachmentRegistry {
    /// Walks every subpass in order and records each attachment name the first time it is
    /// seen. Later usages of a name never change its entry.
    pub fn build(pass: &str, subpasses: &[Subpass], config: &RenderPassConfig) -> Result<Self> {
        let mut registry = Self::default();

        for (subpass_index, subpass) in subpasses.iter().enumerate() {
            for usage in &subpass.attachments {
                match registry.id(&usage.name) {
                    Some(id) => registry.check_conflict(pass, subpass_index, id, usage, config)?,
                    None => {
                        let id = registry.insert(AttachmentDescription::from_usage(usage));
                        log::debug!(
                            "[{pass}] attachment {} `{}`: {:?} x{:?} ({:?})",
                            id.index(),
                            usage.name,
                            usage.format,
                            usage.samples,
                            usage.role,
                        );
                    }
                }
            }
        }

        Ok(registry)
    }

    fn insert(&mut self, description: AttachmentDescription) -> AttachmentId {
        let id = AttachmentId(self.attachments.len() as u32);
        self.lookup.insert(description.name.clone(), id);
        self.attachments.push(description);
        id
    }

    fn check_conflict(
        &self,
        pass: &str,
        subpass: usize,
        id: AttachmentId,
        usage: &AttachmentUsage,
        config: &RenderPassConfig,
    ) -> Result<()> {
        let existing = &self.attachments[id.0 as usize];
        if existing.format == usage.format && existing.samples == usage.samples {
            return Ok(());
        }

        match config.conflict_policy {
            ConflictPolicy::Reject => Err(Error::ConflictingAttachmentDefinition {
                pass: pass.to_string(),
                subpass,
                attachment: usage.name.clone(),
                expected_format: existing.format,
                expected_samples: existing.samples,
                found_format: usage.format,
                found_samples: usage.samples,
            }),
            ConflictPolicy::KeepFirst => {
                log::warn!(
                    "[{pass}] subpass {subpass} redeclares `{}` as {:?} x{:?}, keeping {:?} x{:?}",
                    usage.name,
                    usage.format,
                    usage.samples,
                    existing.format,
                    existing.samples,
                );
                Ok(())
            }
        }
    }

    /// Resolves every usage of every subpass to its [`AttachmentId`].
    pub fn bind(&self, pass: &str, subpasses: &[Subpass]) -> Result<Vec<SubpassBindings>> {
        subpasses
            .iter()
            .enumerate()
            .map(|(subpass_index, subpass)| {
                subpass
                    .attachments
                    .iter()
                    .map(|usage| {
                        let id = self.id(&usage.name).ok_or_else(|| Error::UnknownAttachmentName {
                            pass: pass.to_string(),
                            subpass: Some(subpass_index),
                            attachment: usage.name.clone(),
                        })?;
                        Ok(AttachmentBinding {
                            id,
                            role: usage.role,
                        })
                    })
                    .collect::<Result<SubpassBindings>>()
            })
            .collect()
    }

    pub fn id(&self, name: &str) -> Option<AttachmentId> {
        self.lookup.get(name).copied()
    }

    pub fn get(&self, id: AttachmentId) -> Option<&AttachmentDescription> {
        self.attachments.get(id.0 as usize)
    }

    pub fn name(&self, id: AttachmentId) -> Option<&str> {
        self.get(id).map(|description| description.name.as_str())
    }

    pub fn attachments(&self) -> &[AttachmentDescription] {
        &self.attachments
    }

    pub fn iter(&self) -> impl Iterator<Item = (AttachmentId, &AttachmentDescription)> {
        self.attachments
            .iter()
            .enumerate()
            .map(|(index, description)| (AttachmentId(index as u32), description))
    }

    pub fn len(&self) -> usize {
        self.attachments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gbuffer() -> Vec<Subpass> {
        vec![
            Subpass::new("geometry")
                .with(AttachmentUsage::color("albedo", vk::Format::R8G8B8A8_UNORM))
                .with(AttachmentUsage::color("normal", vk::Format::R16G16B16A16_SFLOAT))
                .with(AttachmentUsage::depth_stencil("depth", vk::Format::D32_SFLOAT)),
            Subpass::new("lighting")
                .with(AttachmentUsage::input("albedo", vk::Format::R8G8B8A8_UNORM))
                .with(AttachmentUsage::input("normal", vk::Format::R16G16B16A16_SFLOAT))
                .with(AttachmentUsage::color("hdr", vk::Format::R16G16B16A16_SFLOAT)),
        ]
    }

    #[test]
    fn one_entry_per_name() {
        let subpasses = vec![
            Subpass::new("a").with(AttachmentUsage::color("A", vk::Format::R8G8B8A8_SRGB)),
            Subpass::new("b").with(AttachmentUsage::color("A", vk::Format::R8G8B8A8_SRGB)),
        ];
        let registry =
            AttachmentRegistry::build("dedup", &subpasses, &RenderPassConfig::default()).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.attachments()[0].name, "A");
    }

    #[test]
    fn indices_follow_first_seen_order() {
        let subpasses = gbuffer();
        let config = RenderPassConfig::default();
        let registry = AttachmentRegistry::build("deferred", &subpasses, &config).unwrap();
        let names: Vec<_> = registry.attachments().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["albedo", "normal", "depth", "hdr"]);

        let again = AttachmentRegistry::build("deferred", &subpasses, &config).unwrap();
        for (id, description) in registry.iter() {
            assert_eq!(again.id(&description.name), Some(id));
        }
        assert_eq!(registry.id("hdr"), Some(AttachmentId::new(3)));
        assert_eq!(registry.name(AttachmentId::new(2)), Some("depth"));
        assert_eq!(registry.id("missing"), None);
    }

    #[test]
    fn first_occurrence_defines_the_entry() {
        let registry =
            AttachmentRegistry::build("deferred", &gbuffer(), &RenderPassConfig::default())
                .unwrap();
        let albedo = registry.get(registry.id("albedo").unwrap()).unwrap();
        assert_eq!(albedo.initial_layout, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);
        assert_eq!(albedo.final_layout, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);
    }

    #[test]
    fn stencil_ops_mirror_color_ops() {
        let usage = AttachmentUsage::depth_stencil("depth", vk::Format::D24_UNORM_S8_UINT)
            .ops(vk::AttachmentLoadOp::CLEAR, vk::AttachmentStoreOp::DONT_CARE);
        let description = AttachmentDescription::from_usage(&usage);
        assert_eq!(description.stencil_load_op, vk::AttachmentLoadOp::CLEAR);
        assert_eq!(description.stencil_store_op, vk::AttachmentStoreOp::DONT_CARE);
    }

    #[test]
    fn unused_attachments_keep_their_slot() {
        let subpasses = vec![
            Subpass::new("a")
                .with(AttachmentUsage::unused("spare", vk::Format::R8_UNORM))
                .with(AttachmentUsage::color("color", vk::Format::R8G8B8A8_UNORM)),
        ];
        let registry =
            AttachmentRegistry::build("slots", &subpasses, &RenderPassConfig::default()).unwrap();
        assert_eq!(registry.id("spare"), Some(AttachmentId::new(0)));
        assert_eq!(registry.id("color"), Some(AttachmentId::new(1)));
        assert_eq!(
            registry.attachments()[0].initial_layout,
            vk::ImageLayout::UNDEFINED
        );
    }

    #[test]
    fn conflicting_format_is_rejected() {
        let subpasses = vec![
            Subpass::new("a").with(AttachmentUsage::color("A", vk::Format::R8G8B8A8_SRGB)),
            Subpass::new("b").with(AttachmentUsage::input("A", vk::Format::R16G16B16A16_SFLOAT)),
        ];
        let error = AttachmentRegistry::build("conflict", &subpasses, &RenderPassConfig::default())
            .unwrap_err();
        match error {
            Error::ConflictingAttachmentDefinition {
                pass,
                subpass,
                attachment,
                expected_format,
                found_format,
                ..
            } => {
                assert_eq!(pass, "conflict");
                assert_eq!(subpass, 1);
                assert_eq!(attachment, "A");
                assert_eq!(expected_format, vk::Format::R8G8B8A8_SRGB);
                assert_eq!(found_format, vk::Format::R16G16B16A16_SFLOAT);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn conflicting_samples_can_be_tolerated() {
        let subpasses = vec![
            Subpass::new("a").with(AttachmentUsage::color("A", vk::Format::R8G8B8A8_SRGB)),
            Subpass::new("b").with(
                AttachmentUsage::color("A", vk::Format::R8G8B8A8_SRGB)
                    .samples(vk::SampleCountFlags::TYPE_4),
            ),
        ];
        let strict = AttachmentRegistry::build("msaa", &subpasses, &RenderPassConfig::default());
        assert!(matches!(
            strict,
            Err(Error::ConflictingAttachmentDefinition { .. })
        ));

        let config = RenderPassConfig::default().with_conflict_policy(ConflictPolicy::KeepFirst);
        let registry = AttachmentRegistry::build("msaa", &subpasses, &config).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.attachments()[0].samples, vk::SampleCountFlags::TYPE_1);
    }

    #[test]
    fn bind_interns_names() {
        let subpasses = gbuffer();
        let registry =
            AttachmentRegistry::build("deferred", &subpasses, &RenderPassConfig::default())
                .unwrap();
        let bindings = registry.bind("deferred", &subpasses).unwrap();
        assert_eq!(
            bindings[1],
            vec![
                AttachmentBinding {
                    id: AttachmentId::new(0),
                    role: AttachmentRole::Input
                },
                AttachmentBinding {
                    id: AttachmentId::new(1),
                    role: AttachmentRole::Input
                },
                AttachmentBinding {
                    id: AttachmentId::new(3),
                    role: AttachmentRole::Color
                },
            ]
        );
    }

    #[test]
    fn bind_rejects_names_outside_the_registry() {
        let registry =
            AttachmentRegistry::build("deferred", &gbuffer(), &RenderPassConfig::default())
                .unwrap();
        let stray = vec![
            Subpass::new("a"),
            Subpass::new("b").with(AttachmentUsage::preserve("ghost", vk::Format::R8_UNORM)),
        ];
        let error = registry.bind("deferred", &stray).unwrap_err();
        assert!(matches!(
            error,
            Error::UnknownAttachmentName { subpass: Some(1), ref attachment, .. } if attachment == "ghost"
        ));
    }
}
