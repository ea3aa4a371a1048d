use ash::vk;

use crate::{
    context::Context,
    error::{Error, Result},
    framebuffer::Framebuffer,
    render_pass::RenderPass,
};

/// Position within a render pass's subpasses while it is being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubpassCursor {
    current: usize,
    count: usize,
}

impl SubpassCursor {
    pub fn new(count: usize) -> Self {
        Self { current: 0, count }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Moves to the next subpass, or returns `None` if already on the last one.
    pub fn advance(&mut self) -> Option<usize> {
        if self.current + 1 >= self.count {
            return None;
        }
        self.current += 1;
        Some(self.current)
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.count
    }
}

/// Records one instance of a render pass into the context's draw command buffer.
pub struct PassRecorder<'a> {
    context: &'a Context,
    render_pass: &'a RenderPass,
    cursor: SubpassCursor,
}

impl<'a> PassRecorder<'a> {
    /// Begins `render_pass` over the whole of `framebuffer`, with the first subpass recorded
    /// inline. Ensure that:
    ///
    /// - the draw command buffer is in the RECORDING state
    /// - no other render pass is in progress
    /// - `clear_values` has an entry for every attachment cleared on load
    ///
    /// Nothing is recorded if `framebuffer` was built for a pass of a different shape.
    pub fn begin(
        context: &'a Context,
        render_pass: &'a RenderPass,
        framebuffer: &Framebuffer,
        clear_values: &[vk::ClearValue],
    ) -> Result<Self> {
        framebuffer.ensure_compatible_with(render_pass)?;

        unsafe {
            context.device.cmd_begin_render_pass2(
                context.draw_command_buffer,
                &vk::RenderPassBeginInfo::default()
                    .render_pass(render_pass.handle())
                    .framebuffer(framebuffer.handle)
                    .render_area(vk::Rect2D {
                        offset: vk::Offset2D::default(),
                        extent: framebuffer.extent,
                    })
                    .clear_values(clear_values),
                &vk::SubpassBeginInfo::default().contents(vk::SubpassContents::INLINE),
            );
        }

        Ok(Self {
            context,
            render_pass,
            cursor: SubpassCursor::new(render_pass.subpasses().len()),
        })
    }

    pub fn subpass(&self) -> usize {
        self.cursor.current()
    }

    /// Moves on to the next subpass and returns its index.
    pub fn next_subpass(&mut self) -> Result<usize> {
        let next = self
            .cursor
            .advance()
            .ok_or_else(|| Error::SubpassOutOfRange {
                pass: self.render_pass.name().to_string(),
                count: self.cursor.count(),
            })?;

        unsafe {
            self.context.device.cmd_next_subpass2(
                self.context.draw_command_buffer,
                &vk::SubpassBeginInfo::default().contents(vk::SubpassContents::INLINE),
                &vk::SubpassEndInfo::default(),
            );
        }

        Ok(next)
    }

    /// Ends the render pass. Nothing is recorded if subpasses remain; the command buffer then
    /// has to be reset by the caller.
    pub fn end(self) -> Result<()> {
        if !self.cursor.is_last() {
            return Err(Error::UnfinishedSubpasses {
                pass: self.render_pass.name().to_string(),
                recorded: self.cursor.current() + 1,
                count: self.cursor.count(),
            });
        }

        unsafe {
            self.context.device.cmd_end_render_pass2(
                self.context.draw_command_buffer,
                &vk::SubpassEndInfo::default(),
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_walks_every_subpass() {
        let mut cursor = SubpassCursor::new(3);
        assert_eq!(cursor.current(), 0);
        assert!(!cursor.is_last());
        assert_eq!(cursor.advance(), Some(1));
        assert_eq!(cursor.advance(), Some(2));
        assert!(cursor.is_last());
        assert_eq!(cursor.advance(), None);
        assert_eq!(cursor.current(), 2);
    }

    #[test]
    fn single_subpass_starts_last() {
        let mut cursor = SubpassCursor::new(1);
        assert!(cursor.is_last());
        assert_eq!(cursor.advance(), None);
    }
}
