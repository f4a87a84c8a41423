//! DisplayPresenter - mailbox + surface

use tracing::trace;

use crate::error::SurfaceError;
use crate::mailbox::FrameMailbox;
use crate::surface::Surface;

/// Owns the surface and the frame mailbox.
///
/// The sensor side only ever sees a [`FrameMailbox`] clone; rendering stays on
/// the control loop.
pub struct DisplayPresenter<S: Surface> {
    surface: S,
    mailbox: FrameMailbox,
    frames_presented: u64,
}

impl<S: Surface> DisplayPresenter<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            mailbox: FrameMailbox::new(),
            frames_presented: 0,
        }
    }

    /// Handle for the sensor callback
    pub fn mailbox(&self) -> FrameMailbox {
        self.mailbox.clone()
    }

    /// One render step.
    ///
    /// Blits and presents the pending frame if there is one, otherwise presents
    /// the previous contents. Returns true when a new frame was shown.
    pub fn render_tick(&mut self) -> Result<bool, SurfaceError> {
        let fresh = match self.mailbox.take() {
            Some(frame) => {
                self.surface.blit(&frame)?;
                true
            }
            None => false,
        };

        self.surface.present()?;

        if fresh {
            self.frames_presented += 1;
            observability::record_frame_presented();
            trace!(frames_presented = self.frames_presented, "frame presented");
        }
        Ok(fresh)
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::HeadlessSurface;
    use contracts::Frame;

    struct FailingSurface;

    impl Surface for FailingSurface {
        fn size(&self) -> (u32, u32) {
            (1, 1)
        }

        fn blit(&mut self, _frame: &Frame) -> Result<(), SurfaceError> {
            Ok(())
        }

        fn present(&mut self) -> Result<(), SurfaceError> {
            Err(SurfaceError::render("device lost"))
        }
    }

    #[test]
    fn test_render_tick_presents_latest_frame() {
        let mut presenter = DisplayPresenter::new(HeadlessSurface::new(1, 1).unwrap());
        let mailbox = presenter.mailbox();

        mailbox.post(Frame::from_columns(1, 1, vec![1, 2, 3]).unwrap());
        mailbox.post(Frame::from_columns(1, 1, vec![4, 5, 6]).unwrap());

        assert!(presenter.render_tick().unwrap());
        assert_eq!(presenter.surface().pixel(0, 0), Some([4, 5, 6]));
        assert_eq!(presenter.frames_presented(), 1);
    }

    #[test]
    fn test_empty_mailbox_redraws_previous() {
        let mut presenter = DisplayPresenter::new(HeadlessSurface::new(1, 1).unwrap());
        presenter
            .mailbox()
            .post(Frame::from_columns(1, 1, vec![7, 7, 7]).unwrap());

        presenter.render_tick().unwrap();
        assert!(!presenter.render_tick().unwrap());

        assert_eq!(presenter.surface().pixel(0, 0), Some([7, 7, 7]));
        assert_eq!(presenter.surface().present_count(), 2);
        assert_eq!(presenter.surface().blit_count(), 1);
    }

    #[test]
    fn test_surface_error_propagates() {
        let mut presenter = DisplayPresenter::new(FailingSurface);
        assert!(matches!(
            presenter.render_tick(),
            Err(SurfaceError::Render { .. })
        ));
    }
}
