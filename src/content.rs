//! Caller-owned window content.
//!
//! The manager holds content behind the [`Renderable`] capability and never
//! looks past it. Rendering goes through [`render_guarded`], which turns both
//! an `Err` and a panic inside `render` into a [`ContentError`] so that one
//! misbehaving window cannot take the desktop down with it.

use std::any::Any;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use ratatui::layout::Rect;
use thiserror::Error;

use crate::ui::UiFrame;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("content failed to render: {0}")]
    Failed(String),
    #[error("content panicked while rendering: {0}")]
    Panicked(String),
    #[error("content is already being rendered")]
    Busy,
}

impl ContentError {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }
}

/// Context passed to [`Renderable::render`].
///
/// - `focused`: whether the hosting window currently holds focus.
/// - `offscreen`: whether the frame is a snapshot capture rather than the
///   visible desktop.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderContext {
    focused: bool,
    offscreen: bool,
}

impl RenderContext {
    pub const fn new(focused: bool) -> Self {
        Self {
            focused,
            offscreen: false,
        }
    }

    pub const fn offscreen() -> Self {
        Self {
            focused: false,
            offscreen: true,
        }
    }

    pub const fn focused(&self) -> bool {
        self.focused
    }

    pub const fn is_offscreen(&self) -> bool {
        self.offscreen
    }
}

/// The single capability window content must offer.
pub trait Renderable {
    fn render(
        &mut self,
        frame: &mut UiFrame<'_>,
        area: Rect,
        ctx: &RenderContext,
    ) -> Result<(), ContentError>;
}

impl<F> Renderable for F
where
    F: FnMut(&mut UiFrame<'_>, Rect, &RenderContext) -> Result<(), ContentError>,
{
    fn render(
        &mut self,
        frame: &mut UiFrame<'_>,
        area: Rect,
        ctx: &RenderContext,
    ) -> Result<(), ContentError> {
        self(frame, area, ctx)
    }
}

/// Shared handle to caller-owned content. The caller may keep a clone.
pub type Content = Rc<RefCell<dyn Renderable>>;

pub fn content<T: Renderable + 'static>(value: T) -> Content {
    Rc::new(RefCell::new(value))
}

/// Render `content`, isolating errors, panics and re-entrant borrows.
pub fn render_guarded(
    content: &Content,
    frame: &mut UiFrame<'_>,
    area: Rect,
    ctx: &RenderContext,
) -> Result<(), ContentError> {
    let Ok(mut renderable) = content.try_borrow_mut() else {
        return Err(ContentError::Busy);
    };
    match panic::catch_unwind(AssertUnwindSafe(|| renderable.render(frame, area, ctx))) {
        Ok(result) => result,
        Err(payload) => Err(ContentError::Panicked(panic_message(payload.as_ref()))),
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "<non-string panic>".to_string()
    }
}
