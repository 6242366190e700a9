//! `requestAnimationFrame` as a [`FrameScheduler`].

use clique_core::FrameScheduler;
use gloo_render::{AnimationFrame, request_animation_frame};

/// Schedules on the browser's refresh. Dropping the returned handle cancels
/// the request, so holders keep it until the frame fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct RafScheduler;

impl FrameScheduler for RafScheduler {
    type Handle = AnimationFrame;

    fn request_frame(&self, callback: Box<dyn FnOnce()>) -> Option<AnimationFrame> {
        // Workers and detached contexts have no window to paint.
        web_sys::window()?;
        Some(request_animation_frame(move |_timestamp| callback()))
    }

    fn cancel_frame(&self, handle: AnimationFrame) {
        drop(handle);
    }
}
