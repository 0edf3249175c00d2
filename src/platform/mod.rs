//! Platform abstraction layer
//!
//! The host only needs a handful of things from its environment:
//! - Attaching and detaching input listeners
//! - Requesting and cancelling the next frame callback
//!
//! The browser implementation lives in `web`; `HeadlessPlatform` drives the
//! native binary and tests.

#[cfg(target_arch = "wasm32")]
pub mod web;

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::ArenaError;

/// Token for one pending frame request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i64);

/// Environment services used by the simulation host
pub trait Platform {
    fn attach_listeners(&mut self) -> Result<(), ArenaError>;
    /// Remove every listener added by `attach_listeners`; safe to repeat
    fn detach_listeners(&mut self);
    fn request_frame(&mut self) -> Option<FrameHandle>;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Observable state of a headless platform
#[derive(Debug, Default)]
pub struct HeadlessState {
    pub listeners_attached: bool,
    pub attach_calls: u32,
    pub detach_calls: u32,
    pub pending_frame: Option<FrameHandle>,
    pub frames_requested: u64,
    pub frames_cancelled: u64,
    next_handle: i64,
}

/// Platform without a window; frames fire when the driver says so.
///
/// Clones share state, so a driver can keep one clone and hand the other to
/// the host.
#[derive(Debug, Clone, Default)]
pub struct HeadlessPlatform {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame_pending(&self) -> bool {
        self.state.borrow().pending_frame.is_some()
    }

    pub fn listeners_attached(&self) -> bool {
        self.state.borrow().listeners_attached
    }

    /// Consume the pending frame request, as the display would when firing it
    pub fn take_frame(&self) -> Option<FrameHandle> {
        self.state.borrow_mut().pending_frame.take()
    }

    pub fn state(&self) -> std::cell::Ref<'_, HeadlessState> {
        self.state.borrow()
    }
}

impl Platform for HeadlessPlatform {
    fn attach_listeners(&mut self) -> Result<(), ArenaError> {
        let mut state = self.state.borrow_mut();
        state.listeners_attached = true;
        state.attach_calls += 1;
        Ok(())
    }

    fn detach_listeners(&mut self) {
        let mut state = self.state.borrow_mut();
        state.listeners_attached = false;
        state.detach_calls += 1;
    }

    fn request_frame(&mut self) -> Option<FrameHandle> {
        let mut state = self.state.borrow_mut();
        state.next_handle += 1;
        let handle = FrameHandle(state.next_handle);
        state.pending_frame = Some(handle);
        state.frames_requested += 1;
        Some(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut state = self.state.borrow_mut();
        if state.pending_frame == Some(handle) {
            state.pending_frame = None;
            state.frames_cancelled += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_only_matching_handle() {
        let mut platform = HeadlessPlatform::new();
        let first = platform.request_frame().unwrap();
        let second = platform.request_frame().unwrap();
        assert_ne!(first, second);

        platform.cancel_frame(first);
        assert!(platform.frame_pending());
        platform.cancel_frame(second);
        assert!(!platform.frame_pending());
        assert_eq!(platform.state().frames_cancelled, 1);
    }

    #[test]
    fn test_clones_share_state() {
        let observer = HeadlessPlatform::new();
        let mut platform = observer.clone();
        platform.attach_listeners().unwrap();
        assert!(observer.listeners_attached());
        platform.detach_listeners();
        assert!(!observer.listeners_attached());
    }
}
