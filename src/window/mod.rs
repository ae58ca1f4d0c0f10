pub mod platform;
pub mod input;

pub use platform::{GlutinPlatform, GlutinWindow};
pub use input::InputState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// A presentable window with a current GL context.
pub trait Surface {
    /// Framebuffer size in physical pixels.
    fn size(&self) -> (u32, u32);
    fn should_close(&self) -> bool;
    fn request_close(&mut self);
    /// Drains pending window events without blocking.
    fn poll_events(&mut self);
    /// Latest framebuffer size reported since the previous call, if any.
    fn take_resize(&mut self) -> Option<(u32, u32)>;
    fn key_state(&self, key: Key) -> KeyState;
    fn swap_buffers(&mut self) -> anyhow::Result<()>;
}
