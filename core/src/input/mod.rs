//! Device input: events, binding contexts and the priority stack

mod bindings;
mod context;
mod device;
mod event;
pub mod keycode_serde;
mod stack;
mod translate;

pub use bindings::{InputConfig, KeyBindings};
pub use context::{CommandFactory, InputContext};
pub use device::{DeviceState, KeyboardState, MouseState};
pub use event::{InputEvent, InputEventKind, Modifiers};
pub use stack::InputContextStack;
pub use translate::EventTranslator;

pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;
