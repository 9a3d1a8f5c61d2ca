pub mod gamepad;
pub mod input;
pub mod sound;
