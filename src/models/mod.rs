//! Data models for chord assignments and device settings.
//!
//! These types know nothing about the binary layout; the codec in
//! [`crate::cfg`] and the text format in [`crate::parser`] both build on them.

pub mod assignment;
pub mod key_press;
pub mod settings;
pub mod twiddle;

// Re-export all model types
pub use assignment::{Assignment, Assignments, Remap};
pub use key_press::{KeyPress, KeyPressList};
pub use settings::{IntSetting, Settings, ENABLE_REPEAT_NAME, ENABLE_STORAGE_NAME};
pub use twiddle::{Thumb, Twiddle, FINGER_COUNT};
