//! Shared components for the motion-script generation pipeline.
//!
//! This crate holds the data model every other crate agrees on: bounding
//! boxes and trajectories, video frames, video metadata, frame/time
//! conversion and the bounded key-event queue that connects the operator's
//! keyboard to the tracking loop.

pub mod bounding_box;
pub mod frame;
pub mod keys;
pub mod timecode;
pub mod video_info;

pub use bounding_box::{BoundingBox, Trajectory};
pub use frame::Frame;
pub use keys::{KeyEvent, KeyQueue};
pub use video_info::VideoInfo;
