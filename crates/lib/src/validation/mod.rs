//! Validation recording: the path-addressed currency of form validity.
//!
//! Validation flows bottom-up through a laid-out form: leaf field validity,
//! occurrence validity, set and option-set validity, form validity. Each
//! level produces a [`ValidationRecording`], merges its children's
//! recordings into it, and compares the result against the recording it
//! produced last time — notification happens only on change. See
//! [`crate::view`] for the propagation machinery.

pub mod path;
pub mod recording;

pub use path::ValidationRecordingPath;
pub use recording::ValidationRecording;
