pub mod controller;
pub mod manifest;

pub use controller::{CompletionMediaController, MediaMode, MediaState};
pub use manifest::MediaManifest;
