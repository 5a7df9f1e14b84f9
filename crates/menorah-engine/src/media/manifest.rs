use serde::{Deserialize, Serialize};

use crate::api::types::VideoFit;
use crate::calendar::FestivalDay;

/// Background media assets. Path templates substitute `{day}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaManifest {
    /// Still shown outside the festival.
    pub default_image: String,
    pub day_image: String,
    pub day_video: String,
    /// Music that accompanies every video.
    pub audio: String,
    /// Days whose footage is portrait and must be letterboxed.
    pub portrait_days: Vec<u8>,
}

impl Default for MediaManifest {
    fn default() -> Self {
        Self {
            default_image: "Images/Hanukkah 2022 AV.jpg".into(),
            day_image: "Images/day{day}.jpg".into(),
            day_video: "Video/Day{day}.mp4".into(),
            audio: "Music/Hanukkah song by English.mp3".into(),
            portrait_days: vec![1],
        }
    }
}

impl MediaManifest {
    pub fn image_path(&self, day: Option<FestivalDay>) -> String {
        match day {
            Some(d) => expand(&self.day_image, d),
            None => self.default_image.clone(),
        }
    }

    pub fn video_path(&self, day: FestivalDay) -> String {
        expand(&self.day_video, day)
    }

    pub fn fit_for(&self, day: FestivalDay) -> VideoFit {
        if self.portrait_days.contains(&day.get()) {
            VideoFit::Contain
        } else {
            VideoFit::Cover
        }
    }
}

fn expand(template: &str, day: FestivalDay) -> String {
    template.replace("{day}", &day.get().to_string())
}
