use serde::Serialize;

use crate::api::game::EngineContext;
use crate::api::types::{MediaCommand, VideoFit};
use crate::calendar::FestivalDay;
use crate::candles::CandleStateStore;
use crate::media::manifest::MediaManifest;

const NORMAL_RATE: f32 = 1.0;

/// What the background is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MediaMode {
    Image { day: Option<FestivalDay> },
    Video { day: FestivalDay },
}

/// Serializable view of the media layer for the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaState {
    #[serde(flatten)]
    pub mode: MediaMode,
    pub source: String,
    pub audio: Option<String>,
    pub fit: Option<VideoFit>,
    pub token: u32,
    pub paused: bool,
    pub rate: f32,
    /// The reset control is hidden while a video plays.
    pub reset_visible: bool,
}

/// Switches the background to the day's video the first time the day is
/// complete, and back to the still image otherwise.
///
/// Every video request carries a token. A load failure for the current
/// token falls back to the image and silences audio; failures for older
/// tokens (superseded by a reset or day change) are ignored.
#[derive(Debug)]
pub struct CompletionMediaController {
    manifest: MediaManifest,
    mode: MediaMode,
    token: u32,
    audio_playing: bool,
    paused: bool,
    rate: f32,
    slow_motion_rate: f32,
}

impl CompletionMediaController {
    pub fn new(manifest: MediaManifest, slow_motion_rate: f32) -> Self {
        Self {
            manifest,
            mode: MediaMode::Image { day: None },
            token: 0,
            audio_playing: false,
            paused: false,
            rate: NORMAL_RATE,
            slow_motion_rate,
        }
    }

    pub fn mode(&self) -> MediaMode {
        self.mode
    }

    pub fn token(&self) -> u32 {
        self.token
    }

    pub fn audio_playing(&self) -> bool {
        self.audio_playing
    }

    /// Announce the starting background unconditionally.
    pub fn show_initial(&mut self, ctx: &mut EngineContext, day: Option<FestivalDay>) {
        self.mode = MediaMode::Image { day };
        ctx.emit_media(MediaCommand::ShowImage { day });
    }

    /// Re-check completion after a candle lights or the day changes.
    pub fn evaluate(&mut self, ctx: &mut EngineContext, store: &mut CandleStateStore) {
        if store.completion_triggered() {
            return;
        }
        let day = store.day();
        match day.filter(|_| store.is_day_complete()) {
            Some(d) => {
                store.mark_completion_triggered();
                log::info!("day {} complete, starting video", d.get());
                self.enter_video(ctx, d);
            }
            None => self.show_image(ctx, day),
        }
    }

    /// Handle a load failure reported by the media layer.
    pub fn on_load_failed(&mut self, ctx: &mut EngineContext, token: u32) {
        let MediaMode::Video { day } = self.mode else {
            log::debug!("ignoring media failure {token}: not in video mode");
            return;
        };
        if token != self.token {
            log::debug!("ignoring stale media failure {token} (current {})", self.token);
            return;
        }
        log::warn!("video for day {} failed to load, falling back to image", day.get());
        self.show_image(ctx, Some(day));
    }

    /// Back to the day's image, cancelling any pending fallback.
    pub fn reset(&mut self, ctx: &mut EngineContext, day: Option<FestivalDay>) {
        self.token = self.token.wrapping_add(1);
        self.show_image(ctx, day);
    }

    pub fn toggle_playback(&mut self, ctx: &mut EngineContext) {
        if !matches!(self.mode, MediaMode::Video { .. }) {
            return;
        }
        self.paused = !self.paused;
        ctx.emit_media(if self.paused {
            MediaCommand::Pause
        } else {
            MediaCommand::Play
        });
    }

    pub fn toggle_slow_motion(&mut self, ctx: &mut EngineContext) {
        if !matches!(self.mode, MediaMode::Video { .. }) {
            return;
        }
        self.rate = if self.rate == NORMAL_RATE {
            self.slow_motion_rate
        } else {
            NORMAL_RATE
        };
        ctx.emit_media(MediaCommand::SetRate { rate: self.rate });
    }

    pub fn snapshot(&self) -> MediaState {
        let (source, audio, fit) = match self.mode {
            MediaMode::Image { day } => (self.manifest.image_path(day), None, None),
            MediaMode::Video { day } => (
                self.manifest.video_path(day),
                Some(self.manifest.audio.clone()),
                Some(self.manifest.fit_for(day)),
            ),
        };
        MediaState {
            mode: self.mode,
            source,
            audio: audio.filter(|_| self.audio_playing),
            fit,
            token: self.token,
            paused: self.paused,
            rate: self.rate,
            reset_visible: !matches!(self.mode, MediaMode::Video { .. }),
        }
    }

    fn enter_video(&mut self, ctx: &mut EngineContext, day: FestivalDay) {
        self.token = self.token.wrapping_add(1);
        self.mode = MediaMode::Video { day };
        self.paused = false;
        self.rate = NORMAL_RATE;
        self.audio_playing = true;
        ctx.emit_media(MediaCommand::ShowVideo {
            day,
            token: self.token,
            fit: self.manifest.fit_for(day),
        });
        ctx.emit_media(MediaCommand::StartAudio);
    }

    fn show_image(&mut self, ctx: &mut EngineContext, day: Option<FestivalDay>) {
        if self.audio_playing {
            self.audio_playing = false;
            ctx.emit_media(MediaCommand::StopAudio);
        }
        let target = MediaMode::Image { day };
        if self.mode == target {
            return;
        }
        self.mode = target;
        self.paused = false;
        self.rate = NORMAL_RATE;
        ctx.emit_media(MediaCommand::ShowImage { day });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn setup(day: u8) -> (CompletionMediaController, CandleStateStore, MemoryStore, EngineContext) {
        let mut kv = MemoryStore::new();
        let mut store = CandleStateStore::new("k");
        store.load(&mut kv, FestivalDay::new(day));
        store.light_igniter(&mut kv);
        let controller = CompletionMediaController::new(MediaManifest::default(), 0.5);
        (controller, store, kv, EngineContext::new())
    }

    fn video_count(ctx: &EngineContext) -> usize {
        ctx.media
            .iter()
            .filter(|c| matches!(c, MediaCommand::ShowVideo { .. }))
            .count()
    }

    #[test]
    fn incomplete_day_shows_image() {
        let (mut media, mut store, _kv, mut ctx) = setup(2);
        media.evaluate(&mut ctx, &mut store);
        assert_eq!(media.mode(), MediaMode::Image { day: FestivalDay::new(2) });
        assert!(!store.completion_triggered());
    }

    #[test]
    fn completion_triggers_video_once() {
        let (mut media, mut store, mut kv, mut ctx) = setup(1);
        store.light_candle(&mut kv, 8);
        media.evaluate(&mut ctx, &mut store);
        media.evaluate(&mut ctx, &mut store);
        assert_eq!(video_count(&ctx), 1);
        assert!(ctx.media.contains(&MediaCommand::StartAudio));
        assert_eq!(media.mode(), MediaMode::Video { day: FestivalDay::FIRST });
        assert!(!media.snapshot().reset_visible);
    }

    #[test]
    fn load_failure_falls_back_and_stays_triggered() {
        let (mut media, mut store, mut kv, mut ctx) = setup(1);
        store.light_candle(&mut kv, 8);
        media.evaluate(&mut ctx, &mut store);
        ctx.clear_frame_data();

        media.on_load_failed(&mut ctx, media.token());
        assert_eq!(media.mode(), MediaMode::Image { day: Some(FestivalDay::FIRST) });
        assert!(ctx.media.contains(&MediaCommand::StopAudio));
        assert!(!media.audio_playing());
        assert!(store.completion_triggered());

        media.evaluate(&mut ctx, &mut store);
        assert_eq!(video_count(&ctx), 0);
    }

    #[test]
    fn stale_failure_is_ignored() {
        let (mut media, mut store, mut kv, mut ctx) = setup(1);
        store.light_candle(&mut kv, 8);
        media.evaluate(&mut ctx, &mut store);
        let stale = media.token();
        media.reset(&mut ctx, store.day());
        store.clear_completion();
        media.evaluate(&mut ctx, &mut store);
        assert_eq!(media.mode(), MediaMode::Video { day: FestivalDay::FIRST });
        ctx.clear_frame_data();

        media.on_load_failed(&mut ctx, stale);
        assert_eq!(media.mode(), MediaMode::Video { day: FestivalDay::FIRST });
        assert!(ctx.media.is_empty());
    }

    #[test]
    fn playback_controls_only_in_video() {
        let (mut media, mut store, mut kv, mut ctx) = setup(1);
        media.toggle_playback(&mut ctx);
        media.toggle_slow_motion(&mut ctx);
        assert!(ctx.media.is_empty());

        store.light_candle(&mut kv, 8);
        media.evaluate(&mut ctx, &mut store);
        ctx.clear_frame_data();
        media.toggle_playback(&mut ctx);
        media.toggle_slow_motion(&mut ctx);
        media.toggle_slow_motion(&mut ctx);
        assert_eq!(
            ctx.media,
            vec![
                MediaCommand::Pause,
                MediaCommand::SetRate { rate: 0.5 },
                MediaCommand::SetRate { rate: 1.0 },
            ]
        );
        assert!(media.snapshot().paused);
    }

    #[test]
    fn snapshot_resolves_paths() {
        let (mut media, mut store, mut kv, mut ctx) = setup(1);
        assert_eq!(media.snapshot().source, "Images/Hanukkah 2022 AV.jpg");
        store.light_candle(&mut kv, 8);
        media.evaluate(&mut ctx, &mut store);
        let snap = media.snapshot();
        assert_eq!(snap.source, "Video/Day1.mp4");
        assert_eq!(snap.fit, Some(VideoFit::Contain));
        assert!(snap.audio.is_some());
    }
}
