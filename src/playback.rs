/// Audio preview playback
///
/// At most one preview plays at a time. The decision of what a play/stop
/// toggle means lives in `toggle`, a pure function over the current state,
/// so the exclusion rule is testable without an audio device. `Player` is
/// the thin layer that actually makes noise.

use std::io::Cursor;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

/// What pressing a track's preview control should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The pressed track is the one playing: stop it
    Stop,
    /// Fetch this clip and play it (stopping whatever else plays)
    Start(String),
    /// Track has no preview clip; nothing to do
    Ignore,
}

/// Toggle semantics for a preview control press
pub fn toggle(
    playing: Option<&str>,
    track_id: &str,
    preview_url: Option<&str>,
) -> ToggleOutcome {
    if playing == Some(track_id) {
        return ToggleOutcome::Stop;
    }

    match preview_url {
        Some(url) => ToggleOutcome::Start(url.to_string()),
        None => ToggleOutcome::Ignore,
    }
}

/// Plays one fetched clip at a time through the default audio output
///
/// The output stream is opened lazily on first playback and kept for the
/// lifetime of the app. Machines without an audio device (CI, headless)
/// simply never get a stream; playback calls degrade to no-ops.
pub struct Player {
    output: Option<(OutputStream, OutputStreamHandle)>,
    sink: Option<Sink>,
}

impl Player {
    pub fn new() -> Self {
        Self {
            output: None,
            sink: None,
        }
    }

    /// Decode and play a clip, stopping any current one first
    ///
    /// Returns false when the device or the clip is unusable.
    pub fn play(&mut self, bytes: Vec<u8>) -> bool {
        self.stop();

        if self.output.is_none() {
            match OutputStream::try_default() {
                Ok(pair) => self.output = Some(pair),
                Err(err) => {
                    tracing::warn!(error = %err, "No audio output available");
                    return false;
                }
            }
        }

        let Some((_, handle)) = self.output.as_ref() else {
            return false;
        };

        let source = match Decoder::new(Cursor::new(bytes)) {
            Ok(source) => source,
            Err(err) => {
                tracing::warn!(error = %err, "Could not decode preview clip");
                return false;
            }
        };

        let sink = match Sink::try_new(handle) {
            Ok(sink) => sink,
            Err(err) => {
                tracing::warn!(error = %err, "Could not open audio sink");
                return false;
            }
        };

        sink.append(source);
        self.sink = Some(sink);
        true
    }

    /// Stop and discard the current clip, if any
    pub fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    /// True while a clip is loaded, playing or not
    pub fn has_clip(&self) -> bool {
        self.sink.is_some()
    }

    /// True once the current clip has played out (or none is loaded)
    pub fn finished(&self) -> bool {
        self.sink.as_ref().map_or(true, |sink| sink.empty())
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("has_output", &self.output.is_some())
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLIP: &str = "https://p.scdn.co/mp3-preview/abc";

    #[test]
    fn test_idle_press_starts_playback() {
        assert_eq!(
            toggle(None, "t1", Some(CLIP)),
            ToggleOutcome::Start(CLIP.to_string())
        );
    }

    #[test]
    fn test_pressing_playing_track_stops_it() {
        assert_eq!(toggle(Some("t1"), "t1", Some(CLIP)), ToggleOutcome::Stop);
    }

    #[test]
    fn test_pressing_other_track_switches() {
        // Track B starts; the caller replaces A with B as the playing track
        assert_eq!(
            toggle(Some("t1"), "t2", Some(CLIP)),
            ToggleOutcome::Start(CLIP.to_string())
        );
    }

    #[test]
    fn test_track_without_preview_is_inert() {
        assert_eq!(toggle(None, "t1", None), ToggleOutcome::Ignore);
        assert_eq!(toggle(Some("t2"), "t1", None), ToggleOutcome::Ignore);
    }
}
