use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use iced::widget::{column, container, image, scrollable};
use iced::{event, window, Element, Event, Length, Subscription, Task, Theme};

mod api;
mod config;
mod playback;
mod settings;
mod ui;
mod upload;

use api::{AnalysisClient, AnalysisResponse};
use playback::ToggleOutcome;
use settings::SettingsStore;

/// Top-level UI state: exactly one of these is ever active
#[derive(Debug)]
enum UiState {
    /// Waiting for the first upload
    Idle,
    /// An analysis request is in flight
    Loading,
    /// The last attempt failed; the user can immediately retry
    Error(String),
    /// Recommendations and features for the current image
    Result(AnalysisResponse),
}

/// Main application state
struct App {
    /// Current screen
    state: UiState,
    /// Preview of the uploaded image, dropped on reset or replacement
    preview: Option<image::Handle>,
    /// Album artwork fetched for the current result, by track ID
    artwork: HashMap<String, image::Handle>,
    /// Track whose preview clip is playing, if any
    playing: Option<String>,
    /// Token of the most recent upload; responses carrying an older
    /// token are discarded instead of overwriting newer state
    request_seq: u64,
    /// A file is hovering over the window (drop-zone highlight)
    drag_active: bool,
    /// Current theme flag, persisted on every toggle
    dark_mode: bool,
    /// Result of the startup health probe, None until it answers
    backend_healthy: Option<bool>,
    client: AnalysisClient,
    player: playback::Player,
    store: Box<dyn SettingsStore>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub(crate) enum Message {
    /// User clicked the browse button
    BrowseImage,
    /// User dropped a file onto the window
    FileDropped(PathBuf),
    /// A file is being dragged over the window
    DragEntered,
    /// The dragged file left the window
    DragLeft,
    /// Background file read finished
    ImageLoaded {
        seq: u64,
        result: Result<upload::LoadedImage, upload::ValidationError>,
    },
    /// The analysis request finished
    AnalysisFinished {
        seq: u64,
        result: Result<AnalysisResponse, api::Error>,
    },
    /// Album artwork arrived for a track of the current result
    ArtworkLoaded {
        seq: u64,
        track_id: String,
        result: Result<Vec<u8>, api::Error>,
    },
    /// User pressed a track's preview control
    TogglePreview(String),
    /// Preview clip bytes arrived
    PreviewFetched {
        track_id: String,
        result: Result<Vec<u8>, api::Error>,
    },
    /// Periodic check for a clip that played out
    PlaybackTick,
    /// User asked for the track's streaming-service page
    OpenExternal(String),
    /// User flipped the theme
    ToggleTheme,
    /// User discarded the current result
    UploadAnother,
    /// Startup health probe answered
    HealthChecked(bool),
}

impl App {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        Self::with_store(Box::new(settings::FileSettings::load_default()))
    }

    /// Create the application over an explicit settings store
    fn with_store(store: Box<dyn SettingsStore>) -> (Self, Task<Message>) {
        let dark_mode = settings::initial_dark_mode(store.as_ref());

        // If this fails the app cannot reach any backend at all
        let client = AnalysisClient::new(config::api_base_url())
            .expect("Failed to initialize HTTP client");

        tracing::info!(dark_mode, "Image to Music initialized");

        let app = App {
            state: UiState::Idle,
            preview: None,
            artwork: HashMap::new(),
            playing: None,
            request_seq: 0,
            drag_active: false,
            dark_mode,
            backend_healthy: None,
            client,
            player: playback::Player::new(),
            store,
        };

        // One-shot probe; the result only drives the footer indicator
        let probe = {
            let client = app.client.clone();
            Task::perform(
                async move { client.check_health().await },
                Message::HealthChecked,
            )
        };

        (app, probe)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::BrowseImage => match upload::pick_image() {
                Some(path) => self.start_upload(path),
                None => Task::none(),
            },
            Message::FileDropped(path) => self.start_upload(path),
            Message::DragEntered => {
                self.drag_active = true;
                Task::none()
            }
            Message::DragLeft => {
                self.drag_active = false;
                Task::none()
            }
            Message::ImageLoaded { seq, result } => {
                if !self.is_current_request(seq) {
                    return Task::none();
                }
                match result {
                    Ok(loaded) => {
                        self.preview = Some(image::Handle::from_bytes(loaded.bytes.clone()));
                        let client = self.client.clone();
                        let upload::LoadedImage {
                            file_name,
                            mime,
                            bytes,
                        } = loaded;
                        Task::perform(
                            async move { client.analyze(file_name, mime, bytes).await },
                            move |result| Message::AnalysisFinished { seq, result },
                        )
                    }
                    Err(err) => {
                        self.state = UiState::Error(err.to_string());
                        Task::none()
                    }
                }
            }
            Message::AnalysisFinished { seq, result } => {
                if !self.is_current_request(seq) {
                    tracing::debug!(seq, "Discarding superseded analysis response");
                    return Task::none();
                }
                match result {
                    Ok(response) if response.success => {
                        let artwork_fetches = self.fetch_artwork(seq, &response);
                        self.state = UiState::Result(response);
                        artwork_fetches
                    }
                    Ok(_) => {
                        self.state = UiState::Error(api::Error::Unexpected.to_string());
                        Task::none()
                    }
                    Err(err) => {
                        self.state = UiState::Error(err.to_string());
                        Task::none()
                    }
                }
            }
            Message::ArtworkLoaded {
                seq,
                track_id,
                result,
            } => {
                if seq == self.request_seq {
                    match result {
                        Ok(bytes) => {
                            self.artwork
                                .insert(track_id, image::Handle::from_bytes(bytes));
                        }
                        Err(err) => {
                            tracing::debug!(track_id = %track_id, error = %err, "Artwork fetch failed");
                        }
                    }
                }
                Task::none()
            }
            Message::TogglePreview(track_id) => self.toggle_preview(track_id),
            Message::PreviewFetched { track_id, result } => {
                // The user may have toggled away while the clip downloaded
                if self.playing.as_deref() != Some(track_id.as_str()) {
                    return Task::none();
                }
                match result {
                    Ok(bytes) => {
                        if !self.player.play(bytes) {
                            self.playing = None;
                        }
                    }
                    Err(err) => {
                        tracing::warn!(track_id = %track_id, error = %err, "Preview fetch failed");
                        self.playing = None;
                    }
                }
                Task::none()
            }
            Message::PlaybackTick => {
                if self.playing.is_some() && self.player.has_clip() && self.player.finished() {
                    self.playing = None;
                }
                Task::none()
            }
            Message::OpenExternal(url) => {
                // The page opens in the OS browser; it gets no handle back
                // into this process
                if let Err(err) = open::that(&url) {
                    tracing::warn!(url = %url, error = %err, "Could not open external link");
                }
                Task::none()
            }
            Message::ToggleTheme => {
                self.dark_mode = !self.dark_mode;
                settings::persist_dark_mode(self.store.as_mut(), self.dark_mode);
                Task::none()
            }
            Message::UploadAnother => {
                self.reset_result();
                Task::none()
            }
            Message::HealthChecked(healthy) => {
                if !healthy {
                    tracing::warn!("Analysis backend is unreachable");
                }
                self.backend_healthy = Some(healthy);
                Task::none()
            }
        }
    }

    /// Validate a candidate file and, if it passes, kick off the pipeline:
    /// clear stale state, read bytes, then upload
    fn start_upload(&mut self, path: PathBuf) -> Task<Message> {
        self.drag_active = false;

        let candidate = match upload::validate::inspect(&path) {
            Ok(candidate) => candidate,
            Err(err) => {
                // Rejected before any bytes are read or sent
                self.stop_playback();
                self.state = UiState::Error(err.to_string());
                return Task::none();
            }
        };

        // Supersede whatever was showing or in flight
        self.request_seq += 1;
        let seq = self.request_seq;
        self.stop_playback();
        self.preview = None;
        self.artwork.clear();
        self.state = UiState::Loading;

        tracing::info!(
            file = %candidate.file_name,
            size = candidate.size_bytes,
            "Starting image analysis"
        );

        Task::perform(upload::load(candidate), move |result| Message::ImageLoaded {
            seq,
            result,
        })
    }

    /// A response may only be applied while its request is still the
    /// newest one and the app is still waiting for it
    fn is_current_request(&self, seq: u64) -> bool {
        seq == self.request_seq && matches!(self.state, UiState::Loading)
    }

    fn toggle_preview(&mut self, track_id: String) -> Task<Message> {
        let preview_url = match &self.state {
            UiState::Result(response) => response
                .recommendations
                .iter()
                .find(|track| track.id == track_id)
                .and_then(|track| track.preview_url.clone()),
            _ => None,
        };

        match playback::toggle(self.playing.as_deref(), &track_id, preview_url.as_deref()) {
            ToggleOutcome::Stop => {
                self.stop_playback();
                Task::none()
            }
            ToggleOutcome::Ignore => Task::none(),
            ToggleOutcome::Start(url) => {
                // Whatever was playing stops right away
                self.player.stop();
                self.playing = Some(track_id.clone());
                let client = self.client.clone();
                Task::perform(
                    async move { client.fetch_bytes(url).await },
                    move |result| Message::PreviewFetched {
                        track_id: track_id.clone(),
                        result,
                    },
                )
            }
        }
    }

    /// Fire one artwork fetch per track that has a cover URL
    fn fetch_artwork(&self, seq: u64, response: &AnalysisResponse) -> Task<Message> {
        let mut fetches = Vec::new();

        for track in &response.recommendations {
            if let Some(url) = &track.album.image_url {
                let client = self.client.clone();
                let url = url.clone();
                let track_id = track.id.clone();
                fetches.push(Task::perform(
                    async move { client.fetch_bytes(url).await },
                    move |result| Message::ArtworkLoaded {
                        seq,
                        track_id: track_id.clone(),
                        result,
                    },
                ));
            }
        }

        Task::batch(fetches)
    }

    fn stop_playback(&mut self) {
        self.player.stop();
        self.playing = None;
    }

    /// Back to the upload screen, discarding the preview and artwork
    fn reset_result(&mut self) {
        // Bump the token so anything still in flight lands dead
        self.request_seq += 1;
        self.stop_playback();
        self.preview = None;
        self.artwork.clear();
        self.state = UiState::Idle;
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let body: Element<Message> = match &self.state {
            UiState::Idle => self.upload_screen(None, false),
            UiState::Loading => self.upload_screen(None, true),
            UiState::Error(message) => self.upload_screen(Some(message.as_str()), false),
            UiState::Result(response) => ui::results::view(
                response,
                self.preview.as_ref(),
                &self.artwork,
                self.playing.as_deref(),
            ),
        };

        column![
            ui::header(self.dark_mode),
            scrollable(container(body).width(Length::Fill).padding(20)).height(Length::Fill),
            ui::footer(self.backend_healthy),
        ]
        .into()
    }

    fn upload_screen<'a>(&self, error: Option<&'a str>, loading: bool) -> Element<'a, Message> {
        let mut screen = column![ui::uploader::drop_zone(self.drag_active)]
            .spacing(16)
            .max_width(720);

        if let Some(message) = error {
            screen = screen.push(ui::uploader::error_banner(message));
        }
        if loading {
            screen = screen.push(ui::uploader::loading_indicator());
        }

        container(screen)
            .width(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        if self.dark_mode {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    /// Window-level file events, plus a tick while a preview plays
    fn subscription(&self) -> Subscription<Message> {
        let files = event::listen_with(|event, _status, _window| match event {
            Event::Window(window::Event::FileDropped(path)) => {
                Some(Message::FileDropped(path))
            }
            Event::Window(window::Event::FileHovered(_)) => Some(Message::DragEntered),
            Event::Window(window::Event::FilesHoveredLeft) => Some(Message::DragLeft),
            _ => None,
        });

        if self.playing.is_some() {
            Subscription::batch([
                files,
                iced::time::every(Duration::from_millis(500)).map(|_| Message::PlaybackTick),
            ])
        } else {
            files
        }
    }
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    iced::application("Image to Music", App::update, App::view)
        .subscription(App::subscription)
        .theme(App::theme)
        .centered()
        .run_with(App::new)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Write;

    use super::*;
    use crate::api::models::{Album, Artist, ImageFeatures, Track};
    use crate::settings::MemorySettings;

    fn test_app() -> App {
        let (app, _task) = App::with_store(Box::<MemorySettings>::default());
        app
    }

    fn test_app_with_store(store: MemorySettings) -> App {
        let (app, _task) = App::with_store(Box::new(store));
        app
    }

    /// A file that passes validation (extension decides the MIME type)
    fn temp_image(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("photo.png");
        fs::File::create(&path)
            .unwrap()
            .write_all(b"png-ish bytes")
            .unwrap();
        path
    }

    fn track(id: &str, preview_url: Option<&str>) -> Track {
        Track {
            id: id.to_string(),
            name: format!("Song {id}"),
            artists: vec![Artist {
                name: "Artist X".to_string(),
            }],
            album: Album {
                name: "Album Y".to_string(),
                image_url: None,
            },
            preview_url: preview_url.map(str::to_string),
            external_url: None,
            match_factors: None,
        }
    }

    fn response(tracks: Vec<Track>) -> AnalysisResponse {
        AnalysisResponse {
            success: true,
            image_features: ImageFeatures {
                labels: Vec::new(),
                emotions: Default::default(),
                dominant_colors: Vec::new(),
            },
            recommendations: tracks,
        }
    }

    #[test]
    fn test_invalid_type_rejected_without_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "plain text").unwrap();

        let mut app = test_app();
        let _ = app.update(Message::FileDropped(path));

        // No request token was minted, so nothing went out
        assert_eq!(app.request_seq, 0);
        assert!(
            matches!(&app.state, UiState::Error(msg) if msg == "Please upload an image file (JPEG, PNG, etc.)")
        );
    }

    #[test]
    fn test_oversized_file_rejected_without_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.jpg");
        let file = fs::File::create(&path).unwrap();
        file.set_len(6 * 1024 * 1024).unwrap();

        let mut app = test_app();
        let _ = app.update(Message::FileDropped(path));

        assert_eq!(app.request_seq, 0);
        assert!(
            matches!(&app.state, UiState::Error(msg) if msg == "Image size should be less than 5MB")
        );
    }

    #[test]
    fn test_valid_upload_clears_previous_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app();
        app.state = UiState::Error("old failure".to_string());

        let _ = app.update(Message::FileDropped(temp_image(&dir)));

        assert!(matches!(app.state, UiState::Loading));
        assert_eq!(app.request_seq, 1);
    }

    #[test]
    fn test_valid_upload_clears_previous_result() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app();
        app.state = UiState::Result(response(vec![track("t1", None)]));

        let _ = app.update(Message::FileDropped(temp_image(&dir)));

        assert!(matches!(app.state, UiState::Loading));
        assert!(app.preview.is_none());
        assert!(app.artwork.is_empty());
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app();

        // Two uploads back to back; the second supersedes the first
        let _ = app.update(Message::FileDropped(temp_image(&dir)));
        let _ = app.update(Message::FileDropped(temp_image(&dir)));
        assert_eq!(app.request_seq, 2);

        // The slow first response arrives; it must not be applied
        let _ = app.update(Message::AnalysisFinished {
            seq: 1,
            result: Ok(response(vec![track("stale", None)])),
        });
        assert!(matches!(app.state, UiState::Loading));

        // The second request's response wins
        let _ = app.update(Message::AnalysisFinished {
            seq: 2,
            result: Ok(response(vec![track("fresh", None)])),
        });
        match &app.state {
            UiState::Result(result) => {
                assert_eq!(result.recommendations[0].id, "fresh");
            }
            other => panic!("expected result state, got {other:?}"),
        }
    }

    #[test]
    fn test_analysis_failure_shows_message_and_allows_retry() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app();

        let _ = app.update(Message::FileDropped(temp_image(&dir)));
        let _ = app.update(Message::AnalysisFinished {
            seq: 1,
            result: Err(api::Error::Connection),
        });

        assert!(matches!(
            &app.state,
            UiState::Error(msg) if msg == "No response from server. Please check your internet connection."
        ));

        // Retrying is a plain new upload
        let _ = app.update(Message::FileDropped(temp_image(&dir)));
        assert!(matches!(app.state, UiState::Loading));
        assert_eq!(app.request_seq, 2);
    }

    #[test]
    fn test_server_error_message_surfaced_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app();

        let _ = app.update(Message::FileDropped(temp_image(&dir)));
        let _ = app.update(Message::AnalysisFinished {
            seq: 1,
            result: Err(api::Error::Server("No image provided".to_string())),
        });

        assert!(matches!(&app.state, UiState::Error(msg) if msg == "No image provided"));
    }

    #[test]
    fn test_upload_another_resets_everything() {
        let mut app = test_app();
        app.request_seq = 3;
        app.state = UiState::Result(response(vec![track("t1", None)]));
        app.playing = Some("t1".to_string());

        let _ = app.update(Message::UploadAnother);

        assert!(matches!(app.state, UiState::Idle));
        assert!(app.preview.is_none());
        assert!(app.artwork.is_empty());
        assert!(app.playing.is_none());
        // Token bumped so anything still in flight lands dead
        assert_eq!(app.request_seq, 4);
    }

    #[test]
    fn test_preview_playback_is_mutually_exclusive() {
        let mut app = test_app();
        app.state = UiState::Result(response(vec![
            track("a", Some("https://p.scdn.co/a")),
            track("b", Some("https://p.scdn.co/b")),
        ]));

        let _ = app.update(Message::TogglePreview("a".to_string()));
        assert_eq!(app.playing.as_deref(), Some("a"));

        // Activating B replaces A; at no point are both marked playing
        let _ = app.update(Message::TogglePreview("b".to_string()));
        assert_eq!(app.playing.as_deref(), Some("b"));

        // Pressing the playing track again stops it
        let _ = app.update(Message::TogglePreview("b".to_string()));
        assert!(app.playing.is_none());
    }

    #[test]
    fn test_track_without_preview_cannot_start_playback() {
        let mut app = test_app();
        app.state = UiState::Result(response(vec![track("a", None)]));

        let _ = app.update(Message::TogglePreview("a".to_string()));
        assert!(app.playing.is_none());
    }

    #[test]
    fn test_stale_preview_bytes_are_not_played() {
        let mut app = test_app();
        app.state = UiState::Result(response(vec![track("a", Some("https://p.scdn.co/a"))]));

        let _ = app.update(Message::TogglePreview("a".to_string()));
        let _ = app.update(Message::TogglePreview("a".to_string()));
        assert!(app.playing.is_none());

        // The fetch started by the first toggle resolves after the stop
        let _ = app.update(Message::PreviewFetched {
            track_id: "a".to_string(),
            result: Ok(vec![0u8; 16]),
        });
        assert!(app.playing.is_none());
        assert!(!app.player.has_clip());
    }

    #[test]
    fn test_theme_toggle_flips_and_persists() {
        let mut store = MemorySettings::default();
        store.set(settings::DARK_MODE_KEY, "false");
        let mut app = test_app_with_store(store);
        assert!(!app.dark_mode);

        let _ = app.update(Message::ToggleTheme);
        assert!(app.dark_mode);
        assert_eq!(
            app.store.get(settings::DARK_MODE_KEY).as_deref(),
            Some("true")
        );

        let _ = app.update(Message::ToggleTheme);
        assert!(!app.dark_mode);
        assert_eq!(
            app.store.get(settings::DARK_MODE_KEY).as_deref(),
            Some("false")
        );
    }

    #[test]
    fn test_stored_theme_wins_on_startup() {
        let mut store = MemorySettings::default();
        store.set(settings::DARK_MODE_KEY, "true");
        let app = test_app_with_store(store);
        assert!(app.dark_mode);
    }

    #[test]
    fn test_health_probe_result_recorded() {
        let mut app = test_app();
        assert_eq!(app.backend_healthy, None);

        let _ = app.update(Message::HealthChecked(false));
        assert_eq!(app.backend_healthy, Some(false));
    }

    #[test]
    fn test_artwork_from_superseded_result_is_ignored() {
        let mut app = test_app();
        app.request_seq = 2;
        app.state = UiState::Result(response(vec![track("t1", None)]));

        let _ = app.update(Message::ArtworkLoaded {
            seq: 1,
            track_id: "t1".to_string(),
            result: Ok(vec![0u8; 16]),
        });
        assert!(app.artwork.is_empty());

        let _ = app.update(Message::ArtworkLoaded {
            seq: 2,
            track_id: "t1".to_string(),
            result: Ok(vec![0u8; 16]),
        });
        assert!(app.artwork.contains_key("t1"));
    }
}
