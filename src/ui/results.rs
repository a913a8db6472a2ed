/// Result screen: recommended tracks next to the detected image features

use std::collections::HashMap;

use iced::widget::{button, column, container, image, progress_bar, row, text};
use iced::{Alignment, Element, Length, Theme};
use iced_aw::Wrap;

use crate::api::models::{AnalysisResponse, ImageFeatures, Track};
use crate::Message;

/// Emotion intensities are reported on a 0..=5 scale
const EMOTION_SCALE: f32 = 5.0;

/// How many content labels the feature panel shows
const MAX_LABELS: usize = 5;

/// Artwork thumbnail edge length
const ARTWORK_SIZE: f32 = 96.0;

/// Full result layout: reset action, feature panel, recommendation list
pub fn view<'a>(
    response: &'a AnalysisResponse,
    preview: Option<&'a image::Handle>,
    artwork: &'a HashMap<String, image::Handle>,
    playing: Option<&'a str>,
) -> Element<'a, Message> {
    let columns = row![
        features_panel(&response.image_features, preview).width(Length::FillPortion(1)),
        recommendations(&response.recommendations, artwork, playing)
            .width(Length::FillPortion(2)),
    ]
    .spacing(24);

    column![
        button(text("< Upload Another Image").size(14))
            .on_press(Message::UploadAnother)
            .padding(8),
        columns,
    ]
    .spacing(16)
    .into()
}

/// Left column: uploaded image plus what the analysis saw in it
fn features_panel<'a>(
    features: &'a ImageFeatures,
    preview: Option<&'a image::Handle>,
) -> iced::widget::Column<'a, Message> {
    let mut panel = column![text("Your Image").size(18)].spacing(10);

    if let Some(handle) = preview {
        panel = panel.push(image(handle.clone()).width(Length::Fill));
    }

    panel = panel.push(text("Detected Features").size(16));

    if !features.labels.is_empty() {
        let tags = features
            .labels
            .iter()
            .take(MAX_LABELS)
            .map(|label| tag(&label.description))
            .collect();
        panel = panel.push(text("Content").size(13).style(super::muted));
        panel = panel.push(Wrap::with_elements(tags).spacing(6.0).line_spacing(6.0));
    }

    let moods = visible_emotions(features);
    if !moods.is_empty() {
        panel = panel.push(text("Mood").size(13).style(super::muted));
        for (emotion, intensity) in moods {
            panel = panel.push(
                row![
                    text(capitalize(emotion)).size(13).width(Length::Fixed(80.0)),
                    progress_bar(0.0..=EMOTION_SCALE, intensity)
                        .height(Length::Fixed(8.0)),
                ]
                .spacing(8)
                .align_y(Alignment::Center),
            );
        }
    }

    if !features.dominant_colors.is_empty() {
        let swatches = features
            .dominant_colors
            .iter()
            .map(|color| swatch(color.rgb.channels()))
            .collect();
        panel = panel.push(text("Colors").size(13).style(super::muted));
        panel = panel.push(Wrap::with_elements(swatches).spacing(4.0).line_spacing(4.0));
    }

    panel
}

/// Right column: the ranked track list, or the empty state
fn recommendations<'a>(
    tracks: &'a [Track],
    artwork: &'a HashMap<String, image::Handle>,
    playing: Option<&'a str>,
) -> iced::widget::Column<'a, Message> {
    if tracks.is_empty() {
        return column![card(
            column![
                text("Music Recommendations").size(18),
                text("No music recommendations found that match this image.")
                    .size(14)
                    .style(super::muted),
            ]
            .spacing(8)
            .into(),
        )];
    }

    let mut list = column![
        text("Recommended Music").size(18),
        text("Based on the mood, colors, and content of your image, here are some songs you might enjoy:")
            .size(14)
            .style(super::muted),
    ]
    .spacing(12);

    for track in tracks {
        list = list.push(track_row(track, artwork.get(&track.id), playing));
    }

    list
}

/// One recommendation: artwork, details, preview and external-link controls
fn track_row<'a>(
    track: &'a Track,
    artwork: Option<&'a image::Handle>,
    playing: Option<&'a str>,
) -> Element<'a, Message> {
    let art: Element<'a, Message> = match artwork {
        Some(handle) => image(handle.clone())
            .width(Length::Fixed(ARTWORK_SIZE))
            .height(Length::Fixed(ARTWORK_SIZE))
            .into(),
        None => artwork_placeholder(),
    };

    let mut details = column![
        text(&track.name).size(16),
        text(track.artist_line()).size(14),
        text(&track.album.name).size(12).style(super::muted),
    ]
    .spacing(2);

    if let Some(factors) = &track.match_factors {
        if !factors.genres.is_empty() {
            let tags = factors.genres.iter().map(|genre| tag(genre)).collect();
            details =
                details.push(Wrap::with_elements(tags).spacing(4.0).line_spacing(4.0));
        }
    }

    let is_playing = playing == Some(track.id.as_str());
    let preview_label = if is_playing { "Stop" } else { "Play" };
    let preview_button = button(text(preview_label).size(13))
        .on_press_maybe(
            track
                .preview_url
                .is_some()
                .then(|| Message::TogglePreview(track.id.clone())),
        )
        .padding(8);

    let mut controls = row![preview_button].spacing(8).align_y(Alignment::Center);

    if let Some(url) = &track.external_url {
        controls = controls.push(
            button(text("Open in Spotify").size(13))
                .on_press(Message::OpenExternal(url.clone()))
                .padding(8),
        );
    }

    card(
        row![art, details.width(Length::Fill), controls]
            .spacing(12)
            .align_y(Alignment::Center)
            .into(),
    )
    .into()
}

/// Fallback shown while artwork loads or when the album has none
fn artwork_placeholder() -> Element<'static, Message> {
    container(text("No artwork").size(11).style(super::muted))
        .width(Length::Fixed(ARTWORK_SIZE))
        .height(Length::Fixed(ARTWORK_SIZE))
        .center_x(Length::Fixed(ARTWORK_SIZE))
        .center_y(Length::Fixed(ARTWORK_SIZE))
        .style(weak_box)
        .into()
}

/// Rounded panel used for track rows and the empty state
fn card(content: Element<'_, Message>) -> iced::widget::Container<'_, Message> {
    container(content).width(Length::Fill).padding(12).style(weak_box)
}

/// Small rounded chip for labels and genres
fn tag(label: &str) -> Element<'_, Message> {
    container(text(label).size(12))
        .padding([2.0, 8.0])
        .style(weak_box)
        .into()
}

/// Solid color square for a dominant image color
fn swatch(channels: [u8; 3]) -> Element<'static, Message> {
    let [r, g, b] = channels;
    container(text(""))
        .width(Length::Fixed(18.0))
        .height(Length::Fixed(18.0))
        .style(move |_theme: &Theme| container::Style {
            background: Some(iced::Color::from_rgb8(r, g, b).into()),
            border: iced::Border {
                radius: 3.0.into(),
                ..iced::Border::default()
            },
            ..container::Style::default()
        })
        .into()
}

fn weak_box(theme: &Theme) -> container::Style {
    let palette = theme.extended_palette();
    container::Style {
        background: Some(palette.background.weak.color.into()),
        border: iced::Border {
            radius: 6.0.into(),
            ..iced::Border::default()
        },
        ..container::Style::default()
    }
}

/// Emotions worth a bar: anything with intensity above zero
fn visible_emotions(features: &ImageFeatures) -> Vec<(&str, f32)> {
    features
        .emotions
        .iter()
        .filter(|(_, intensity)| **intensity > 0.0)
        .map(|(emotion, intensity)| (emotion.as_str(), *intensity))
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
