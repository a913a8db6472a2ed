/// UI building blocks
///
/// Pure view functions only: every function maps state to widgets and
/// emits `Message`s. No module here mutates anything.
///
/// - uploader.rs: drop zone, error banner, loading indicator
/// - results.rs: recommendation list and the detected-features panel

pub mod results;
pub mod uploader;

use iced::widget::{button, column, horizontal_space, row, text};
use iced::{Alignment, Element, Theme};

use crate::Message;

/// App header: title, subtitle and the theme toggle
pub fn header(dark_mode: bool) -> Element<'static, Message> {
    let toggle_label = if dark_mode { "Light Mode" } else { "Dark Mode" };

    row![
        column![
            text("Image to Music").size(28),
            text("Upload any image and discover music that matches its mood and content")
                .size(14)
                .style(muted),
        ]
        .spacing(4),
        horizontal_space(),
        button(text(toggle_label).size(14))
            .on_press(Message::ToggleTheme)
            .padding(8),
    ]
    .align_y(Alignment::Center)
    .padding(20)
    .into()
}

/// App footer, including the backend health indicator
pub fn footer(backend_healthy: Option<bool>) -> Element<'static, Message> {
    let mut lines = column![
        text("Image to Music Recommendation App").size(12).style(muted),
        text("Powered by Google Cloud Vision API and Spotify API")
            .size(12)
            .style(muted),
    ]
    .spacing(2)
    .align_x(Alignment::Center);

    if backend_healthy == Some(false) {
        lines = lines.push(
            text("Analysis service is unreachable. Uploads will fail until it is back online.")
                .size(12)
                .style(|theme: &Theme| text::Style {
                    color: Some(theme.extended_palette().danger.base.color),
                }),
        );
    }

    iced::widget::container(lines)
        .width(iced::Length::Fill)
        .center_x(iced::Length::Fill)
        .padding(16)
        .into()
}

/// Dimmed text for secondary copy
pub(crate) fn muted(theme: &Theme) -> text::Style {
    text::Style {
        color: Some(theme.extended_palette().background.base.text.scale_alpha(0.7)),
    }
}
