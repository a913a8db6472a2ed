/// Upload screen: the drop zone plus its error and loading companions

use iced::widget::{button, column, container, text};
use iced::{Alignment, Border, Element, Length, Theme};

use crate::Message;

/// The drag-and-drop target with the file-picker fallback
///
/// `drag_active` switches the border to the accent color while a file is
/// hovering over the window.
pub fn drop_zone(drag_active: bool) -> Element<'static, Message> {
    let heading = if drag_active {
        "Drop your image here"
    } else {
        "Drag & drop your image here"
    };

    let content = column![
        text(heading).size(18),
        button(text("or click to browse from your device").size(14))
            .on_press(Message::BrowseImage)
            .padding(8),
        text("Supported formats: JPEG, PNG, GIF, WebP (max 5MB)")
            .size(12)
            .style(super::muted),
    ]
    .spacing(12)
    .align_x(Alignment::Center);

    let zone = container(content)
        .width(Length::Fill)
        .padding(40)
        .center_x(Length::Fill)
        .style(move |theme: &Theme| {
            let palette = theme.extended_palette();
            let border_color = if drag_active {
                palette.primary.strong.color
            } else {
                palette.background.strong.color
            };
            container::Style {
                border: Border {
                    color: border_color,
                    width: 2.0,
                    radius: 8.0.into(),
                },
                ..container::Style::default()
            }
        });

    column![
        zone,
        text("Your image will be processed to extract colors, objects, and mood to find matching music.")
            .size(13)
            .style(super::muted),
    ]
    .spacing(12)
    .align_x(Alignment::Center)
    .into()
}

/// Inline error banner shown under the drop zone
pub fn error_banner(message: &str) -> Element<'_, Message> {
    container(
        column![text("Error").size(14), text(message).size(14)].spacing(4),
    )
    .width(Length::Fill)
    .padding(12)
    .style(|theme: &Theme| {
        let palette = theme.extended_palette();
        container::Style {
            text_color: Some(palette.danger.base.color),
            border: Border {
                color: palette.danger.base.color,
                width: 1.0,
                radius: 6.0.into(),
            },
            ..container::Style::default()
        }
    })
    .into()
}

/// Progress note while a request is in flight
pub fn loading_indicator() -> Element<'static, Message> {
    container(
        text("Analyzing your image and finding matching music...")
            .size(14)
            .style(super::muted),
    )
    .width(Length::Fill)
    .center_x(Length::Fill)
    .padding(24)
    .into()
}
