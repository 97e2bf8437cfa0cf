use iced::keyboard::key::Named;
use iced::keyboard::Key;
use iced::widget::image::Handle;
use iced::widget::{column, container, text, Image};
use iced::{ContentFit, Element, Length};

use crate::review::Panel;
use crate::state::data::KeyPress;

/// A panel converted into something the image widget can draw
#[derive(Debug, Clone)]
pub struct PanelView {
    pub title: String,
    pub handle: Handle,
}

impl From<Panel> for PanelView {
    fn from(panel: Panel) -> Self {
        let (width, height) = panel.image.dimensions();
        Self {
            title: panel.title,
            handle: Handle::from_rgba(width, height, panel.image.into_raw()),
        }
    }
}

/// Titled viewport for one panel
pub fn panel<'a, Message: 'a>(view: &'a PanelView) -> Element<'a, Message> {
    container(
        column![
            text(&view.title).size(18),
            Image::new(view.handle.clone())
                .content_fit(ContentFit::Contain)
                .width(Length::Fill)
                .height(Length::Fill),
        ]
        .spacing(8),
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .padding(10)
    .into()
}

/// Translate a window key event into a review key.
/// Bare modifier keys are ignored so `Shift` alone never skips a record.
pub fn key_press(key: &Key) -> Option<KeyPress> {
    match key {
        Key::Character(chars) => chars.chars().next().map(KeyPress::Char),
        Key::Named(Named::Shift | Named::Control | Named::Alt | Named::Super) => None,
        Key::Named(named) => Some(KeyPress::Named(format!("{:?}", named))),
        Key::Unidentified => None,
    }
}
