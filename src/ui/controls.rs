use iced::widget::{button, checkbox, horizontal_space, pick_list, row, text, text_input, Row};
use iced::{Alignment, Element};

use mask_pruner::state::data::MaskKind;
use mask_pruner::state::session::Session;

use crate::Message;

/// Navigation, rotation, delete and folder buttons
pub fn toolbar(session: &Session) -> Row<'_, Message> {
    let has_image = session.current().is_some();
    let images = session.images();

    let viewing = if images.is_empty() {
        "Viewing 0 of 0".to_string()
    } else {
        format!("Viewing {} of {}", images.index() + 1, images.len())
    };

    // Delete is unavailable in safe mode
    let delete = button("Delete")
        .on_press_maybe((has_image && !session.settings().safe_mode).then_some(Message::Delete))
        .padding(6);

    row![
        button("< Prev (S)")
            .on_press_maybe((!images.is_empty()).then_some(Message::Previous))
            .padding(6),
        button("Next > (W)")
            .on_press_maybe((!images.is_empty()).then_some(Message::Next))
            .padding(6),
        button("Rotate Left (A)")
            .on_press_maybe(has_image.then_some(Message::RotateLeft))
            .padding(6),
        button("Rotate Right (D)")
            .on_press_maybe(has_image.then_some(Message::RotateRight))
            .padding(6),
        delete,
        button("Input Folder").on_press(Message::SelectInputFolder).padding(6),
        button("Output Folder").on_press(Message::SelectOutputFolder).padding(6),
        button("Open Input").on_press(Message::OpenInputFolder).padding(6),
        button("Open Output").on_press(Message::OpenOutputFolder).padding(6),
        button("About").on_press(Message::About).padding(6),
        horizontal_space(),
        text(viewing),
    ]
    .spacing(8)
    .padding(8)
    .align_y(Alignment::Center)
}

/// Toggles, mask type and color
pub fn settings_row<'a>(session: &'a Session, color_input: &'a str) -> Row<'a, Message> {
    let settings = session.settings();

    row![
        checkbox("Auto-advance", settings.auto_advance).on_toggle(Message::AutoAdvanceToggled),
        checkbox("Sound", settings.crop_sound).on_toggle(Message::SoundToggled),
        checkbox("Safe mode", settings.safe_mode).on_toggle(Message::SafeModeToggled),
        text("Mask:"),
        pick_list(
            &MaskKind::ALL[..],
            Some(settings.mask_type),
            Message::MaskKindSelected
        ),
        text("Color:"),
        text_input("#000000", color_input)
            .on_input(Message::ColorInputChanged)
            .on_submit(Message::ColorSubmitted)
            .width(120),
        horizontal_space(),
        text("Use Mouse Wheel to change selection size.").size(13),
    ]
    .spacing(12)
    .padding(8)
    .align_y(Alignment::Center)
}

pub fn status_bar<'a>(session: &'a Session, status: &'a str) -> Element<'a, Message> {
    row![
        text(status).size(14),
        horizontal_space(),
        text(format!("Masks applied: {}", session.masks_applied())).size(14),
        text(format!("Images saved: {}", session.images_saved())).size(14),
    ]
    .spacing(16)
    .padding(8)
    .into()
}
