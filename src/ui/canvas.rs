use iced::mouse::{self, Cursor};
use iced::widget::canvas::{self, Path, Program, Stroke};
use iced::{Color, Point, Rectangle, Renderer, Theme};

use mask_pruner::geometry::Viewport;
use mask_pruner::state::data::Selection;

use crate::Message;

/// Draws the brush circle over the fitted image and turns pointer
/// events into source-space messages
pub struct SelectionOverlay {
    /// Source image size, `None` while nothing is loaded
    pub image_size: Option<(u32, u32)>,
    /// Brush in source pixels
    pub selection: Selection,
}

impl SelectionOverlay {
    /// Recomputed on every call so resizes and rotations are picked up
    fn viewport(&self, bounds: Rectangle) -> Option<Viewport> {
        let (width, height) = self.image_size?;
        Viewport::fit(bounds.width, bounds.height, width, height)
    }
}

impl Program<Message> for SelectionOverlay {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        // Nothing to draw until the canvas has a size and an image is loaded
        let Some(viewport) = self.viewport(bounds) else {
            return vec![];
        };

        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let (x, y) = viewport.to_display(self.selection.center_x, self.selection.center_y);
        let circle = Path::circle(Point::new(x, y), viewport.display_length(self.selection.radius));

        frame.stroke(
            &circle,
            Stroke::default()
                .with_color(Color::from_rgb(1.0, 0.0, 0.0))
                .with_width(2.0),
        );

        vec![frame.into_geometry()]
    }

    fn update(
        &self,
        _state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        let Some(viewport) = self.viewport(bounds) else {
            return (canvas::event::Status::Ignored, None);
        };

        match event {
            // Brush follows the pointer; the session clamps it into the image
            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                if let Some(position) = cursor.position_in(bounds) {
                    let (x, y) = viewport.to_source(position.x, position.y);
                    return (
                        canvas::event::Status::Captured,
                        Some(Message::SelectionMoved(x, y)),
                    );
                }
            }

            // Mouse wheel resizes the brush, one notch = one step
            canvas::Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                if cursor.is_over(bounds) {
                    let steps = match delta {
                        mouse::ScrollDelta::Lines { y, .. } => y,
                        mouse::ScrollDelta::Pixels { y, .. } => y / 50.0,
                    };
                    return (
                        canvas::event::Status::Captured,
                        Some(Message::BrushScrolled(steps)),
                    );
                }
            }

            // Releasing the left button applies the mask
            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                if cursor.is_over(bounds) {
                    return (canvas::event::Status::Captured, Some(Message::ApplyMask));
                }
            }

            _ => {}
        }

        (canvas::event::Status::Ignored, None)
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> mouse::Interaction {
        if self.image_size.is_some() && cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }
}
