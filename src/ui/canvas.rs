use iced::mouse::{self, Cursor};
use iced::widget::canvas::{self, Path, Program, Stroke};
use iced::{Color, Point, Rectangle, Renderer, Size, Theme};

use crate::state::selection::{ImagePoint, Selection};
use crate::Message;

/// Outline colour of the region of interest
const SELECTION_COLOR: Color = Color { r: 1.0, g: 0.0, b: 0.0, a: 1.0 };

/// Mapping between canvas coordinates and image pixels for an image shown
/// with aspect-preserving fit, centred in the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Display pixels per image pixel
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl ViewTransform {
    pub fn fit(image_size: (u32, u32), viewport: Size) -> Self {
        let (width, height) = (image_size.0 as f32, image_size.1 as f32);
        if width <= 0.0 || height <= 0.0 || viewport.width <= 0.0 || viewport.height <= 0.0 {
            return Self { scale: 1.0, offset_x: 0.0, offset_y: 0.0 };
        }

        let scale = (viewport.width / width).min(viewport.height / height);
        Self {
            scale,
            offset_x: (viewport.width - width * scale) / 2.0,
            offset_y: (viewport.height - height * scale) / 2.0,
        }
    }

    pub fn to_image(&self, point: Point) -> ImagePoint {
        ImagePoint::new(
            (point.x - self.offset_x) / self.scale,
            (point.y - self.offset_y) / self.scale,
        )
    }

    pub fn to_display(&self, selection: &Selection) -> Rectangle {
        Rectangle::new(
            Point::new(
                self.offset_x + selection.x * self.scale,
                self.offset_y + selection.y * self.scale,
            ),
            Size::new(selection.width * self.scale, selection.height * self.scale),
        )
    }
}

fn is_inside(point: ImagePoint, image_size: (u32, u32)) -> bool {
    point.x >= 0.0
        && point.y >= 0.0
        && point.x < image_size.0 as f32
        && point.y < image_size.1 as f32
}

/// Transparent layer stacked over the image that turns left-button drags
/// into selection messages and draws the current selection
pub struct SelectionOverlay {
    pub image_size: (u32, u32),
    pub selection: Option<Selection>,
}

impl Program<Message> for SelectionOverlay {
    type State = DragState;

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        let transform = ViewTransform::fit(self.image_size, bounds.size());

        match event {
            // Mouse button press - start a selection if it lands on the image
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if let Some(position) = cursor.position_in(bounds) {
                    let point = transform.to_image(position);
                    if is_inside(point, self.image_size) {
                        state.is_dragging = true;
                        state.last_point = Some(point);
                        return (
                            canvas::event::Status::Captured,
                            Some(Message::SelectionStarted(point)),
                        );
                    }
                }
            }

            // Mouse move - follow the cursor, even outside the canvas
            canvas::Event::Mouse(mouse::Event::CursorMoved { position }) => {
                if state.is_dragging {
                    let local = Point::new(position.x - bounds.x, position.y - bounds.y);
                    let point = transform.to_image(local);
                    state.last_point = Some(point);
                    return (
                        canvas::event::Status::Captured,
                        Some(Message::SelectionMoved(point)),
                    );
                }
            }

            // Mouse button release - finish at the last known point
            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                if state.is_dragging {
                    state.is_dragging = false;
                    let point = cursor
                        .position()
                        .map(|p| transform.to_image(Point::new(p.x - bounds.x, p.y - bounds.y)))
                        .or(state.last_point.take());
                    if let Some(point) = point {
                        return (
                            canvas::event::Status::Captured,
                            Some(Message::SelectionFinished(point)),
                        );
                    }
                }
            }

            _ => {}
        }

        (canvas::event::Status::Ignored, None)
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        if let Some(selection) = &self.selection {
            let transform = ViewTransform::fit(self.image_size, bounds.size());
            let rect = transform.to_display(selection);
            let outline = Path::rectangle(rect.position(), rect.size());
            frame.stroke(
                &outline,
                Stroke::default().with_color(SELECTION_COLOR).with_width(2.0),
            );
        }

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> mouse::Interaction {
        if state.is_dragging {
            return mouse::Interaction::Crosshair;
        }
        let transform = ViewTransform::fit(self.image_size, bounds.size());
        match cursor.position_in(bounds) {
            Some(position) if is_inside(transform.to_image(position), self.image_size) => {
                mouse::Interaction::Crosshair
            }
            _ => mouse::Interaction::default(),
        }
    }
}

/// State for drag interactions
#[derive(Debug, Clone, Default)]
pub struct DragState {
    pub is_dragging: bool,
    pub last_point: Option<ImagePoint>,
}
