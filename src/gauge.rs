use iced::mouse;
use iced::widget::canvas::{self, Frame, Geometry, Path, Text};
use iced::{Color, Font, Point, Rectangle, Renderer, Size, Theme};

/// Colors needed by the gauge from the active palette.
#[derive(Debug, Clone, Copy)]
pub struct GaugeColors {
    pub track: Color,
    pub fill: Color,
    pub text: Color,
}

/// A horizontal bar gauge with its formatted value centered on top.
#[derive(Debug, Clone)]
pub struct BarGauge {
    /// Filled fraction (0.0 – 1.0)
    pub fill: f32,
    /// Value text, e.g. "50.00%"
    pub label: String,
    pub font_size: f32,
    pub colors: GaugeColors,
}

impl BarGauge {
    /// Width of the filled part for a gauge `width` pixels wide.
    fn fill_width(&self, width: f32) -> f32 {
        width * self.fill.clamp(0.0, 1.0)
    }
}

impl<Message: 'static> canvas::Program<Message> for BarGauge {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let c = &self.colors;

        // Track
        frame.fill(&Path::rectangle(Point::ORIGIN, bounds.size()), c.track);

        // Value
        let filled = self.fill_width(bounds.width);
        if filled >= 0.5 {
            let bar = Path::rectangle(Point::ORIGIN, Size::new(filled, bounds.height));
            frame.fill(&bar, c.fill);
        }

        let mut text = Text::from(self.label.clone());
        text.position = Point::new(bounds.width / 2.0, bounds.height / 2.0);
        text.color = c.text;
        text.size = self.font_size.into();
        text.font = Font::MONOSPACE;
        text.horizontal_alignment = iced::alignment::Horizontal::Center;
        text.vertical_alignment = iced::alignment::Vertical::Center;
        frame.fill_text(text);

        vec![frame.into_geometry()]
    }
}
