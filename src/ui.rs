use iced::futures::channel::mpsc;
use iced::futures::lock::Mutex as AsyncMutex;
use iced::futures::{stream, StreamExt};
use iced::widget::canvas::Canvas;
use iced::widget::{container, row, text, Column};
use iced::{
    alignment, window, Alignment, Background, Border, Color, Element, Font, Length, Point, Size,
    Subscription, Task, Theme,
};
use std::sync::{Arc, Mutex};

use crate::gauge::{BarGauge, GaugeColors};
use crate::layout::{self, CellMetrics, Grid, Placement, COLUMN_CELLS};
use crate::metrics::{Sample, SampleError, Sampler};
use crate::options::{Settings, PROGRAM};
use crate::resources::{ResourceWatcher, Resources};
use crate::rows::Rows;
use crate::theme::Palette;

#[derive(Debug, Clone)]
pub enum Message {
    /// The poller asked for a fresh sample.
    Poll,
}

/// Where a sampling error that closed the window is left for `main`.
pub type FailureSlot = Arc<Mutex<Option<SampleError>>>;

// ─── APP STATE ──────────────────────────────────────────────────

pub struct Gauges {
    settings: Settings,
    sampler: Sampler,
    rows: Rows,
    grid: Grid,
    resources: Resources,
    watcher: ResourceWatcher,
    pal: Palette,
    /// Receiving end of the poller's one-slot channel.
    signals: Arc<AsyncMutex<mpsc::Receiver<()>>>,
    failure: FailureSlot,
}

impl Gauges {
    /// Rows and grid are sized once, from the totals in `first`.
    pub fn new(
        settings: Settings,
        sampler: Sampler,
        first: &Sample,
        signals: mpsc::Receiver<()>,
        watcher: ResourceWatcher,
        failure: FailureSlot,
    ) -> Self {
        let rows = Rows::setup(first);
        let grid = Grid::build(&rows, settings.show_max);
        let resources = Resources::load_from(watcher.path());
        let pal = resources.palette();
        log::info!(
            "{} rows in a {}-column grid, polling every {}s",
            grid.rows(),
            grid.columns(),
            settings.interval_secs
        );

        Self {
            settings,
            sampler,
            rows,
            grid,
            resources,
            watcher,
            pal,
            signals: Arc::new(AsyncMutex::new(signals)),
            failure,
        }
    }

    pub fn title(&self) -> String {
        String::from(PROGRAM)
    }

    pub fn theme(&self) -> Theme {
        if self.resources.theme.is_light() { Theme::Light } else { Theme::Dark }
    }

    pub fn subscription(&self) -> Subscription<Message> {
        // Only the first stream built under this id is ever polled.
        let signals = Arc::clone(&self.signals);
        Subscription::run_with_id(
            "poller",
            stream::unfold(signals, |signals| async move {
                let next = signals.lock().await.next().await;
                next.map(|()| (Message::Poll, signals))
            }),
        )
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Poll => {
                if let Err(e) = self.poll() {
                    log::error!("{e}");
                    if let Ok(mut slot) = self.failure.lock() {
                        *slot = Some(e);
                    }
                    return iced::exit();
                }
                if self.watcher.changed() {
                    self.reload_resources();
                    return self.resize();
                }
                Task::none()
            }
        }
    }

    fn poll(&mut self) -> Result<(), SampleError> {
        let sample = self.sampler.sample()?;
        self.rows.update(&sample, self.settings.alert);
        Ok(())
    }

    fn reload_resources(&mut self) {
        self.resources = Resources::load_from(self.watcher.path());
        self.pal = self.resources.palette();
        log::info!("resources reloaded from {}", self.watcher.path().display());
    }

    /// Window size for the current grid and font. Reports the grid's
    /// minimum size on stdout when verbose.
    pub fn window_size(&self) -> Size {
        let cell = self.resources.cell_metrics();
        let min_width = self.grid.min_pixel_width(&cell);
        let min_height = self.grid.min_pixel_height(&cell);

        if self.settings.verbose {
            print!("{}", layout::resize_report(min_width, min_height));
        }

        let (width, height) = layout::window_size(self.settings.width, min_width, min_height);
        Size::new(width as f32, height as f32)
    }

    fn resize(&self) -> Task<Message> {
        let size = self.window_size();
        window::get_latest().and_then(move |id| window::resize(id, size))
    }

    /// Fixed-size window at the requested position.
    pub fn window_settings(&self) -> window::Settings {
        window::Settings {
            size: self.window_size(),
            position: window::Position::Specific(Point::new(
                f32::from(self.settings.x),
                f32::from(self.settings.y),
            )),
            resizable: false,
            ..Default::default()
        }
    }

    // ─── VIEW ───────────────────────────────────────────────────

    pub fn view(&self) -> Element<'_, Message> {
        let cell = self.resources.cell_metrics();
        let lines = self
            .grid
            .placements()
            .iter()
            .map(|placement| self.view_line(placement, &cell));

        let bg = self.pal.bg;
        container(Column::with_children(lines).spacing(cell.spacing))
            .padding(cell.padding)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(move |_: &Theme| container::Style {
                background: Some(Background::Color(bg)),
                ..Default::default()
            })
            .into()
    }

    fn view_line(&self, placement: &Placement, cell: &CellMetrics) -> Element<'_, Message> {
        let r = self.rows.get(placement.row);
        let p = &self.pal;
        let size = self.resources.font_size;
        let [indicator_cells, _, max_cells] = COLUMN_CELLS;

        let gauge = Canvas::new(BarGauge {
            fill: r.fill(),
            label: r.value_label(),
            font_size: size,
            colors: GaugeColors {
                track: p.bar_bg,
                fill: p.accent,
                text: p.text,
            },
        })
        .width(Length::FillPortion(placement.gauge_span))
        .height(Length::Fixed(cell.line_height));

        let mut line = row![
            indicator(r.spec.name, r.alert(), cell.width_of(indicator_cells), cell.line_height, size, p),
            gauge,
        ]
        .spacing(cell.spacing)
        .align_y(Alignment::Center);

        if let Some(label) = r.max_label().filter(|_| placement.max_label) {
            line = line.push(
                text(label)
                    .size(size)
                    .font(Font::MONOSPACE)
                    .color(p.label)
                    .width(cell.width_of(max_cells))
                    .align_x(alignment::Horizontal::Right),
            );
        }
        line.into()
    }
}

/// Row name that lights up while the row is in alert.
fn indicator(
    name: &'static str,
    on: bool,
    width: f32,
    height: f32,
    size: f32,
    p: &Palette,
) -> Element<'static, Message> {
    let (bg, fg) = if on { (p.alert, p.bg) } else { (Color::TRANSPARENT, p.label) };
    container(text(name).size(size).font(Font::MONOSPACE).color(fg))
        .width(width)
        .center_y(height)
        .style(move |_: &Theme| container::Style {
            background: Some(Background::Color(bg)),
            border: Border {
                color: Color::TRANSPARENT,
                width: 0.0,
                radius: 3.0.into(),
            },
            ..Default::default()
        })
        .into()
}
