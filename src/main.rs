mod gauge;
mod layout;
mod metrics;
mod options;
mod poller;
mod resources;
mod rows;
mod theme;
mod ui;

use std::process::ExitCode;

use iced::futures::channel::mpsc;
use iced::Task;
use thiserror::Error;

use metrics::{SampleError, Sampler};
use options::Settings;
use poller::Poller;
use resources::{ResourceWatcher, Resources};
use ui::{FailureSlot, Gauges};

#[derive(Debug, Error)]
enum Error {
    #[error("cannot read system statistics: {0}")]
    Sample(#[from] SampleError),
    #[error("cannot start the poller thread: {0}")]
    Poller(#[from] std::io::Error),
    #[error("window error: {0}")]
    Window(#[from] iced::Error),
}

fn main() -> ExitCode {
    let settings = options::parse();

    let level = if settings.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", options::PROGRAM);
            ExitCode::FAILURE
        }
    }
}

fn run(settings: Settings) -> Result<(), Error> {
    let mut sampler = Sampler::detect();
    let first = sampler.sample()?;
    log::info!("sampling from {}", sampler.source_name());

    let (signal, signals) = mpsc::channel(0);
    let poller = Poller::spawn(settings.interval(), signal)?;

    let failure = FailureSlot::default();
    let watcher = ResourceWatcher::new(Resources::default_path());
    let app = Gauges::new(settings, sampler, &first, signals, watcher, failure.clone());
    let window = app.window_settings();

    let result = iced::application(Gauges::title, Gauges::update, Gauges::view)
        .subscription(Gauges::subscription)
        .theme(Gauges::theme)
        .default_font(iced::Font::MONOSPACE)
        .window(window)
        .run_with(move || (app, Task::none()));

    // The window is gone; the poller notices on its next wake-up.
    poller.stop();
    result?;

    let failed = failure.lock().ok().and_then(|mut slot| slot.take());
    match failed {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
