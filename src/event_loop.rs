use std::{
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use tokio::io::unix::{AsyncFd, AsyncFdReadyMutGuard};
use tracing::{info, trace, warn};
use wayland_client::backend::WaylandError;

use crate::config::{RunOptions, SourceMode};
use crate::contact_tracker::ContactTracker;
use crate::error::SetupError;
use crate::event_model::{DeviceCaps, TrackerEvent};
use crate::input_devices::{
    EvdevSource, SeatSource,
    evdev::{INPUT_DIR, prompt_selection, scan_devices},
};
use crate::renderer::{ColorTable, Renderer};
use crate::screen_overlay::{WaylandWindow, WindowEvent, WindowOptions};

/// 就绪等待的粒度, 只用于交替处理设备和窗口, 不是超时
pub const POLL_TIMEOUT: Duration = Duration::from_millis(100);

pub enum InputSource {
    Evdev(EvdevSource),
    Seat(SeatSource),
}

/// 一次会话: 事件源, 触点追踪, 渲染和窗口, 全部由事件循环独占
pub struct Session {
    input: InputSource,
    tracker: ContactTracker,
    renderer: Renderer,
    window: WaylandWindow,
}

impl Session {
    /// 打开设备和窗口; 只需要 `--describe` 时打印能力描述并返回 `None`
    pub fn setup(options: &RunOptions) -> Result<Option<Self>, SetupError> {
        let colors = options
            .color_seed
            .map(ColorTable::with_seed)
            .unwrap_or_default();

        match options.mode {
            SourceMode::Evdev => {
                let path = match &options.device {
                    Some(path) => path.clone(),
                    None => select_device()?,
                };
                let source = EvdevSource::open(&path)?;
                if options.describe {
                    describe(source.caps())?;
                    return Ok(None);
                }

                let window = WaylandWindow::open(&WindowOptions {
                    title: format!("mtview: {}", source.caps().name),
                    overlay: options.overlay,
                    ..Default::default()
                })?;
                let (width, height) = window.size();
                let tracker = ContactTracker::new(source.initial_slot());
                let renderer =
                    Renderer::new(source.caps(), options.render, width, height).with_colors(colors);
                Ok(Some(Self {
                    input: InputSource::Evdev(source),
                    tracker,
                    renderer,
                    window,
                }))
            }
            SourceMode::Seat => {
                if options.overlay {
                    return Err(SetupError::InvalidOptions(
                        "the overlay does not receive touches, it only works with --mode=evdev"
                            .to_string(),
                    ));
                }
                if let Some(path) = &options.device {
                    warn!(path = %path.display(), "device argument is ignored in seat mode");
                }
                let window_options = WindowOptions {
                    touch: true,
                    ..Default::default()
                };
                if options.describe {
                    let (width, height) = window_options.size;
                    describe(&SeatSource::new(width, height).caps())?;
                    return Ok(None);
                }

                let window = WaylandWindow::open(&window_options)?;
                let (width, height) = window.size();
                let seat = SeatSource::new(width, height);
                let tracker = ContactTracker::default().with_valuators(SeatSource::valuators());
                let renderer =
                    Renderer::new(&seat.caps(), options.render, width, height).with_colors(colors);
                Ok(Some(Self {
                    input: InputSource::Seat(seat),
                    tracker,
                    renderer,
                    window,
                }))
            }
        }
    }

    /// 单线程事件循环, 窗口关闭或 Ctrl-C 时正常返回
    pub async fn run(self) -> anyhow::Result<()> {
        let Self {
            input,
            mut tracker,
            mut renderer,
            mut window,
        } = self;
        let (mut evdev, mut seat) = match input {
            InputSource::Evdev(source) => (Some(AsyncFd::new(source)?), None),
            InputSource::Seat(source) => (None, Some(source)),
        };
        let display = AsyncFd::new(window.poll_fd()?)?;
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        let mut events = Vec::new();

        loop {
            for event in window.dispatch_pending().context("dispatching display events")? {
                match event {
                    WindowEvent::Close => {
                        info!("window closed");
                        return Ok(());
                    }
                    WindowEvent::Resized { width, height } => {
                        window
                            .resize(width, height)
                            .context("reallocating the window buffer")?;
                        if let Some(seat) = seat.as_mut() {
                            seat.resize(width, height);
                            let (x, y) = seat.bounds();
                            renderer.set_bounds(x, y);
                        }
                        renderer.resize(width, height);
                    }
                    WindowEvent::Clear => renderer.clear(),
                    WindowEvent::Touch(touch) => {
                        if let Some(seat) = seat.as_mut() {
                            seat.translate(touch, &mut events);
                        }
                    }
                }
            }
            render_frames(&mut tracker, &mut renderer, &mut events);
            let damage = renderer.take_damage();
            window
                .present(renderer.canvas(), damage)
                .context("presenting to the window")?;
            window.flush().context("flushing the display connection")?;

            let Some(read) = window.prepare_read() else {
                continue;
            };
            tokio::select! {
                ready = display.readable() => {
                    let mut ready = ready?;
                    match read.read() {
                        Ok(_) => {}
                        Err(WaylandError::Io(e)) if e.kind() == io::ErrorKind::WouldBlock => {
                            ready.clear_ready();
                        }
                        Err(e) => return Err(e).context("reading from the display"),
                    }
                }
                ready = input_ready(evdev.as_mut()) => {
                    let mut ready = ready?;
                    ready
                        .get_inner_mut()
                        .read_events(&mut events)
                        .context("reading the input device")?;
                    ready.clear_ready();
                }
                _ = tokio::time::sleep(POLL_TIMEOUT) => {}
                _ = &mut ctrl_c => {
                    info!("interrupted");
                    return Ok(());
                }
            }
        }
    }
}

async fn input_ready(
    source: Option<&mut AsyncFd<EvdevSource>>,
) -> io::Result<AsyncFdReadyMutGuard<'_, EvdevSource>> {
    match source {
        Some(source) => source.readable_mut().await,
        None => std::future::pending().await,
    }
}

fn render_frames(tracker: &mut ContactTracker, renderer: &mut Renderer, events: &mut Vec<TrackerEvent>) {
    for frame in tracker.feed_all(events.drain(..)) {
        trace!(contacts = frame.len(), "frame");
        renderer.render(&frame);
    }
}

fn describe(caps: &DeviceCaps) -> Result<(), SetupError> {
    print!("{}", caps.to_toml()?);
    Ok(())
}

fn select_device() -> Result<PathBuf, SetupError> {
    let devices = scan_devices(Path::new(INPUT_DIR))?;
    if devices.is_empty() {
        return Err(SetupError::NoDevice);
    }
    prompt_selection(&devices, io::stdin().lock(), io::stdout())?.ok_or(SetupError::NoDevice)
}
