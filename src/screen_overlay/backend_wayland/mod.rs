mod shm_buffer;
mod surface_info;
mod surface_state;

use std::{io, os::fd::OwnedFd};

use tracing::{debug, info, trace, warn};
use wayland_client::{
    Connection, DispatchError, EventQueue, Proxy, QueueHandle,
    backend::{ReadEventsGuard, WaylandError},
};
use wayland_protocols_wlr::layer_shell::v1::client::{zwlr_layer_shell_v1, zwlr_layer_surface_v1};

pub use surface_state::SurfaceState;

use self::{
    shm_buffer::{ShmBuffer, next_ready},
    surface_info::{RawSurfaceInfo, SurfaceRole},
};
use super::{WindowEvent, WindowOptions};
use crate::error::SetupError;
use crate::renderer::{Canvas, Rect};

/// 轮流提交的共享内存缓冲个数
const BUFFER_COUNT: usize = 2;

/// Wayland 窗口后端: 普通 xdg 窗口, 或者 wlr layer shell 全屏叠加层
///
/// 叠加层的兼容性见 <https://wayland.app/protocols/wlr-layer-shell-unstable-v1#compositor-support>
pub struct WaylandWindow {
    conn: Connection,
    event_queue: EventQueue<SurfaceState>,
    qhandle: QueueHandle<SurfaceState>,
    state: SurfaceState,
    raw: RawSurfaceInfo,
}

impl WaylandWindow {
    pub fn open(options: &WindowOptions) -> Result<Self, SetupError> {
        let conn = Connection::connect_to_env()?;
        let mut event_queue = conn.new_event_queue();
        let qhandle = event_queue.handle();

        let display = conn.display();
        display.get_registry(&qhandle, ());

        let mut state = SurfaceState::new(options.touch, options.size);
        // 第一轮拿到全局对象, 第二轮拿到 seat 能力
        event_queue.roundtrip(&mut state)?;
        event_queue.roundtrip(&mut state)?;

        let compositor = state
            .compositor
            .clone()
            .ok_or(SetupError::MissingGlobal("wl_compositor"))?;
        if state.shm.is_none() {
            return Err(SetupError::MissingGlobal("wl_shm"));
        }
        if options.touch && state.touch.is_none() {
            warn!("the seat has no touch capability, nothing will be drawn");
        }

        let surface = compositor.create_surface(&qhandle, ());
        let role = if options.overlay {
            let layer_shell = state
                .layer_shell
                .as_ref()
                .ok_or(SetupError::MissingGlobal("zwlr_layer_shell_v1"))?;
            let layer_surface = layer_shell.get_layer_surface(
                &surface,
                None,
                zwlr_layer_shell_v1::Layer::Overlay,
                options.title.clone(),
                &qhandle,
                (),
            );
            layer_surface.set_size(0, 0);
            layer_surface.set_anchor(
                zwlr_layer_surface_v1::Anchor::Top
                    | zwlr_layer_surface_v1::Anchor::Bottom
                    | zwlr_layer_surface_v1::Anchor::Left
                    | zwlr_layer_surface_v1::Anchor::Right,
            );
            layer_surface.set_exclusive_zone(-1);
            layer_surface.set_margin(0, 0, 0, 0);
            layer_surface
                .set_keyboard_interactivity(zwlr_layer_surface_v1::KeyboardInteractivity::None);

            let input_region = compositor.create_region(&qhandle, ());
            surface.set_input_region(Some(&input_region));
            SurfaceRole::Overlay {
                layer_surface,
                input_region,
            }
        } else {
            let wm_base = state
                .wm_base
                .as_ref()
                .ok_or(SetupError::MissingGlobal("xdg_wm_base"))?;
            let xdg_surface = wm_base.get_xdg_surface(&surface, &qhandle, ());
            let toplevel = xdg_surface.get_toplevel(&qhandle, ());
            toplevel.set_title(options.title.clone());
            toplevel.set_app_id(env!("CARGO_PKG_NAME").to_string());
            SurfaceRole::Toplevel {
                xdg_surface,
                toplevel,
            }
        };
        surface.commit();

        let mut window = Self {
            conn,
            event_queue,
            qhandle,
            state,
            raw: RawSurfaceInfo {
                surface,
                role,
                buffers: Vec::new(),
            },
        };
        while !window.state.configured {
            window.event_queue.blocking_dispatch(&mut window.state)?;
        }
        // 初始尺寸直接用来分配缓冲, 不算作 resize
        window
            .state
            .events
            .retain(|e| !matches!(e, WindowEvent::Resized { .. }));
        let size = window.size();
        window.resize(size.0, size.1)?;
        info!(width = size.0, height = size.1, overlay = options.overlay, "window ready");
        Ok(window)
    }

    pub fn size(&self) -> (u32, u32) {
        self.state.size
    }

    /// 连接的 fd, 用于就绪等待
    pub fn poll_fd(&self) -> io::Result<OwnedFd> {
        self.conn.backend().poll_fd().try_clone_to_owned()
    }

    /// 分发已读到的事件, 返回期间产生的窗口事件
    pub fn dispatch_pending(&mut self) -> Result<Vec<WindowEvent>, DispatchError> {
        self.event_queue.dispatch_pending(&mut self.state)?;
        Ok(std::mem::take(&mut self.state.events))
    }

    pub fn flush(&self) -> Result<(), WaylandError> {
        self.event_queue.flush()
    }

    /// 还有未分发的事件时返回 `None`
    pub fn prepare_read(&self) -> Option<ReadEventsGuard> {
        self.event_queue.prepare_read()
    }

    /// 按新尺寸重新分配共享内存缓冲
    pub fn resize(&mut self, width: u32, height: u32) -> io::Result<()> {
        let (width, height) = (width.max(1), height.max(1));
        if self.raw.buffers.first().map(|b| b.size()) == Some((width, height)) {
            return Ok(());
        }
        let shm = self
            .state
            .shm
            .as_ref()
            .ok_or_else(|| io::Error::other("wl_shm is gone"))?;
        debug!(width, height, count = BUFFER_COUNT, "allocating shm buffers");
        // 旧缓冲先释放
        self.raw.buffers.clear();
        for _ in 0..BUFFER_COUNT {
            self.raw
                .buffers
                .push(ShmBuffer::new(shm, (width, height), &self.qhandle)?);
        }
        self.state.size = (width, height);
        Ok(())
    }

    /// 脏区域记到每个缓冲上, 再拷进一个合成器已释放的缓冲并提交
    ///
    /// 所有缓冲都被持有时返回 `false`, 脏区域留到收到 `release` 之后
    pub fn present(&mut self, canvas: &Canvas, damage: Option<Rect>) -> io::Result<bool> {
        if let Some(damage) = damage {
            for buffer in &mut self.raw.buffers {
                buffer.slot.mark_stale(damage);
            }
        }
        let slots: Vec<_> = self.raw.buffers.iter().map(|b| &b.slot).collect();
        let Some(index) = next_ready(&slots) else {
            if damage.is_some() {
                trace!("all buffers held by the compositor, deferring");
            }
            return Ok(false);
        };
        let buffer = &mut self.raw.buffers[index];
        let Some(rect) = buffer.refresh(canvas)? else {
            return Ok(false);
        };
        let surface = &self.raw.surface;
        surface.attach(Some(buffer.buffer()), 0, 0);
        let (x, y, w, h) = (rect.x as i32, rect.y as i32, rect.width as i32, rect.height as i32);
        if surface.version() >= 4 {
            surface.damage_buffer(x, y, w, h);
        } else {
            surface.damage(x, y, w, h);
        }
        surface.commit();
        Ok(true)
    }
}
