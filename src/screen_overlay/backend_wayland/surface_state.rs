use tracing::{debug, info, trace};
use wayland_client::{
    Connection, Dispatch, QueueHandle, WEnum, delegate_noop,
    protocol::{
        wl_buffer, wl_compositor, wl_pointer, wl_region, wl_registry, wl_seat, wl_shm,
        wl_shm_pool, wl_surface, wl_touch,
    },
};
use wayland_protocols::xdg::shell::client::{xdg_surface, xdg_toplevel, xdg_wm_base};
use wayland_protocols_wlr::layer_shell::v1::client::{zwlr_layer_shell_v1, zwlr_layer_surface_v1};

use super::shm_buffer::BufferLease;
use crate::input_devices::SeatTouch;
use crate::screen_overlay::WindowEvent;

/// 内部状态对象, 由事件队列分发时修改
#[derive(Default)]
pub struct SurfaceState {
    pub(super) compositor: Option<wl_compositor::WlCompositor>,
    pub(super) shm: Option<wl_shm::WlShm>,
    pub(super) wm_base: Option<xdg_wm_base::XdgWmBase>,
    pub(super) layer_shell: Option<zwlr_layer_shell_v1::ZwlrLayerShellV1>,
    pub(super) seat: Option<wl_seat::WlSeat>,
    pub(super) pointer: Option<wl_pointer::WlPointer>,
    pub(super) touch: Option<wl_touch::WlTouch>,
    /// 是否订阅 seat 的触摸流
    pub(super) want_touch: bool,
    pub(super) configured: bool,
    pub(super) size: (u32, u32),
    pending_size: Option<(u32, u32)>,
    pub(super) events: Vec<WindowEvent>,
}

impl SurfaceState {
    pub fn new(want_touch: bool, size: (u32, u32)) -> Self {
        Self {
            want_touch,
            size,
            ..Default::default()
        }
    }

    /// configure 被确认后才应用新尺寸
    fn apply_configure(&mut self) {
        self.configured = true;
        if let Some(size) = self.pending_size.take() {
            if size != self.size {
                self.size = size;
                self.events.push(WindowEvent::Resized {
                    width: size.0,
                    height: size.1,
                });
            }
        }
    }

    fn propose_size(&mut self, width: i64, height: i64) {
        // 0 表示由客户端自行决定
        if width > 0 && height > 0 {
            self.pending_size = Some((width as u32, height as u32));
        }
    }
}

impl Dispatch<wl_registry::WlRegistry, ()> for SurfaceState {
    fn event(
        state: &mut Self,
        registry: &wl_registry::WlRegistry,
        event: wl_registry::Event,
        _: &(),
        _: &Connection,
        qhandle: &QueueHandle<Self>,
    ) {
        if let wl_registry::Event::Global {
            name,
            interface,
            version,
        } = event
        {
            match &interface[..] {
                "wl_compositor" => {
                    state.compositor = Some(registry.bind(name, version.min(4), qhandle, ()));
                }
                "wl_shm" => {
                    state.shm = Some(registry.bind(name, version.min(1), qhandle, ()));
                }
                "xdg_wm_base" => {
                    state.wm_base = Some(registry.bind(name, version.min(2), qhandle, ()));
                }
                "zwlr_layer_shell_v1" => {
                    state.layer_shell = Some(registry.bind(name, version.min(4), qhandle, ()));
                }
                // 多个 seat 时只用第一个
                "wl_seat" if state.seat.is_none() => {
                    state.seat = Some(registry.bind(name, version.min(7), qhandle, ()));
                }
                _ => trace!(%interface, version, "global ignored"),
            }
        }
    }
}

impl Dispatch<wl_seat::WlSeat, ()> for SurfaceState {
    fn event(
        state: &mut Self,
        seat: &wl_seat::WlSeat,
        event: wl_seat::Event,
        _: &(),
        _: &Connection,
        qhandle: &QueueHandle<Self>,
    ) {
        if let wl_seat::Event::Capabilities {
            capabilities: WEnum::Value(capabilities),
        } = event
        {
            debug!(?capabilities, "seat capabilities");
            if capabilities.contains(wl_seat::Capability::Pointer) && state.pointer.is_none() {
                state.pointer = Some(seat.get_pointer(qhandle, ()));
            }
            if capabilities.contains(wl_seat::Capability::Touch)
                && state.want_touch
                && state.touch.is_none()
            {
                info!("subscribed to seat touch events");
                state.touch = Some(seat.get_touch(qhandle, ()));
            }
        }
    }
}

impl Dispatch<wl_touch::WlTouch, ()> for SurfaceState {
    fn event(
        state: &mut Self,
        _: &wl_touch::WlTouch,
        event: wl_touch::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        // https://wayland.app/protocols/wayland#wl_touch
        let touch = match event {
            wl_touch::Event::Down { id, x, y, .. } => SeatTouch::Down { id, x, y },
            wl_touch::Event::Motion { id, x, y, .. } => SeatTouch::Motion { id, x, y },
            wl_touch::Event::Up { id, .. } => SeatTouch::Up { id },
            wl_touch::Event::Shape { id, major, minor } => SeatTouch::Shape { id, major, minor },
            wl_touch::Event::Orientation { id, orientation } => SeatTouch::Orientation {
                id,
                degrees: orientation,
            },
            wl_touch::Event::Cancel => SeatTouch::Cancel,
            _ => return,
        };
        state.events.push(WindowEvent::Touch(touch));
    }
}

impl Dispatch<wl_pointer::WlPointer, ()> for SurfaceState {
    fn event(
        state: &mut Self,
        _: &wl_pointer::WlPointer,
        event: wl_pointer::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if let wl_pointer::Event::Button {
            state: WEnum::Value(wl_pointer::ButtonState::Pressed),
            ..
        } = event
        {
            state.events.push(WindowEvent::Clear);
        }
    }
}

impl Dispatch<wl_buffer::WlBuffer, BufferLease> for SurfaceState {
    fn event(
        _: &mut Self,
        _: &wl_buffer::WlBuffer,
        event: wl_buffer::Event,
        lease: &BufferLease,
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if let wl_buffer::Event::Release = event {
            trace!("buffer released");
            lease.release();
        }
    }
}

impl Dispatch<xdg_wm_base::XdgWmBase, ()> for SurfaceState {
    fn event(
        _: &mut Self,
        wm_base: &xdg_wm_base::XdgWmBase,
        event: xdg_wm_base::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if let xdg_wm_base::Event::Ping { serial } = event {
            wm_base.pong(serial);
        }
    }
}

impl Dispatch<xdg_surface::XdgSurface, ()> for SurfaceState {
    fn event(
        state: &mut Self,
        xdg_surface: &xdg_surface::XdgSurface,
        event: xdg_surface::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if let xdg_surface::Event::Configure { serial } = event {
            xdg_surface.ack_configure(serial);
            state.apply_configure();
        }
    }
}

impl Dispatch<xdg_toplevel::XdgToplevel, ()> for SurfaceState {
    fn event(
        state: &mut Self,
        _: &xdg_toplevel::XdgToplevel,
        event: xdg_toplevel::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            xdg_toplevel::Event::Configure { width, height, .. } => {
                state.propose_size(width.into(), height.into());
            }
            xdg_toplevel::Event::Close => state.events.push(WindowEvent::Close),
            _ => {}
        }
    }
}

impl Dispatch<zwlr_layer_surface_v1::ZwlrLayerSurfaceV1, ()> for SurfaceState {
    fn event(
        state: &mut Self,
        layer_surface: &zwlr_layer_surface_v1::ZwlrLayerSurfaceV1,
        event: zwlr_layer_surface_v1::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        // https://wayland.app/protocols/wlr-layer-shell-unstable-v1#zwlr_layer_surface_v1
        match event {
            zwlr_layer_surface_v1::Event::Configure {
                serial,
                width,
                height,
            } => {
                layer_surface.ack_configure(serial);
                state.propose_size(width.into(), height.into());
                state.apply_configure();
            }
            zwlr_layer_surface_v1::Event::Closed => state.events.push(WindowEvent::Close),
            _ => {}
        }
    }
}

delegate_noop!(SurfaceState: ignore wl_compositor::WlCompositor);
delegate_noop!(SurfaceState: ignore wl_surface::WlSurface);
delegate_noop!(SurfaceState: ignore wl_shm::WlShm);
delegate_noop!(SurfaceState: ignore wl_shm_pool::WlShmPool);
delegate_noop!(SurfaceState: ignore wl_region::WlRegion);
delegate_noop!(SurfaceState: ignore zwlr_layer_shell_v1::ZwlrLayerShellV1);
