use wayland_client::protocol::{wl_region, wl_surface};
use wayland_protocols::xdg::shell::client::{xdg_surface, xdg_toplevel};
use wayland_protocols_wlr::layer_shell::v1::client::zwlr_layer_surface_v1;

use super::shm_buffer::ShmBuffer;

/// 表面扮演的角色
pub enum SurfaceRole {
    /// 普通窗口
    Toplevel {
        xdg_surface: xdg_surface::XdgSurface,
        toplevel: xdg_toplevel::XdgToplevel,
    },
    /// 全屏叠加层, 输入区域为空, 点击穿透
    Overlay {
        layer_surface: zwlr_layer_surface_v1::ZwlrLayerSurfaceV1,
        input_region: wl_region::WlRegion,
    },
}

/// Surface内部信息，包含Wayland对象
pub struct RawSurfaceInfo {
    pub surface: wl_surface::WlSurface,
    pub role: SurfaceRole,
    /// 两个缓冲轮流提交, 合成器释放之前不会改写
    pub buffers: Vec<ShmBuffer>,
}

impl Drop for RawSurfaceInfo {
    fn drop(&mut self) {
        // buffer 要先于 surface 销毁
        self.buffers.clear();
        match &self.role {
            SurfaceRole::Toplevel {
                xdg_surface,
                toplevel,
            } => {
                toplevel.destroy();
                xdg_surface.destroy();
            }
            SurfaceRole::Overlay {
                layer_surface,
                input_region,
            } => {
                layer_surface.destroy();
                input_region.destroy();
            }
        }
        self.surface.destroy();
    }
}
