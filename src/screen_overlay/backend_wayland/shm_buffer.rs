use std::{
    fs::File,
    io,
    os::{fd::AsFd, unix::fs::FileExt},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use wayland_client::{
    QueueHandle,
    protocol::{wl_buffer, wl_shm, wl_shm_pool},
};

use super::surface_state::SurfaceState;
use crate::renderer::{Canvas, Rect};

/// 缓冲是否还被合成器持有, 作为 wl_buffer 的 user data, 收到 `release` 时清除
#[derive(Debug, Clone, Default)]
pub struct BufferLease(Arc<AtomicBool>);

impl BufferLease {
    pub fn is_held(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn hold(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn release(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// 一个缓冲的占用状态, 以及还没拷进这个缓冲的脏区域
#[derive(Debug, Clone)]
pub struct BufferSlot {
    lease: BufferLease,
    stale: Option<Rect>,
}

impl BufferSlot {
    /// 新缓冲的内容全部过期
    pub fn new(full: Rect) -> Self {
        Self {
            lease: BufferLease::default(),
            stale: Some(full),
        }
    }

    pub fn lease(&self) -> &BufferLease {
        &self.lease
    }

    pub fn mark_stale(&mut self, damage: Rect) {
        self.stale = Some(self.stale.map_or(damage, |s| s.union(damage)));
    }

    /// 合成器已释放并且有内容要更新
    pub fn is_ready(&self) -> bool {
        !self.lease.is_held() && self.stale.is_some()
    }

    pub fn take_stale(&mut self) -> Option<Rect> {
        self.stale.take()
    }
}

/// 第一个可以写入的缓冲
pub fn next_ready(slots: &[&BufferSlot]) -> Option<usize> {
    slots.iter().position(|s| s.is_ready())
}

/// 用临时文件做后备存储的 wl_shm 缓冲, ARGB8888
pub struct ShmBuffer {
    file: File,
    pool: wl_shm_pool::WlShmPool,
    buffer: wl_buffer::WlBuffer,
    width: u32,
    height: u32,
    pub(super) slot: BufferSlot,
}

impl ShmBuffer {
    pub fn new(
        shm: &wl_shm::WlShm,
        (width, height): (u32, u32),
        qhandle: &QueueHandle<SurfaceState>,
    ) -> io::Result<Self> {
        let stride = width * 4;
        let size = stride * height;
        let file = tempfile::tempfile()?;
        file.set_len(u64::from(size))?;

        let slot = BufferSlot::new(Rect {
            x: 0,
            y: 0,
            width,
            height,
        });
        let pool = shm.create_pool(file.as_fd(), size as i32, qhandle, ());
        let buffer = pool.create_buffer(
            0,
            width as i32,
            height as i32,
            stride as i32,
            wl_shm::Format::Argb8888,
            qhandle,
            slot.lease().clone(),
        );
        Ok(Self {
            file,
            pool,
            buffer,
            width,
            height,
            slot,
        })
    }

    pub fn buffer(&self) -> &wl_buffer::WlBuffer {
        &self.buffer
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// 把过期区域从画布拷进来, 返回实际拷贝的区域
    ///
    /// 调用方随后 attach 并提交, 所以这里同时把缓冲标记为被合成器持有
    pub fn refresh(&mut self, canvas: &Canvas) -> io::Result<Option<Rect>> {
        let Some(stale) = self.slot.take_stale() else {
            return Ok(None);
        };
        let written = self.write(canvas, stale)?;
        if written.is_some() {
            self.slot.lease().hold();
        }
        Ok(written)
    }

    /// 把画布上 `rect` 区域逐行拷进共享内存, 返回实际拷贝的区域
    fn write(&self, canvas: &Canvas, rect: Rect) -> io::Result<Option<Rect>> {
        let right = (rect.x + rect.width).min(self.width).min(canvas.width());
        let bottom = (rect.y + rect.height).min(self.height).min(canvas.height());
        if rect.x >= right || rect.y >= bottom {
            return Ok(None);
        }
        let rect = Rect {
            x: rect.x,
            y: rect.y,
            width: right - rect.x,
            height: bottom - rect.y,
        };

        let mut bytes = Vec::with_capacity(rect.width as usize * 4);
        for y in rect.y..bottom {
            bytes.clear();
            for pixel in canvas.row(y, rect.x, rect.width) {
                bytes.extend_from_slice(&pixel.to_le_bytes());
            }
            let offset = (u64::from(y) * u64::from(self.width) + u64::from(rect.x)) * 4;
            self.file.write_all_at(&bytes, offset)?;
        }
        Ok(Some(rect))
    }
}

impl Drop for ShmBuffer {
    fn drop(&mut self) {
        self.buffer.destroy();
        self.pool.destroy();
    }
}
