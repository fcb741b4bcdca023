use std::{io, path::PathBuf};

pub type Result<T> = ::core::result::Result<T, SetupError>;

/// 启动阶段的错误, 全部致命, 进入事件循环之前就退出
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("could not open device {}: {source}", path.display())]
    DeviceOpen { path: PathBuf, source: io::Error },
    #[error("could not grab device {}: {source}", path.display())]
    DeviceGrab { path: PathBuf, source: io::Error },
    #[error("unsupported device {}: {reason}", path.display())]
    UnsupportedDevice { path: PathBuf, reason: String },
    #[error("could not describe device {}: {reason}", path.display())]
    UnreadableCaps { path: PathBuf, reason: String },
    #[error("could not serialize the device description: {0}")]
    Describe(#[from] toml::ser::Error),
    #[error("no input device selected")]
    NoDevice,
    #[error("could not connect to the display: {0}")]
    DisplayConnect(#[from] wayland_client::ConnectError),
    #[error("display does not provide {0}")]
    MissingGlobal(&'static str),
    #[error("display error: {0}")]
    Display(String),
    #[error("{0}")]
    InvalidOptions(String),
    #[error(transparent)]
    StdIo(#[from] io::Error),
}

impl From<wayland_client::DispatchError> for SetupError {
    fn from(value: wayland_client::DispatchError) -> Self {
        Self::Display(value.to_string())
    }
}

impl From<wayland_client::backend::WaylandError> for SetupError {
    fn from(value: wayland_client::backend::WaylandError) -> Self {
        Self::Display(value.to_string())
    }
}
