#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] bl_config::error::Error),

    #[error(transparent)]
    Device(#[from] bl_devices::error::Error),

    #[error(transparent)]
    Watcher(#[from] bl_watcher::error::Error),
}
