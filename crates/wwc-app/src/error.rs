use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("No surface format supported by adapter")]
    NoSurfaceFormat,
}
