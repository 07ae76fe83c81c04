use thiserror::Error;

/// Failures surfaced by a render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("worker {worker} panicked: {message}")]
    WorkerPanicked { worker: usize, message: String },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("film or output resolution is empty")]
    EmptyFilm,
}

pub type RenderResult<T> = Result<T, RenderError>;
