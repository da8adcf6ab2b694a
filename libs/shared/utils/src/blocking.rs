use tracing::error;

use shared_models::error::AppError;

/// Run synchronous store work on the blocking pool and map its error into an
/// HTTP-facing [`AppError`].
pub async fn run_blocking<T, E, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<AppError> + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result.map_err(Into::into),
        Err(join_error) => {
            error!("Blocking task failed: {}", join_error);
            Err(AppError::Internal(join_error.to_string()))
        }
    }
}
