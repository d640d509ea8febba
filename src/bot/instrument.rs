//! Uniform entry/exit logging for dispatcher endpoints.

use std::future::Future;
use teloxide::prelude::*;
use tracing::{error, info, info_span, Instrument};

/// Run a handler future, logging its start, completion or failure.
///
/// Handler errors are logged and swallowed so one failing update never
/// reaches the dispatcher's error path.
///
/// # Errors
///
/// Never fails; the `ResponseResult` shape matches teloxide endpoints.
pub async fn logged<F>(operation: &'static str, handler: F) -> ResponseResult<()>
where
    F: Future<Output = anyhow::Result<()>>,
{
    async move {
        info!("Calling {operation}");
        match handler.await {
            Ok(()) => info!("Finished {operation}"),
            Err(e) => error!("Exception during {operation} call: {e}"),
        }
    }
    .instrument(info_span!("handler", operation))
    .await;

    respond(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn test_logged_runs_handler() {
        let ran = AtomicBool::new(false);
        let result = logged("probe", async {
            ran.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await;

        assert!(result.is_ok());
        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_logged_swallows_errors() {
        let result = logged("failing", async { Err(anyhow::anyhow!("boom")) }).await;
        assert!(result.is_ok());
    }
}
