use anyhow::Result;

/// Resolves on SIGTERM or Ctrl+C (Ctrl+Break/close on Windows).
pub async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::select! {
            _ = sigterm.recv() => tracing::info!("shutdown: SIGTERM received"),
            _ = sigint.recv() => tracing::info!("shutdown: SIGINT received"),
        }
        Ok(())
    }

    #[cfg(windows)]
    {
        use tokio::signal::windows::{ctrl_break, ctrl_c, ctrl_close};

        let mut c = ctrl_c()?;
        let mut br = ctrl_break()?;
        let mut cl = ctrl_close()?;
        tokio::select! {
            _ = c.recv() => {},
            _ = br.recv() => {},
            _ = cl.recv() => {},
        }
        tracing::info!("shutdown: console signal received");
        Ok(())
    }
}
