//! # OS termination signals.
//!
//! [`wait_for_signal`] completes when the process receives a termination
//! signal and names it.
//!
//! **Unix:** `SIGINT`, `SIGTERM`, `SIGQUIT`.
//! **Elsewhere:** Ctrl-C via [`tokio::signal::ctrl_c`].

/// Waits for a termination signal and returns its name.
///
/// Each call registers its own listeners. Fails if registration fails.
#[cfg(unix)]
pub(crate) async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    let name = tokio::select! {
        _ = sigint.recv()  => "SIGINT",
        _ = sigterm.recv() => "SIGTERM",
        _ = sigquit.recv() => "SIGQUIT",
    };
    Ok(name)
}

#[cfg(not(unix))]
pub(crate) async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("ctrl-c")
}
