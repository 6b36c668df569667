use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::Config;
use crate::engine::Roundabout;
use crate::ipc::{self, IpcCommand};

/// Run the engine without a terminal surface: commands arrive over IPC,
/// frames go to the log. Useful for driving the carousel from scripts.
pub async fn run(config: Config, mut ipc_rx: mpsc::Receiver<IpcCommand>) -> Result<()> {
    let (carousel, _) = Roundabout::new(&config)?;
    let mut color_scheme = config.display.color_scheme;

    info!(
        "headless carousel running with {} items",
        config.items.labels.len()
    );

    let mut frames = carousel.subscribe();
    tokio::spawn(async move {
        while frames.changed().await.is_ok() {
            let frame = frames.borrow().clone();
            let visible = frame.poses.iter().filter(|p| p.visible).count();
            debug!(
                total = frame.poses.len(),
                visible, "pose frame published"
            );
        }
    });

    while let Some(cmd) = ipc_rx.recv().await {
        ipc::process_ipc_command(cmd, &carousel, &mut color_scheme);
    }

    Ok(())
}
