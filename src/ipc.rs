use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::color::ColorScheme;
use crate::engine::Roundabout;

/// Commands sent from IPC server to the running carousel
pub enum IpcCommand {
    Spin { velocity: f64, reply: oneshot::Sender<String> },
    Index { count: i64, reply: oneshot::Sender<String> },
    Snap { reply: oneshot::Sender<String> },
    Settle { reply: oneshot::Sender<String> },
    Geometry { reply: oneshot::Sender<String> },
    Radius { value: f64, reply: oneshot::Sender<String> },
    ColorNext { reply: oneshot::Sender<String> },
    ColorPrev { reply: oneshot::Sender<String> },
    Status { reply: oneshot::Sender<String> },
    Ping { reply: oneshot::Sender<String> },
}

/// Get the socket path for IPC
pub fn socket_path() -> PathBuf {
    if let Ok(dir) = std::env::var("XDG_RUNTIME_DIR") {
        PathBuf::from(dir).join("rondo.sock")
    } else {
        PathBuf::from("/tmp/rondo.sock")
    }
}

/// Parse a protocol line into an IpcCommand
fn parse_command(line: &str, reply: oneshot::Sender<String>) -> Result<IpcCommand> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        ["spin", val] => {
            let velocity: f64 = val.parse().context("Invalid velocity value")?;
            Ok(IpcCommand::Spin { velocity, reply })
        }
        ["index", val] => {
            let count: i64 = val.parse().context("Invalid index step")?;
            Ok(IpcCommand::Index { count, reply })
        }
        ["snap"] => Ok(IpcCommand::Snap { reply }),
        ["settle"] => Ok(IpcCommand::Settle { reply }),
        ["geometry"] => Ok(IpcCommand::Geometry { reply }),
        ["radius", val] => {
            let value: f64 = val.parse().context("Invalid radius value")?;
            Ok(IpcCommand::Radius { value, reply })
        }
        ["color", "next"] => Ok(IpcCommand::ColorNext { reply }),
        ["color", "prev"] => Ok(IpcCommand::ColorPrev { reply }),
        ["status"] => Ok(IpcCommand::Status { reply }),
        ["ping"] => Ok(IpcCommand::Ping { reply }),
        _ => Err(anyhow::anyhow!("Unknown command: {}", line)),
    }
}

/// Process an IPC command against the running carousel
pub fn process_ipc_command(
    cmd: IpcCommand,
    carousel: &Roundabout,
    color_scheme: &mut ColorScheme,
) {
    match cmd {
        IpcCommand::Spin { velocity, reply } => {
            carousel.scroll_velocity(velocity);
            let _ = reply.send(format!("ok: spinning at {}", velocity));
        }
        IpcCommand::Index { count, reply } => {
            carousel.scroll_index(count);
            let _ = reply.send(format!("ok: stepped {}", count));
        }
        IpcCommand::Snap { reply } => {
            carousel.snap();
            let _ = reply.send("ok: snapped".to_string());
        }
        IpcCommand::Settle { reply } => {
            carousel.force_settle();
            let _ = reply.send("ok: settled".to_string());
        }
        IpcCommand::Geometry { reply } => {
            carousel.recompute_geometry();
            let _ = reply.send("ok: geometry recomputed".to_string());
        }
        IpcCommand::Radius { value, reply } => {
            match carousel.set_radius(value) {
                Ok(()) => {
                    let _ = reply.send(format!("ok: radius {}", value));
                }
                Err(e) => {
                    let _ = reply.send(format!("err: {}", e));
                }
            }
        }
        IpcCommand::ColorNext { reply } => {
            *color_scheme = color_scheme.next();
            let _ = reply.send(format!("ok: {}", color_scheme.name()));
        }
        IpcCommand::ColorPrev { reply } => {
            *color_scheme = color_scheme.prev();
            let _ = reply.send(format!("ok: {}", color_scheme.name()));
        }
        IpcCommand::Status { reply } => {
            let frame = carousel.current_frame();
            let status = format!(
                "ok: items={} active={} front={} color={}",
                frame.poses.len(),
                carousel.active_glides(),
                carousel
                    .nearest_index(0.0)
                    .map(|i| i.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                color_scheme.name(),
            );
            let _ = reply.send(status);
        }
        IpcCommand::Ping { reply } => {
            let _ = reply.send("ok: pong".to_string());
        }
    }
}

/// Handle a single client connection
async fn handle_client(stream: UnixStream, cmd_tx: mpsc::Sender<IpcCommand>) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut buf_reader = BufReader::new(reader);
    let mut line = String::new();
    buf_reader.read_line(&mut line).await?;
    let line = line.trim();

    if line.is_empty() {
        return Ok(());
    }

    let (reply_tx, reply_rx) = oneshot::channel();

    let command = match parse_command(line, reply_tx) {
        Ok(cmd) => cmd,
        Err(e) => {
            writer.write_all(format!("err: {}\n", e).as_bytes()).await?;
            return Ok(());
        }
    };

    cmd_tx
        .send(command)
        .await
        .map_err(|_| anyhow::anyhow!("Render loop has shut down"))?;

    let response = reply_rx
        .await
        .unwrap_or_else(|_| "err: internal error".to_string());

    writer.write_all(format!("{}\n", response).as_bytes()).await?;
    Ok(())
}

/// Start the IPC server, listening for commands on a Unix socket
pub async fn start_server(cmd_tx: mpsc::Sender<IpcCommand>) -> Result<()> {
    let path = socket_path();

    // Remove stale socket from previous run
    let _ = std::fs::remove_file(&path);

    let listener = UnixListener::bind(&path).context("Failed to bind IPC socket")?;

    info!("IPC server listening on {}", path.display());

    loop {
        let (stream, _) = listener.accept().await?;
        let cmd_tx = cmd_tx.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_client(stream, cmd_tx).await {
                debug!("IPC client error: {}", e);
            }
        });
    }
}

/// Send a command to a running rondo instance (client mode)
pub async fn send_command(line: &str) -> Result<String> {
    let path = socket_path();

    let stream = tokio::time::timeout(
        std::time::Duration::from_secs(2),
        UnixStream::connect(&path),
    )
    .await
    .context("Connection timed out")?
    .context("Could not connect to rondo. Is it running?")?;

    let (reader, mut writer) = stream.into_split();

    writer.write_all(format!("{}\n", line).as_bytes()).await?;
    writer.shutdown().await?;

    let mut buf_reader = BufReader::new(reader);
    let mut response = String::new();

    tokio::time::timeout(
        std::time::Duration::from_secs(2),
        buf_reader.read_line(&mut response),
    )
    .await
    .context("Response timed out")?
    .context("Failed to read response")?;

    Ok(response.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn command_config() -> Config {
        let mut config = Config::default();
        config.motion.tick_ms = 0;
        config.motion.snap = false;
        config
    }

    async fn run_command(
        carousel: &Roundabout,
        scheme: &mut ColorScheme,
        line: &str,
    ) -> String {
        let (reply_tx, reply_rx) = oneshot::channel();
        let cmd = parse_command(line, reply_tx).unwrap();
        process_ipc_command(cmd, carousel, scheme);
        reply_rx.await.unwrap()
    }

    #[tokio::test]
    async fn commands_drive_the_carousel() {
        let (carousel, _rx) = Roundabout::new(&command_config()).unwrap();
        let mut scheme = ColorScheme::Spectrum;

        let reply = run_command(&carousel, &mut scheme, "index 2").await;
        assert_eq!(reply, "ok: stepped 2");
        assert_eq!(carousel.nearest_index(0.0), Some(6));

        let reply = run_command(&carousel, &mut scheme, "ping").await;
        assert_eq!(reply, "ok: pong");

        let reply = run_command(&carousel, &mut scheme, "status").await;
        assert!(reply.starts_with("ok: items=8"));
    }

    #[tokio::test]
    async fn bad_radius_reports_an_error_reply() {
        let (carousel, _rx) = Roundabout::new(&command_config()).unwrap();
        let mut scheme = ColorScheme::Spectrum;
        let reply = run_command(&carousel, &mut scheme, "radius -5").await;
        assert!(reply.starts_with("err:"));
    }

    #[test]
    fn unknown_commands_are_rejected() {
        let (reply_tx, _reply_rx) = oneshot::channel();
        assert!(parse_command("warp 9", reply_tx).is_err());
    }
}
