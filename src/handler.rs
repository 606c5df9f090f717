//! TCP connection handler
//!
//! One worker per accepted connection: reads frames, hands decoded commands
//! to the router, and cleans up when the peer leaves or the stream fails.
//! A separate writer task owns the write half and drains the outbound queue.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::message::{split_frames, Command, ServerMessage};
use crate::router::Router;
use crate::types::ClientId;

/// How long queued notifications may take to flush after the read side closes
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle an accepted TCP connection
///
/// The client must already be registered under `client_id`, with `msg_rx`
/// being the receiving end of its outbound queue.
pub async fn handle_connection(
    stream: TcpStream,
    client_id: ClientId,
    msg_rx: mpsc::Receiver<ServerMessage>,
    router: Router,
    config: Arc<ServerConfig>,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    debug!("Worker started for {} ({})", client_id, peer_addr);

    let (mut reader, writer) = stream.into_split();

    // Spawn write task (ServerMessage -> socket)
    let mut write_task = tokio::spawn(write_loop(writer, msg_rx, client_id));
    let mut write_done = false;

    // Read until bye, EOF, error, idle timeout, or the writer giving up
    let result = tokio::select! {
        result = read_loop(&mut reader, client_id, &router, &config) => result,
        _ = &mut write_task => {
            debug!("Write task completed first for {}", client_id);
            write_done = true;
            Ok(())
        }
    };

    // Closing: drop the registry entry (and with it the last queue sender)
    router.depart(client_id);

    if !write_done {
        match timeout(FLUSH_TIMEOUT, &mut write_task).await {
            Ok(_) => {}
            Err(_) => {
                warn!("Client {} did not drain its queue, aborting writer", client_id);
                write_task.abort();
            }
        }
    }

    info!("Client {} disconnected", client_id);

    result
}

/// Read chunks and dispatch the frames they contain
///
/// Returns Ok on a clean close (EOF, `bye`, idle timeout).
async fn read_loop(
    reader: &mut OwnedReadHalf,
    client_id: ClientId,
    router: &Router,
    config: &ServerConfig,
) -> Result<(), AppError> {
    let mut buf = vec![0u8; config.read_buffer_size];

    loop {
        let n = match config.idle_timeout {
            Some(limit) => match timeout(limit, reader.read(&mut buf)).await {
                Ok(read) => read?,
                Err(_) => {
                    info!("Client {} idle for {:?}, closing", client_id, limit);
                    return Ok(());
                }
            },
            None => reader.read(&mut buf).await?,
        };

        if n == 0 {
            debug!("Client {} closed the connection", client_id);
            return Ok(());
        }

        let chunk = String::from_utf8_lossy(&buf[..n]);
        for frame in split_frames(&chunk) {
            debug!("Received({}): {}", client_id, frame);

            match Command::parse(frame) {
                Command::Leave => {
                    info!("Client {} said bye", client_id);
                    return Ok(());
                }
                command => {
                    router.route(client_id, command);
                }
            }
        }
    }
}

/// Drain the outbound queue into the socket
///
/// Ends when every sender is gone (client removed from the registry) or a
/// write fails, then shuts the write half down.
async fn write_loop(
    mut writer: OwnedWriteHalf,
    mut msg_rx: mpsc::Receiver<ServerMessage>,
    client_id: ClientId,
) {
    while let Some(msg) = msg_rx.recv().await {
        if let Err(e) = writer.write_all(msg.to_string().as_bytes()).await {
            debug!("Write to {} failed: {}", client_id, e);
            break;
        }
    }

    let _ = writer.shutdown().await;
    debug!("Write task ended for {}", client_id);
}
