use super::SOCKET_PATH;
use crate::events::AppEvent;
use async_channel::Sender;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixListener;

/// Whether another process is accepting connections on `path`.
pub fn socket_in_use(path: &Path) -> bool {
    std::os::unix::net::UnixStream::connect(path).is_ok()
}

/// Makes `path` free to bind. Returns false if a live instance already owns it; a stale socket
/// file from a previous run is removed.
fn claim_socket(path: &Path) -> bool {
    if std::fs::metadata(path).is_err() {
        return true;
    }
    if socket_in_use(path) {
        return false;
    }
    if let Err(e) = std::fs::remove_file(path) {
        log::warn!("Failed to remove stale socket {}: {}", path.display(), e);
    }
    true
}

pub async fn run_server(tx: Sender<AppEvent>) {
    if !claim_socket(Path::new(SOCKET_PATH)) {
        log::error!("Another rota instance is listening on {}", SOCKET_PATH);
        return;
    }

    let listener = match UnixListener::bind(SOCKET_PATH) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket: {}", e);
            return;
        }
    };
    log::debug!("Listening for commands on {}", SOCKET_PATH);

    loop {
        match listener.accept().await {
            Ok((mut stream, _)) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let reader = BufReader::new(&mut stream);
                    let mut lines = reader.lines();

                    while let Ok(Some(line)) = lines.next_line().await {
                        match AppEvent::from_command(&line) {
                            Some(event) => {
                                if tx.send(event).await.is_err() {
                                    break;
                                }
                            }
                            None => log::warn!("Unknown command: {:?}", line.trim()),
                        }
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}
