use std::sync::mpsc::Sender;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::command::{self, Command};

/// Read protocol commands from standard input and forward them to the
/// thread that owns the tray.
///
/// Parse failures are reported and reading continues; end of input ends the
/// task while the tray keeps running.
pub async fn read_commands(tx: Sender<Command>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                match command::parse(&line) {
                    Ok(cmd) => {
                        if tx.send(cmd).is_err() {
                            // The receiving loop is gone; nothing left to do.
                            break;
                        }
                    }
                    Err(e) => log::error!("{:#}", e),
                }
            }
            Ok(None) => {
                log::info!("Standard input closed, no more commands");
                break;
            }
            Err(e) => {
                log::error!("Failed to read from standard input: {}", e);
                break;
            }
        }
    }
}
