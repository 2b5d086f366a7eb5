//! Quit watcher: reads operator input lines and stops the process on `q`.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::shutdown::Shutdown;

/// The token that stops the process.
pub const QUIT_TOKEN: &str = "q";

/// Why the watcher returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitReason {
    /// The operator entered the quit token
    Requested,
    /// Shutdown was triggered elsewhere
    Shutdown,
    /// Input closed; the pipeline keeps running
    InputClosed,
}

/// Whether an input line is exactly the quit token. Only a carriage return
/// left over from CRLF input is dropped before comparing.
pub fn is_quit(line: &str) -> bool {
    line.trim_end_matches('\r') == QUIT_TOKEN
}

/// Read lines from `input` until the quit token arrives, then trigger
/// `shutdown`. Any other line is ignored.
pub async fn watch_for_quit<R>(input: R, shutdown: Shutdown) -> QuitReason
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        tokio::select! {
            _ = shutdown.wait() => return QuitReason::Shutdown,
            line = lines.next_line() => match line {
                Ok(Some(line)) if is_quit(&line) => {
                    log::info!("Quit requested");
                    shutdown.trigger();
                    return QuitReason::Requested;
                }
                Ok(Some(line)) => {
                    log::debug!("Ignoring input {:?}", line);
                }
                Ok(None) => {
                    log::debug!("Input closed; quit watcher stopping");
                    return QuitReason::InputClosed;
                }
                Err(e) => {
                    log::warn!("Failed to read input: {}", e);
                    return QuitReason::InputClosed;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_quit() {
        assert!(is_quit("q"));
        assert!(is_quit("q\r"));
        assert!(!is_quit("  q "));
        assert!(!is_quit("q "));
        assert!(!is_quit(" q"));
        assert!(!is_quit("Q"));
        assert!(!is_quit("quit"));
        assert!(!is_quit(""));
    }

    #[tokio::test]
    async fn test_quit_token_triggers_shutdown() {
        let shutdown = Shutdown::new();
        let input: &[u8] = b"hello\nq\nignored\n";
        let reason = watch_for_quit(input, shutdown.clone()).await;
        assert_eq!(reason, QuitReason::Requested);
        assert!(shutdown.is_triggered());
    }

    #[tokio::test]
    async fn test_other_input_leaves_pipeline_running() {
        let shutdown = Shutdown::new();
        let input: &[u8] = b"x\nquit\nQ\n";
        let reason = watch_for_quit(input, shutdown.clone()).await;
        assert_eq!(reason, QuitReason::InputClosed);
        assert!(!shutdown.is_triggered());
    }

    #[tokio::test]
    async fn test_returns_when_shutdown_elsewhere() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        let (_keep_open, reader) = tokio::io::duplex(64);
        let reason = watch_for_quit(tokio::io::BufReader::new(reader), shutdown).await;
        assert_eq!(reason, QuitReason::Shutdown);
    }
}
