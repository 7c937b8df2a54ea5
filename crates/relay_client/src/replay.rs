use std::path::Path;

use shared::protocol::ChatEvent;
use tokio::{
    fs::File,
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, BufReader},
};
use tracing::{info, warn};

use crate::{RelayClient, RelayError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaySummary {
    pub replayed: usize,
    /// Set when an unparsable line stopped the replay early.
    pub aborted: bool,
}

impl<R, W> RelayClient<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Feeds a file of recorded relay lines through [`RelayClient::handle_event`],
    /// exactly as if they had arrived on the connection.
    ///
    /// A file that cannot be opened is skipped with a warning. The first line
    /// that does not parse ends the replay.
    pub async fn replay_file(&mut self, path: &Path) -> Result<ReplaySummary, RelayError> {
        let mut summary = ReplaySummary::default();
        let debug_input_file = path.display().to_string();

        let file = match File::open(path).await {
            Ok(file) => file,
            Err(error) => {
                warn!(%debug_input_file, %error, "failed to open debug input file, ignoring replay");
                return Ok(summary);
            }
        };

        let mut lines = BufReader::new(file).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(error) => {
                    warn!(%debug_input_file, %error, "failed to read debug input file, stopping replay");
                    summary.aborted = true;
                    return Ok(summary);
                }
            };

            let event = match ChatEvent::parse(&line) {
                Ok(event) => event,
                Err(error) => {
                    warn!(%error, %line, "invalid message, ignoring replay");
                    summary.aborted = true;
                    return Ok(summary);
                }
            };

            self.handle_event(event).await?;
            summary.replayed += 1;
            info!(%line, "replayed debug input");
        }

        info!(replayed = summary.replayed, "finished replaying debug input");
        Ok(summary)
    }
}
