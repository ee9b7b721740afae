//! TCP score ingestion.
//!
//! Game clients that cannot speak HTTP open a plain TCP connection and write
//! scores as decimal integers, one per line. Every score is attributed to the
//! nickname the listener was configured with and goes through
//! [`LeaderboardService::submit_score`] like any HTTP submission. A trailing
//! frame without a newline is accepted when the peer closes the stream.

use std::net::SocketAddr;
use std::time::Duration;

use storage::{LeaderboardService, dto::score::SubmitScoreRequest};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::net::TcpListener;

/// Longest accepted frame, newline excluded
const MAX_FRAME_LEN: usize = 64;

/// Bytes read for one frame: the frame itself plus `\r\n`
const FRAME_READ_LIMIT: usize = MAX_FRAME_LEN + 2;

/// Pause after a failed `accept` so persistent errors such as EMFILE do not
/// spin the loop.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Debug, PartialEq, Eq)]
pub enum Frame {
    Score(i32),
    Empty,
    Malformed(String),
}

pub fn parse_frame(raw: &[u8]) -> Frame {
    let Ok(text) = std::str::from_utf8(raw) else {
        return Frame::Malformed(String::from_utf8_lossy(raw).into_owned());
    };
    let text = text.trim();
    if text.is_empty() {
        return Frame::Empty;
    }
    if text.len() > MAX_FRAME_LEN {
        let prefix: String = text.chars().take(MAX_FRAME_LEN).collect();
        return Frame::Malformed(format!("{prefix}..."));
    }

    match text.parse::<i32>() {
        Ok(score) => Frame::Score(score),
        Err(_) => Frame::Malformed(text.to_string()),
    }
}

/// Accept connections until the listener fails, spawning one task per peer.
pub async fn serve(listener: TcpListener, service: LeaderboardService, nickname: String) {
    loop {
        let Some((stream, peer)) = accepted_or_back_off(listener.accept().await).await else {
            continue;
        };

        let service = service.clone();
        let nickname = nickname.clone();
        tokio::spawn(async move {
            tracing::info!(%peer, "Ingest connection opened");
            match handle_connection(stream, &service, &nickname).await {
                Ok(saved) => tracing::info!(%peer, saved, "Ingest connection closed"),
                Err(e) => tracing::warn!(%peer, "Ingest connection aborted: {}", e),
            }
        });
    }
}

async fn accepted_or_back_off<T>(accepted: std::io::Result<T>) -> Option<T> {
    match accepted {
        Ok(conn) => Some(conn),
        Err(e) => {
            tracing::error!("Ingest listener failed to accept: {}", e);
            tokio::time::sleep(ACCEPT_BACKOFF).await;
            None
        }
    }
}

pub async fn bind(addr: SocketAddr) -> std::io::Result<TcpListener> {
    TcpListener::bind(addr).await
}

/// Read the next frame into `buf`, never holding more than
/// `FRAME_READ_LIMIT` bytes of it. The remainder of an oversized line is
/// skipped up to and including its newline. Returns `None` at end of stream.
pub async fn next_frame<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<Frame>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let read = (&mut *reader)
        .take(FRAME_READ_LIMIT as u64)
        .read_until(b'\n', buf)
        .await?;
    if read == 0 {
        return Ok(None);
    }

    if read == FRAME_READ_LIMIT && !buf.ends_with(b"\n") {
        discard_line(reader).await?;
        let prefix = String::from_utf8_lossy(&buf[..MAX_FRAME_LEN]);
        return Ok(Some(Frame::Malformed(format!("{prefix}..."))));
    }

    Ok(Some(parse_frame(buf)))
}

async fn discard_line<R>(reader: &mut R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(());
        }

        let newline = available.iter().position(|b| *b == b'\n');
        match newline {
            Some(newline) => {
                reader.consume(newline + 1);
                return Ok(());
            }
            None => {
                let len = available.len();
                reader.consume(len);
            }
        }
    }
}

/// Read frames until EOF and submit each valid one. Returns the number of
/// scores saved.
pub async fn handle_connection<R>(
    stream: R,
    service: &LeaderboardService,
    nickname: &str,
) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    let mut saved = 0;

    while let Some(frame) = next_frame(&mut reader, &mut buf).await? {
        match frame {
            Frame::Score(score) => {
                let request = SubmitScoreRequest::new(nickname, score);
                match service.submit_score(&request).await {
                    Ok(entry) => {
                        tracing::info!(id = entry.id, nickname, score, "Saved ingested score");
                        saved += 1;
                    }
                    Err(e) => tracing::error!(nickname, score, "Failed to save ingested score: {}", e),
                }
            }
            Frame::Empty => {}
            Frame::Malformed(text) => tracing::warn!("Skipping malformed score frame: {:?}", text),
        }
    }

    Ok(saved)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use storage::{MemoryStore, dto::score::RankedScore};
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpStream;

    use super::*;

    #[test]
    fn test_parse_frame() {
        assert_eq!(parse_frame(b"120"), Frame::Score(120));
        assert_eq!(parse_frame(b" -7\r\n"), Frame::Score(-7));
        assert_eq!(parse_frame(b"\n"), Frame::Empty);
        assert_eq!(parse_frame(b"12.5\n"), Frame::Malformed("12.5".into()));
        assert_eq!(parse_frame(b"abc"), Frame::Malformed("abc".into()));
        assert!(matches!(parse_frame(b"99999999999"), Frame::Malformed(_)));
        assert!(matches!(parse_frame(&[0xff, 0xfe]), Frame::Malformed(_)));
    }

    #[tokio::test]
    async fn test_failed_accept_waits_before_retrying() {
        let started = std::time::Instant::now();
        let failed: std::io::Result<()> = Err(std::io::Error::other("too many open files"));

        assert!(accepted_or_back_off(failed).await.is_none());
        assert!(started.elapsed() >= ACCEPT_BACKOFF);

        assert_eq!(accepted_or_back_off(Ok(5)).await, Some(5));
    }

    #[tokio::test]
    async fn test_oversized_frame_is_rejected_without_buffering_it() {
        let endless_line = tokio::io::repeat(b'1').take(8 * 1024 * 1024);
        let mut reader = BufReader::new(endless_line.chain(&b"\n42\n"[..]));
        let mut buf = Vec::new();

        let frame = next_frame(&mut reader, &mut buf).await.unwrap();
        assert!(matches!(frame, Some(Frame::Malformed(_))));
        assert!(buf.len() <= FRAME_READ_LIMIT);
        assert!(buf.capacity() < 1024);

        let frame = next_frame(&mut reader, &mut buf).await.unwrap();
        assert_eq!(frame, Some(Frame::Score(42)));
        assert_eq!(next_frame(&mut reader, &mut buf).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_connection_survives_oversized_frame() {
        let store = Arc::new(MemoryStore::new());
        let service = LeaderboardService::new(store.clone());

        let input = (&b"7\n"[..])
            .chain(tokio::io::repeat(b'9').take(1024 * 1024))
            .chain(&b"\n15"[..]);
        let saved = handle_connection(input, &service, "Dave").await.unwrap();

        assert_eq!(saved, 2);
        assert_eq!(service.list_top_scores().await.unwrap()[0].score, 15);
    }

    #[tokio::test]
    async fn test_unterminated_frame_is_saved_at_eof() {
        let store = Arc::new(MemoryStore::new());
        let service = LeaderboardService::new(store.clone());

        let saved = handle_connection(&b"120"[..], &service, "Alice")
            .await
            .unwrap();

        assert_eq!(saved, 1);
        assert_eq!(
            service.list_top_scores().await.unwrap(),
            vec![RankedScore {
                nickname: "Alice".into(),
                score: 120
            }]
        );
    }

    #[tokio::test]
    async fn test_malformed_frames_are_skipped() {
        let store = Arc::new(MemoryStore::new());
        let service = LeaderboardService::new(store.clone());

        let saved = handle_connection(&b"10\nnope\n\n30\n"[..], &service, "Bob")
            .await
            .unwrap();

        assert_eq!(saved, 2);
        assert_eq!(store.len().await, 2);
        assert_eq!(service.list_top_scores().await.unwrap()[0].score, 30);
    }

    #[tokio::test]
    async fn test_scores_over_tcp() {
        let store = Arc::new(MemoryStore::new());
        let service = LeaderboardService::new(store.clone());

        let listener = bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stream_tx, stream_rx) = tokio::sync::oneshot::channel();
        let server_service = service.clone();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let saved = handle_connection(stream, &server_service, "Carol")
                .await
                .unwrap();
            stream_tx.send(saved).unwrap();
        });

        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(b"55\n70").await.unwrap();
        client.shutdown().await.unwrap();
        drop(client);

        assert_eq!(stream_rx.await.unwrap(), 2);
        assert_eq!(
            service.list_top_scores().await.unwrap(),
            vec![RankedScore {
                nickname: "Carol".into(),
                score: 70
            }]
        );
    }
}
