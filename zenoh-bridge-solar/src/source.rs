//! Line-oriented input sources (files, FIFOs, serial devices).

use std::io;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader, ReadBuf};

/// An opened input path.
///
/// Regular files are read through [`tokio::fs::File`]. FIFOs and character
/// devices are opened non-blocking and driven by the reactor, so a reader
/// waiting on an idle bus can be dropped without tying up a blocking thread.
#[derive(Debug)]
pub enum StreamInput {
    File(File),
    #[cfg(unix)]
    Pipe(tokio::net::unix::pipe::Receiver),
}

impl StreamInput {
    async fn open(path: &Path) -> io::Result<Self> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileTypeExt;

            let file_type = tokio::fs::metadata(path).await?.file_type();
            if file_type.is_fifo() || file_type.is_char_device() {
                let receiver = tokio::net::unix::pipe::OpenOptions::new()
                    .unchecked(file_type.is_char_device())
                    .open_receiver(path)?;
                return Ok(Self::Pipe(receiver));
            }
        }

        Ok(Self::File(File::open(path).await?))
    }
}

impl AsyncRead for StreamInput {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::File(file) => Pin::new(file).poll_read(cx, buf),
            #[cfg(unix)]
            Self::Pipe(receiver) => Pin::new(receiver).poll_read(cx, buf),
        }
    }
}

/// Reads a telemetry stream one line at a time.
///
/// Lines are returned with their terminator. Bytes that are not UTF-8 are
/// replaced rather than failing the read, so a noisy serial link only
/// produces undecodable lines.
#[derive(Debug)]
pub struct LineSource<R> {
    reader: R,
    buf: Vec<u8>,
}

impl LineSource<BufReader<StreamInput>> {
    /// Open a file, FIFO or device path for reading.
    ///
    /// A FIFO with no writer attached reads as end of stream.
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let input = StreamInput::open(path).await?;
        tracing::info!(path = %path.display(), "Opened input stream");
        Ok(Self::new(BufReader::new(input)))
    }
}

impl<R: AsyncBufRead + Unpin> LineSource<R> {
    /// Wrap an already open reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(256),
        }
    }

    /// Read the next line, or `None` at end of stream.
    ///
    /// A blank line is `Some("\n")`, not end of stream.
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        self.buf.clear();

        let n = self.reader.read_until(b'\n', &mut self.buf).await?;
        if n == 0 {
            return Ok(None);
        }

        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}
