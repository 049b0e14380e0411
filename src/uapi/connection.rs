use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

use super::protocol::{GetDevice, Request};
use super::Error;

pub struct Connection {
    reader: BufReader<UnixStream>,
    writer: UnixStream,
}

impl Connection {
    pub fn connect<P: AsRef<Path>>(path: P, timeout: Duration) -> std::io::Result<Self> {
        let socket = UnixStream::connect(path)?;
        socket.set_read_timeout(Some(timeout))?;
        socket.set_write_timeout(Some(timeout))?;
        let writer = socket.try_clone()?;
        Ok(Self {
            reader: BufReader::new(socket),
            writer,
        })
    }

    /// Sends a get request and reads the response up to the terminating
    /// empty line.
    pub fn get(&mut self) -> Result<GetDevice, Error> {
        self.writer.write_all(Request::Get.as_bytes())?;
        self.writer.flush()?;

        let mut lines = vec![];
        loop {
            let mut buf = vec![];
            let n = self.reader.read_until(b'\n', &mut buf)?;
            if n == 0 {
                // Some implementations close the socket instead of sending
                // the empty line.
                break;
            }
            let line = String::from_utf8(buf).map_err(|_| Error::InvalidProtocol)?;
            let line = line.trim_end_matches('\n');
            if line.is_empty() {
                break;
            }
            lines.push(line.to_string());
        }

        GetDevice::parse(lines.iter().map(String::as_str))
    }
}
