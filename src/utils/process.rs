// Tue Jan 13 2026 - Alex

use libc::{c_int, pid_t};
use std::io;
use std::os::unix::io::RawFd;

pub struct ProcessUtils;

impl ProcessUtils {
    /// Puts a pipe descriptor into non-blocking mode so reads return
    /// `WouldBlock` instead of parking the control thread.
    pub fn set_nonblocking(fd: RawFd) -> io::Result<()> {
        let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
        if flags < 0 {
            return Err(io::Error::last_os_error());
        }

        if flags & libc::O_NONBLOCK != 0 {
            return Ok(());
        }

        let result = unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) };
        if result < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    pub fn send_signal(pid: u32, signal: c_int) -> io::Result<()> {
        let result = unsafe { libc::kill(pid as pid_t, signal) };
        if result != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    pub fn terminate(pid: u32) -> io::Result<()> {
        Self::send_signal(pid, libc::SIGTERM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::os::unix::io::AsRawFd;
    use std::os::unix::net::UnixStream;
    use std::process::Command;

    #[test]
    fn test_nonblocking_read_would_block() {
        let (mut reader, mut writer) = UnixStream::pair().unwrap();
        ProcessUtils::set_nonblocking(reader.as_raw_fd()).unwrap();
        ProcessUtils::set_nonblocking(reader.as_raw_fd()).unwrap();

        let mut buf = [0u8; 16];
        let err = reader.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);

        writer.write_all(b"hi").unwrap();
        assert_eq!(reader.read(&mut buf).unwrap(), 2);
    }

    #[test]
    fn test_terminate_stops_child() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();

        ProcessUtils::terminate(child.id()).unwrap();
        let status = child.wait().unwrap();
        assert!(!status.success());
    }
}
