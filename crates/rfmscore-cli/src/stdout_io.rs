use std::io::{self, Write};

/// Writes to stdout, treating a closed pipe (`rfmscore score ... | head`) as
/// success.
pub fn write_stdout_text(text: &str) -> io::Result<()> {
    write_tolerating_broken_pipe(&mut io::stdout().lock(), text.as_bytes())
}

pub fn write_stdout_line(text: &str) -> io::Result<()> {
    let mut line = String::with_capacity(text.len() + 1);
    line.push_str(text);
    line.push('\n');
    write_stdout_text(&line)
}

fn write_tolerating_broken_pipe(writer: &mut dyn Write, bytes: &[u8]) -> io::Result<()> {
    match writer.write_all(bytes).and_then(|()| writer.flush()) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};

    use super::write_tolerating_broken_pipe;

    struct ClosedPipe(io::ErrorKind);

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(self.0))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn broken_pipe_is_not_an_error() {
        let mut writer = ClosedPipe(io::ErrorKind::BrokenPipe);
        assert!(write_tolerating_broken_pipe(&mut writer, b"rows").is_ok());
    }

    #[test]
    fn other_write_failures_surface() {
        let mut writer = ClosedPipe(io::ErrorKind::PermissionDenied);
        assert!(write_tolerating_broken_pipe(&mut writer, b"rows").is_err());
    }
}
