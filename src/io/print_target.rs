use std::fs::File;
use std::io::{self, Write};

/// Destination of the verbose output of a solver.
///
/// Output goes to stdout unless redirected through
/// [`ConfigurablePrintTarget`].
#[derive(Default)]
pub(crate) enum PrintTarget {
    #[default]
    Stdout,
    File(File),
    Buffer(Vec<u8>),
    Stream(Box<dyn Write + Send + Sync>),
    Sink,
}

impl PrintTarget {
    // the writer behind this target, if output is kept at all
    fn writer(&mut self) -> Option<Box<dyn Write + '_>> {
        match self {
            PrintTarget::Stdout => Some(Box::new(io::stdout().lock())),
            PrintTarget::File(file) => Some(Box::new(file)),
            PrintTarget::Buffer(buffer) => Some(Box::new(buffer)),
            PrintTarget::Stream(stream) => Some(Box::new(stream)),
            PrintTarget::Sink => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            PrintTarget::Stdout => "stdout",
            PrintTarget::File(_) => "file",
            PrintTarget::Buffer(_) => "buffer",
            PrintTarget::Stream(_) => "stream",
            PrintTarget::Sink => "sink",
        }
    }
}

impl std::fmt::Debug for PrintTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PrintTarget({})", self.name())
    }
}

impl Write for PrintTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.writer() {
            Some(mut w) => w.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.writer() {
            Some(mut w) => w.flush(),
            None => Ok(()),
        }
    }
}

/// Redirection of the verbose output of a solver
pub trait ConfigurablePrintTarget {
    /// write to stdout, the default
    fn print_to_stdout(&mut self);
    /// write to an open file
    fn print_to_file(&mut self, file: File);
    /// write to any stream
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>);
    /// discard all output
    fn print_to_sink(&mut self);
    /// collect output in memory, see [`get_print_buffer`](ConfigurablePrintTarget::get_print_buffer)
    fn print_to_buffer(&mut self);
    /// Text collected since [`print_to_buffer`](ConfigurablePrintTarget::print_to_buffer).
    /// Fails if output is not being collected.
    fn get_print_buffer(&mut self) -> io::Result<String>;
}

impl ConfigurablePrintTarget for PrintTarget {
    fn print_to_stdout(&mut self) {
        *self = PrintTarget::Stdout;
    }

    fn print_to_file(&mut self, file: File) {
        *self = PrintTarget::File(file);
    }

    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        *self = PrintTarget::Stream(stream);
    }

    fn print_to_sink(&mut self) {
        *self = PrintTarget::Sink;
    }

    fn print_to_buffer(&mut self) {
        *self = PrintTarget::Buffer(Vec::new());
    }

    fn get_print_buffer(&mut self) -> io::Result<String> {
        match self {
            PrintTarget::Buffer(buffer) => Ok(String::from_utf8_lossy(buffer).into_owned()),
            other => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("output goes to {}, not a buffer", other.name()),
            )),
        }
    }
}
