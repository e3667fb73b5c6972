//! Local serial console transport.

/// Byte-at-a-time serial port for the local command line.
pub trait SerialPort {
    /// Read one pending byte, or `None` when the receive buffer is empty.
    /// Must not block: the main loop polls this every iteration.
    fn read_byte(&mut self) -> Option<u8>;

    /// Write a reply line (the implementation appends its own line ending).
    fn write_line(&mut self, line: &str);
}
