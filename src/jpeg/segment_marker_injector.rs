use std::io::Write;

/// Stuffs a zero byte after every 0xFF so entropy-coded data never
/// looks like a marker.
pub struct SegmentMarkerInjector<'a, T: Write> {
    writer: &'a mut T,
}

impl<'a, T: Write> SegmentMarkerInjector<'a, T> {
    pub fn new(writer: &'a mut T) -> Self {
        Self { writer }
    }
}

impl<T: Write> Write for SegmentMarkerInjector<'_, T> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        for &byte in buf {
            self.writer.write_all(&[byte])?;
            if byte == 0xFF {
                self.writer.write_all(&[0x00])?;
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}
