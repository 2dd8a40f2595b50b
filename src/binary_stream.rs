use std::io;
use std::io::Write;

/// State for writing individual bits to a Writer, most significant bit first.
pub struct BitWriter<'a, T: Write> {
    /// the underlying output stream
    writer: &'a mut T,
    /// bits not yet written, left aligned
    buffer: u8,
    /// how many bits of `buffer` are in use
    buffer_space_used: u8,
}

impl<'a, T: Write> BitWriter<'a, T> {
    pub fn new(writer: &'a mut T) -> BitWriter<'a, T> {
        BitWriter {
            writer,
            buffer: 0,
            buffer_space_used: 0,
        }
    }

    /// Writes the `length` low bits of `code`, highest first.
    pub fn write_bits(&mut self, code: u16, length: u8) -> io::Result<()> {
        debug_assert!(length <= 16, "at most 16 bits per call");
        for bit_index in (0..length).rev() {
            let bit_val = (code >> bit_index) & 1 == 1;
            if bit_val {
                self.buffer |= 0b1000_0000 >> self.buffer_space_used;
            }
            self.buffer_space_used += 1;
            if self.buffer_space_used == 8 {
                self.writer.write_all(&[self.buffer])?;
                self.buffer_space_used = 0;
                self.buffer = 0;
            }
        }
        Ok(())
    }

    /// Pads an incomplete last byte with one bits, as entropy-coded
    /// segments require, and flushes the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        if self.buffer_space_used != 0 {
            let padding = 8 - self.buffer_space_used;
            self.write_bits((1 << padding) - 1, padding)?;
        }
        self.writer.flush()
    }
}
