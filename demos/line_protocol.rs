//! Line protocol parsing example.
//!
//! Feeds a simulated socket into a Buffer in small reads and parses complete
//! `COMMAND arg...` lines as they arrive, leaving partial lines buffered.
//!
//! Run with:
//!     RUST_LOG=iocore=trace cargo run --example line_protocol

use std::io::Read;

use iocore::{Buffer, BufferConfig};
use tracing_subscriber::EnvFilter;

/// A reader that hands out at most `step` bytes per call.
struct Trickle<'a> {
    data: &'a [u8],
    step: usize,
}

impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.step.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let input = b"SET alpha 1\r\nSET beta 22\r\nGET alpha\r\nDEL beta\r\nGET be";
    let mut socket = Trickle {
        data: input,
        step: 7,
    };

    // Small buffer with a low threshold so compaction shows up in the trace
    let buffer = Buffer::with_config(BufferConfig::new(16, 8))?;
    let mut commands = 0;

    loop {
        let n = buffer.fill_from(&mut socket, 32)?;

        let mut guard = buffer.lock();
        loop {
            let pending = guard.to_slice();
            let mut rest = pending;
            let line = rest.eat_line();
            if rest.is_empty() || rest == "\r" {
                // no complete terminator yet; wait for more bytes
                break;
            }
            let mut words = line;
            let command = words.eat_word();
            let args: Vec<String> = std::iter::from_fn(|| Some(words.eat_word()))
                .take_while(|w| !w.is_empty())
                .map(|w| w.to_string())
                .collect();
            if !command.is_empty() {
                println!("{:<4} {:?}", command.to_string(), args);
                commands += 1;
            }

            let terminator = if rest.starts_with("\r\n") { 2 } else { 1 };
            let consumed = line.len() + terminator;
            guard.consume(consumed);
        }

        if n == 0 {
            break;
        }
    }

    let leftover = buffer.peek();
    println!(
        "\n{} commands parsed, {} bytes left buffered: {:?}",
        commands,
        leftover.len(),
        String::from_utf8_lossy(&leftover)
    );
    Ok(())
}
