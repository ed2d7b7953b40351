#![no_main]

use std::collections::VecDeque;

use libfuzzer_sys::fuzz_target;
use iocore::{Buffer, BufferConfig};

fuzz_target!(|data: Vec<u8>| {
    if data.len() < 2 {
        return;
    }

    // First two bytes pick the configuration
    let config = BufferConfig::new(data[0] as usize + 1, data[1] as usize)
        .with_max_capacity(Some(64 * 1024));
    let buffer = Buffer::with_config(config).unwrap();
    let mut model: VecDeque<u8> = VecDeque::new();

    // Remaining bytes are (opcode, argument) pairs
    for op in data[2..].chunks_exact(2) {
        let arg = op[1] as usize;
        let mut guard = buffer.lock();
        match op[0] % 4 {
            0 => {
                let payload = vec![op[1]; arg];
                if guard.write(&payload).is_ok() {
                    model.extend(&payload);
                }
            }
            1 => {
                guard.consume(arg);
                model.drain(..arg.min(model.len()));
            }
            2 => match guard.read(arg) {
                Ok(view) => {
                    let expected: Vec<u8> = model.drain(..arg).collect();
                    assert_eq!(view.as_bytes(), &expected[..]);
                }
                Err(_) => assert!(arg > model.len()),
            },
            _ => {
                let before = guard.to_slice().to_bytes();
                let pos = guard.read_pos();
                guard.consume(arg);
                if pos.index() > 0 {
                    guard.rewind_to(pos).unwrap();
                    assert_eq!(guard.to_slice().to_bytes(), before);
                } else {
                    model.drain(..arg.min(model.len()));
                }
            }
        }

        assert!(guard.read_index() <= guard.write_index());
        assert!(guard.write_index() <= guard.capacity());
        assert!(guard.to_slice().iter().eq(model.iter()));
    }
});
