// Property tests for Buffer and View
// Tests cover: round trips, cursor invariants under arbitrary operation
// sequences, split reconstruction, prefix/suffix agreement, checkpoints

use std::collections::VecDeque;

use iocore::{Buffer, BufferConfig, View};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Write(Vec<u8>),
    Consume(usize),
    Read(usize),
    Checkpoint(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => prop::collection::vec(any::<u8>(), 0..48).prop_map(Op::Write),
        2 => (0usize..64).prop_map(Op::Consume),
        2 => (0usize..64).prop_map(Op::Read),
        1 => (0usize..16).prop_map(Op::Checkpoint),
    ]
}

proptest! {
    // ========================================================================
    // Buffer
    // ========================================================================

    #[test]
    fn prop_write_then_read_round_trips(data in prop::collection::vec(any::<u8>(), 0..4096)) {
        let buffer = Buffer::new();
        buffer.write(&data).unwrap();
        let out = buffer.read(data.len()).unwrap();
        prop_assert_eq!(&out[..], &data[..]);
        prop_assert!(buffer.is_empty());
    }

    #[test]
    fn prop_round_trip_after_prior_traffic(
        prior in prop::collection::vec(any::<u8>(), 0..256),
        consumed in 0usize..300,
        data in prop::collection::vec(any::<u8>(), 0..512),
    ) {
        let buffer = Buffer::with_config(BufferConfig::new(32, 16)).unwrap();
        buffer.write(&prior).unwrap();
        buffer.consume(consumed);
        let leftover = prior.len().saturating_sub(consumed);

        buffer.write(&data).unwrap();
        buffer.consume(leftover);
        prop_assert_eq!(&buffer.read(data.len()).unwrap()[..], &data[..]);
    }

    #[test]
    fn prop_cursor_invariant_holds_for_any_sequence(
        initial in 1usize..64,
        threshold in 0usize..64,
        ops in prop::collection::vec(op(), 0..64),
    ) {
        let buffer = Buffer::with_config(BufferConfig::new(initial, threshold)).unwrap();
        let mut model: VecDeque<u8> = VecDeque::new();

        for op in ops {
            let mut guard = buffer.lock();
            match op {
                Op::Write(data) => {
                    guard.write(&data).unwrap();
                    model.extend(&data);
                }
                Op::Consume(n) => {
                    guard.consume(n);
                    model.drain(..n.min(model.len()));
                }
                Op::Read(n) => {
                    let available = guard.len();
                    match guard.read(n) {
                        Ok(view) => {
                            let expected: Vec<u8> = model.drain(..n).collect();
                            prop_assert_eq!(view.as_bytes(), &expected[..]);
                        }
                        Err(_) => prop_assert!(n > available),
                    }
                }
                Op::Checkpoint(n) => {
                    let before = guard.to_slice().to_bytes();
                    let pos = guard.read_pos();
                    guard.consume(n);
                    if pos.index() > 0 {
                        guard.rewind_to(pos).unwrap();
                        prop_assert_eq!(guard.to_slice().to_bytes(), before);
                    } else {
                        model.drain(..n.min(model.len()));
                    }
                }
            }

            prop_assert!(guard.read_index() <= guard.write_index());
            prop_assert!(guard.write_index() <= guard.capacity());
            prop_assert_eq!(guard.len(), model.len());
            prop_assert!(guard.to_slice().iter().eq(model.iter()));
        }
    }

    #[test]
    fn prop_read_pos_then_rewind_restores_slice(
        data in prop::collection::vec(any::<u8>(), 1..256),
        skip in 1usize..256,
        advance in 0usize..256,
    ) {
        let buffer = Buffer::new();
        buffer.write(&data).unwrap();
        buffer.consume(skip);

        let before = buffer.peek();
        let pos = buffer.read_pos();
        buffer.consume(advance);
        buffer.rewind_to(pos).unwrap();
        prop_assert_eq!(buffer.peek(), before);
    }

    // ========================================================================
    // View
    // ========================================================================

    #[test]
    fn prop_split_join_reconstructs(input in "[a-c,]{0,32}") {
        let joined = View::from(input.as_str())
            .split(b',')
            .map(|v| v.as_bytes())
            .collect::<Vec<_>>()
            .join(&b","[..]);
        let expected = input.strip_suffix(',').unwrap_or(&input);
        prop_assert_eq!(joined, expected.as_bytes());
    }

    #[test]
    fn prop_split_never_yields_separator(
        input in prop::collection::vec(any::<u8>(), 0..128),
        separator in any::<u8>(),
    ) {
        for part in View::new(&input).split(separator) {
            prop_assert!(!part.contains(&separator));
        }
    }

    #[test]
    fn prop_prefix_suffix_match_byte_ranges(
        input in prop::collection::vec(any::<u8>(), 0..64),
        probe in prop::collection::vec(any::<u8>(), 0..8),
    ) {
        let view = View::new(&input);
        for n in 0..=input.len() {
            prop_assert!(view.starts_with(&input[..n]));
            prop_assert!(view.ends_with(&input[input.len() - n..]));
        }

        let direct_prefix = input.len() >= probe.len() && input[..probe.len()] == probe[..];
        let direct_suffix =
            input.len() >= probe.len() && input[input.len() - probe.len()..] == probe[..];
        prop_assert_eq!(view.starts_with(&probe), direct_prefix);
        prop_assert_eq!(view.ends_with(&probe), direct_suffix);
    }

    #[test]
    fn prop_words_never_contain_space(input in "[ a-z\t\r\n]{0,64}") {
        let mut view = View::from(input.as_str());
        loop {
            let word = view.eat_word();
            if word.is_empty() {
                break;
            }
            prop_assert!(!word.iter().any(|b| b.is_ascii_whitespace()));
        }
        prop_assert!(view.trim_space().is_empty());
    }
}
