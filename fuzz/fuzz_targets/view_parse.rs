#![no_main]

use libfuzzer_sys::fuzz_target;
use iocore::View;

fuzz_target!(|data: Vec<u8>| {
    // Tokenizing must cover the input exactly
    let mut view = View::new(&data);
    let mut seen = 0;
    while !view.is_empty() {
        let before = view.len();
        let line = view.eat_line();
        let mut words = line;
        while !words.eat_word().is_empty() {}
        assert!(words.trim_space().is_empty());

        if line.len() == before {
            break;
        }
        // skip the terminator the line stopped at
        let terminator = view.eat(1).unwrap();
        assert!(terminator == "\r" || terminator == "\n");
        seen += line.len() + 1;
    }
    assert!(seen <= data.len());

    // Split never yields the separator and joins back to the input
    if let Some(&separator) = data.first() {
        let parts: Vec<&[u8]> = View::new(&data[1..]).split(separator).map(|v| v.as_bytes()).collect();
        for part in &parts {
            assert!(!part.contains(&separator));
        }
        let joined = parts.join(&[separator][..]);
        let rest = &data[1..];
        let expected = rest.strip_suffix(&[separator]).unwrap_or(rest);
        assert_eq!(joined, expected);
    }

    // sub and eat reject out-of-range requests instead of panicking
    let full = View::new(&data);
    for n in [0, 1, data.len() / 2, data.len(), data.len() + 1] {
        let mut probe = full;
        assert_eq!(probe.eat(n).is_ok(), n <= data.len());
        assert_eq!(full.sub(n, n).is_ok(), n.saturating_mul(2) <= data.len());
    }
});
