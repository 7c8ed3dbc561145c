#![no_main]
use std::cell::Cell;

use boundfmt_core::{Arg, RenderMode, SliceCursor, try_render};
use libfuzzer_sys::fuzz_target;

// Layout: [capacity, mode, arg_count, template_len, template..., arg bytes...]
fuzz_target!(|data: &[u8]| {
    let [capacity, mode, arg_count, template_len, rest @ ..] = data else {
        return;
    };
    let capacity = usize::from(*capacity);
    let mode = if mode & 1 == 0 {
        RenderMode::Compat
    } else {
        RenderMode::Strict
    };
    let split = usize::from(*template_len).min(rest.len());
    let (template, mut arg_bytes) = rest.split_at(split);

    let counter = Cell::new(0);
    let mut args = Vec::new();
    for _ in 0..(arg_count % 16) {
        let Some((&tag, tail)) = arg_bytes.split_first() else {
            break;
        };
        let mut word = [0u8; 8];
        let take = tail.len().min(8);
        word[..take].copy_from_slice(&tail[..take]);
        let raw = u64::from_le_bytes(word);
        args.push(match tag % 6 {
            0 => Arg::Int(raw as i64),
            1 => Arg::Uint(raw),
            2 => Arg::Double(f64::from_bits(raw)),
            3 => Arg::Str(&tail[..take]),
            4 => Arg::Null,
            _ => Arg::Count(&counter),
        });
        arg_bytes = &tail[take..];
    }

    let mut buf = vec![0xAAu8; capacity + 8];
    let result = try_render(
        &mut buf[..capacity],
        template,
        &mut SliceCursor::new(&args),
        mode,
    );
    match result {
        Ok(r) => {
            assert!(r < capacity);
            assert_eq!(buf[r], 0);
        }
        Err(_) => {
            if capacity > 0 {
                assert!(buf[..capacity].contains(&0));
            }
        }
    }
    assert!(buf[capacity..].iter().all(|&b| b == 0xAA));
    if let Ok(n) = usize::try_from(counter.get()) {
        assert!(n < capacity.max(1));
    }
});
