#![no_main]

use libfuzzer_sys::fuzz_target;
use retrace_syntax::parser::{parse_entry, parse_with_config, EntryPoint};
use retrace_syntax::{EmptyLoopPolicy, ParserConfig};

const MAX_SOURCE_BYTES: usize = 4096;

const ENTRIES: [EntryPoint; 4] = [
    EntryPoint::SourceFile,
    EntryPoint::ObjectPath,
    EntryPoint::Expression,
    EntryPoint::Condition,
];

fn decode_source(bytes: &[u8]) -> String {
    let capped = &bytes[..bytes.len().min(MAX_SOURCE_BYTES)];
    String::from_utf8_lossy(capped).into_owned()
}

fuzz_target!(|data: &[u8]| {
    let Some((&seed, rest)) = data.split_first() else {
        return;
    };
    let source = decode_source(rest);
    let entry = ENTRIES[usize::from(seed) % ENTRIES.len()];

    let parse = parse_entry(&source, entry);
    assert_eq!(parse.syntax().text().to_string(), source);
    for error in parse.errors() {
        assert!(error.range.end() <= parse.syntax().text_range().end());
    }

    // Tight limits must still terminate and cover the input.
    let config = ParserConfig {
        max_depth: usize::from(seed % 16) + 1,
        empty_loop: EmptyLoopPolicy::Report,
        debug_checks: true,
    };
    let limited = parse_with_config(&source, entry, &config);
    assert_eq!(limited.syntax().text().to_string(), source);
});
