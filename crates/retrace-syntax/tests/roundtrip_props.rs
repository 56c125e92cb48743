use proptest::prelude::*;

use retrace_syntax::lexer::lex;
use retrace_syntax::parser::{parse_entry, EntryPoint};

const ENTRIES: [EntryPoint; 4] = [
    EntryPoint::SourceFile,
    EntryPoint::ObjectPath,
    EntryPoint::Expression,
    EntryPoint::Condition,
];

fn fragment() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "page", "10", ".", " ", "\n", "=", " TEXT", ":=", "addToList", "(", ")", ",", "=<", "<",
        ">", "{", "}", "[", "]", "&&", "||", "==", "+", "-", "!", "@import", "'x.ts'", "# note",
        "/* c */", "$",
    ])
}

fn grammar_like() -> impl Strategy<Value = String> {
    proptest::collection::vec(fragment(), 0..40).prop_map(|parts| parts.concat())
}

fn check(text: &str) -> Result<(), TestCaseError> {
    let expected: Vec<_> = lex(text)
        .into_iter()
        .map(|token| (token.range, &text[token.range]))
        .collect();

    for entry in ENTRIES {
        let parse = parse_entry(text, entry);
        let root = parse.syntax();
        prop_assert_eq!(root.text().to_string(), text, "entry {}", entry);

        let leaves: Vec<_> = root
            .descendants_with_tokens()
            .filter_map(|element| element.into_token())
            .map(|token| (token.text_range(), &text[token.text_range()]))
            .collect();
        prop_assert_eq!(&leaves, &expected, "entry {}", entry);

        for error in parse.errors() {
            prop_assert!(error.range.end() <= root.text_range().end());
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn arbitrary_text_round_trips(text in "\\PC{0,64}") {
        check(&text)?;
    }

    #[test]
    fn grammar_like_text_round_trips(text in grammar_like()) {
        check(&text)?;
    }
}

#[test]
fn empty_input_at_every_entry() {
    for entry in ENTRIES {
        let parse = parse_entry("", entry);
        assert_eq!(parse.syntax().kind(), entry.root_kind());
        let expected = usize::from(entry != EntryPoint::SourceFile);
        assert_eq!(parse.syntax().children().count(), expected, "entry {entry}");
    }
}
