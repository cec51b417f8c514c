use mal_reader::{read_many, read_str, MAX_NESTING};
use proptest::prelude::*;

proptest! {
    #[test]
    fn reader_never_panics(input in "\\PC*") {
        // Any arbitrary string should produce Ok or Err, never panic
        let _ = read_str(&input);
    }

    #[test]
    fn reader_many_never_panics(input in "\\PC*") {
        let _ = read_many(&input);
    }
}

fn mal_atom() -> impl Strategy<Value = String> {
    prop_oneof![
        (-1000i64..1000).prop_map(|n| n.to_string()),
        (-100.0f64..100.0).prop_map(|f| format!("{f:.2}")),
        "[a-zA-Z0-9 _]{0,20}".prop_map(|s| format!("\"{s}\"")),
        "[a-z][a-z0-9?!*-]{0,10}",
        "[a-z][a-z0-9-]{0,10}".prop_map(|s| format!(":{s}")),
        Just("true".to_string()),
        Just("false".to_string()),
        Just("nil".to_string()),
    ]
}

fn mal_form(depth: u32) -> impl Strategy<Value = String> {
    if depth == 0 {
        mal_atom().boxed()
    } else {
        prop_oneof![
            mal_atom(),
            prop::collection::vec(mal_form(depth - 1), 0..5)
                .prop_map(|items| format!("({})", items.join(" "))),
            prop::collection::vec(mal_form(depth - 1), 0..5)
                .prop_map(|items| format!("[{}]", items.join(" "))),
            mal_atom().prop_map(|a| format!("'{a}")),
            mal_form(depth - 1).prop_map(|f| format!("`{f}")),
            mal_form(depth - 1).prop_map(|f| format!("~@{f}")),
        ]
        .boxed()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn generated_forms_parse(form in mal_form(3)) {
        read_str(&form).unwrap_or_else(|e| {
            panic!("Failed to parse generated form: {form:?}\nError: {e}")
        });
    }

    #[test]
    fn print_then_read_is_identity(form in mal_form(3)) {
        let value = read_str(&form).unwrap();
        let printed = value.to_string();
        let reread = read_str(&printed).unwrap_or_else(|e| {
            panic!("Failed to re-read {printed:?} (from {form:?})\nError: {e}")
        });
        prop_assert_eq!(reread, value);
    }

    #[test]
    fn read_many_counts_forms(forms in prop::collection::vec(mal_form(2), 1..5)) {
        let input = forms.join(" ");
        let result = read_many(&input).unwrap_or_else(|e| {
            panic!("Failed to parse: {input:?}\nError: {e}")
        });
        prop_assert_eq!(result.len(), forms.len());
    }
}

proptest! {
    #[test]
    fn delimiter_soup_never_panics(
        input in prop::collection::vec(
            prop_oneof![
                Just("("),
                Just(")"),
                Just("["),
                Just("]"),
                Just("{"),
                Just("}"),
                Just(" "),
                Just("~@"),
                Just("^"),
                Just("1"),
                Just(":a"),
                Just("foo"),
            ],
            0..50
        ).prop_map(|v| v.join(""))
    ) {
        let _ = read_many(&input);
    }

    #[test]
    fn string_escapes_never_panic(
        content in prop::collection::vec(
            prop_oneof![
                Just("a".to_string()),
                Just("\\n".to_string()),
                Just("\\\\".to_string()),
                Just("\\\"".to_string()),
                Just(" ".to_string()),
                Just("\\z".to_string()),
            ],
            0..20
        ).prop_map(|v| format!("\"{}\"", v.join("")))
    ) {
        let value = read_str(&content).unwrap();
        prop_assert!(value.as_str().is_some());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn deep_nesting_is_a_reader_error(
        openers in prop::collection::vec(prop::sample::select(vec!['(', '[', '\'', '`', '@']), 1..8),
        extra in 1usize..2000,
    ) {
        let depth = MAX_NESTING + extra;
        let input: String = openers.iter().cycle().take(depth).collect::<String>() + "x";
        let err = read_str(&input).unwrap_err();
        prop_assert!(err.to_string().starts_with("nesting too deep"));
    }
}
