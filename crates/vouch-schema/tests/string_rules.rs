//! # String Rule Behavior
//!
//! End-to-end checks of the string schema: literal handling, the type check,
//! conversion order, length limits and the character-class tests. Every
//! failure asserts the full rendered message, since messages are part of the
//! public contract.

use serde_json::{json, Value};
use vouch_schema::{ErrorKind, Pattern, Schema, SchemaBuilder, ValidationOptions};

/// Validate each case; `None` expects success, `Some` the failure message.
fn check_with<S: SchemaBuilder>(
    schema: &S,
    options: &ValidationOptions,
    cases: &[(Value, Option<&str>)],
) {
    for (value, expected) in cases {
        let result = schema.validate_with(value.clone(), options);
        match expected {
            None => assert!(result.is_ok(), "{value} should pass: {:?}", result.error),
            Some(message) => {
                let error = result
                    .error
                    .unwrap_or_else(|| panic!("{value} should fail with {message}"));
                assert_eq!(error.message, *message, "input {value}");
            }
        }
    }
}

fn check<S: SchemaBuilder>(schema: &S, cases: &[(Value, Option<&str>)]) {
    check_with(schema, &ValidationOptions::default(), cases);
}

/// Validate `input` successfully and return the converted value.
fn converted<S: SchemaBuilder>(schema: &S, input: &str) -> Value {
    let result = schema.validate(json!(input));
    assert!(result.is_ok(), "{input:?} should pass: {:?}", result.error);
    result.value.unwrap()
}

fn strict() -> ValidationOptions {
    ValidationOptions::default().convert(false)
}

const NOT_A_STRING: Option<&str> = Some("\"value\" must be a string");

#[test]
fn test_rejects_non_strings() {
    check(
        &Schema::string(),
        &[
            (json!(true), NOT_A_STRING),
            (json!(false), NOT_A_STRING),
            (json!(123), NOT_A_STRING),
            (json!(0), NOT_A_STRING),
            (Value::Null, NOT_A_STRING),
            (json!("123"), None),
            (json!("0"), None),
        ],
    );
}

#[test]
fn test_absent_and_empty() {
    let optional = Schema::string();
    assert!(optional.validate(None).is_ok());
    assert_eq!(optional.validate(None).value, None);
    check(
        &optional,
        &[(json!(""), Some("\"value\" is not allowed to be empty"))],
    );

    let required = Schema::string().required();
    assert_eq!(
        required.validate(None).error.unwrap().message,
        "\"value\" is required"
    );
    check(
        &required,
        &[
            (json!(""), Some("\"value\" is not allowed to be empty")),
            (json!("test"), None),
        ],
    );
}

#[test]
fn test_empty_string_can_be_allowed() {
    check(&Schema::string().allow([""]), &[(json!(""), None)]);
}

#[test]
fn test_valid_values_case_sensitive() {
    check(
        &Schema::string().valid(["a", "b"]),
        &[
            (json!("a"), None),
            (json!("b"), None),
            (json!("A"), Some("\"value\" must be one of [a, b]")),
            (json!("B"), Some("\"value\" must be one of [a, b]")),
        ],
    );
}

#[test]
fn test_valid_values_insensitive_keep_input() {
    let schema = Schema::string().valid(["a", "b"]).insensitive();
    assert_eq!(converted(&schema, "A"), json!("A"));
    assert_eq!(converted(&schema, "b"), json!("b"));
    check(&schema, &[(json!("c"), Some("\"value\" must be one of [a, b]"))]);
}

#[test]
fn test_invalid_values() {
    check(
        &Schema::string().invalid(["a", "b", "c"]),
        &[
            (json!("x"), None),
            (json!("a"), Some("\"value\" contains an invalid value")),
            (json!("c"), Some("\"value\" contains an invalid value")),
        ],
    );
}

#[test]
fn test_allowed_null_bypasses_rules() {
    check(&Schema::string().min(3).unwrap().allow([Value::Null]), &[(Value::Null, None)]);
}

#[test]
fn test_length_limits() {
    check(
        &Schema::string().min(3).unwrap(),
        &[
            (json!("test"), None),
            (json!("0"), Some("\"value\" length must be at least 3 characters long")),
            (Value::Null, NOT_A_STRING),
        ],
    );
    check(
        &Schema::string().max(3).unwrap(),
        &[
            (
                json!("test"),
                Some("\"value\" length must be less than or equal to 3 characters long"),
            ),
            (json!("0"), None),
        ],
    );
    check(
        &Schema::string().length(3).unwrap(),
        &[
            (json!("test"), Some("\"value\" length must be 3 characters long")),
            (json!("0"), Some("\"value\" length must be 3 characters long")),
            (json!("abc"), None),
        ],
    );

    let zero = Schema::string().min(0).unwrap().required();
    check(&zero, &[(json!("0"), None), (Value::Null, NOT_A_STRING)]);
    assert!(zero.validate(None).error.is_some());
}

#[test]
fn test_length_counts_code_points() {
    check(
        &Schema::string().length(2).unwrap(),
        &[(json!("\u{1f600}\u{1f600}"), None), (json!("\u{e9}t"), None)],
    );
}

#[test]
fn test_byte_length_limits() {
    check(
        &Schema::string().min_bytes(2, "utf8").unwrap(),
        &[
            (json!("\u{bd}"), None),
            (json!("a"), Some("\"value\" length must be at least 2 characters long")),
        ],
    );
    check(
        &Schema::string().max_bytes(1, "utf8").unwrap(),
        &[
            (
                json!("\u{bd}"),
                Some("\"value\" length must be less than or equal to 1 characters long"),
            ),
            (json!("a"), None),
        ],
    );
}

#[test]
fn test_regex() {
    let pattern = Pattern::new("^[0-9][-][a-z]+$", "").unwrap();
    check(
        &Schema::string().regex(&pattern).unwrap(),
        &[
            (
                json!("van"),
                Some("\"value\" with value \"van\" fails to match the required pattern: /^[0-9][-][a-z]+$/"),
            ),
            (json!("0-www"), None),
        ],
    );

    let global = Pattern::new("a", "g").unwrap();
    let schema = Schema::string().regex(&global).unwrap();
    check(&schema, &[(json!("ab"), None), (json!("ac"), None)]);

    let digits = Pattern::new("^\\d+$", "").unwrap();
    check(
        &Schema::string().regex_named(&digits, "digits").unwrap(),
        &[
            (
                json!("a<b"),
                Some("\"value\" with value \"a&lt;b\" fails to match the digits pattern"),
            ),
            (json!("0123"), None),
            (
                json!("\u{663}"),
                Some("\"value\" with value \"&#1635;\" fails to match the digits pattern"),
            ),
        ],
    );

    let word = Pattern::new("^[\\w-.]+$", "").unwrap();
    check(
        &Schema::string().regex(&word).unwrap(),
        &[
            (json!("a_b-c.d"), None),
            (
                json!("caf\u{e9}"),
                Some("\"value\" with value \"caf&#xe9;\" fails to match the required pattern: /^[\\w-.]+$/"),
            ),
        ],
    );
}

#[test]
fn test_token_alphanum_hex() {
    check(
        &Schema::string().token(),
        &[
            (json!("w0rld_of_w4lm4rtl4bs"), None),
            (
                json!("w0rld of_w4lm4rtl4bs"),
                Some("\"value\" must only contain alpha-numeric and underscore characters"),
            ),
        ],
    );
    check(
        &Schema::string().alphanum(),
        &[
            (json!("w0rldofw4lm4rtl4bs"), None),
            (
                json!("abcd#f?h1j orly?"),
                Some("\"value\" must only contain alpha-numeric characters"),
            ),
        ],
    );
    check(
        &Schema::string().hex(),
        &[
            (json!("123456789abcdef"), None),
            (json!("123456789AbCdEf"), None),
            (json!("123afg"), Some("\"value\" must only contain hexadecimal characters")),
        ],
    );
}

#[test]
fn test_credit_card() {
    check(
        &Schema::string().credit_card(),
        &[
            (json!("378734493671000"), None),
            (json!("4111111111111111"), None),
            (json!("4111111111111112"), Some("\"value\" must be a credit card")),
        ],
    );
}

#[test]
fn test_case_tests_without_conversion() {
    check_with(
        &Schema::string().lowercase(),
        &strict(),
        &[
            (json!("this is all lowercase"), None),
            (json!("5"), None),
            (
                json!("MixEd cAsE"),
                Some("\"value\" must only contain lowercase characters"),
            ),
            (json!(1), NOT_A_STRING),
        ],
    );
    check_with(
        &Schema::string().uppercase(),
        &strict(),
        &[
            (json!("UPPER\nCASE"), None),
            (
                json!("lOWERCASE"),
                Some("\"value\" must only contain uppercase characters"),
            ),
        ],
    );
}

#[test]
fn test_case_conversion() {
    assert_eq!(
        converted(&Schema::string().lowercase(), "UPPER TO LOWER"),
        json!("upper to lower")
    );
    assert_eq!(
        converted(&Schema::string().uppercase(), "lower to upper"),
        json!("LOWER TO UPPER")
    );
}

#[test]
fn test_trim() {
    check_with(
        &Schema::string().trim(),
        &strict(),
        &[
            (
                json!(" something"),
                Some("\"value\" must not have leading or trailing whitespace"),
            ),
            (
                json!("something\n"),
                Some("\"value\" must not have leading or trailing whitespace"),
            ),
            (json!("some thing"), None),
        ],
    );
    assert_eq!(converted(&Schema::string().trim(), " trim this "), json!("trim this"));
    assert_eq!(converted(&Schema::string().trim().allow([""]), "     "), json!(""));

    let error = Schema::string()
        .trim()
        .required()
        .validate(json!("    "))
        .error
        .unwrap();
    assert_eq!(error.message, "\"value\" is not allowed to be empty");
}

#[test]
fn test_trim_before_length() {
    let min = Schema::string().min(4).unwrap().trim();
    check(
        &min,
        &[
            (json!(" a "), Some("\"value\" length must be at least 4 characters long")),
            (json!("abcd "), None),
        ],
    );
    let max = Schema::string().max(4).unwrap().trim();
    check(
        &max,
        &[
            (
                json!(" abcde "),
                Some("\"value\" length must be less than or equal to 4 characters long"),
            ),
            (json!("abcd "), None),
        ],
    );
}

#[test]
fn test_trim_schema_level_strict() {
    let schema = Schema::string().trim().strict();
    check(
        &schema,
        &[(
            json!(" abc"),
            Some("\"value\" must not have leading or trailing whitespace"),
        )],
    );
}

#[test]
fn test_replace_first_or_global() {
    let first = Pattern::new("\\s+", "").unwrap();
    let schema = Schema::string().replace(&first, "");
    assert_eq!(converted(&schema, "\tsomething"), json!("something"));
    assert_eq!(converted(&schema, "so me thing"), json!("some thing"));

    let all = Pattern::new("\\s+", "g").unwrap();
    let schema = Schema::string().lowercase().replace(&all, " ");
    assert_eq!(converted(&schema, "A\t B  C"), json!("a b c"));

    let groups = Pattern::new("(\\w+)@(\\w+)", "").unwrap();
    let schema = Schema::string().replace(&groups, "$2 at $1");
    assert_eq!(converted(&schema, "joe@home"), json!("home at joe"));
}

#[test]
fn test_replacement_template_forms() {
    let pair = Pattern::new("(\\w)(\\d)", "g").unwrap();
    let schema = Schema::string().replace(&pair, "$1x");
    assert_eq!(converted(&schema, "a1 b2"), json!("ax bx"));

    let schema = Schema::string().replace(&pair, "<$&>");
    assert_eq!(converted(&schema, "a1-b2"), json!("<a1>-<b2>"));

    let named = Pattern::new("(?<user>\\w+)@(?<host>\\w+)", "").unwrap();
    let schema = Schema::string().replace(&named, "$<host>/$<user>");
    assert_eq!(converted(&schema, "joe@home"), json!("home/joe"));

    let price = Pattern::new("(\\d+)", "").unwrap();
    let schema = Schema::string().replace(&price, "$$$1");
    assert_eq!(converted(&schema, "cost: 5"), json!("cost: $5"));
}

#[test]
fn test_truncate() {
    let schema = Schema::string().max(5).unwrap().truncate(true);
    assert_eq!(converted(&schema, "abc"), json!("abc"));
    assert_eq!(converted(&schema, "abcdef"), json!("abcde"));

    let unchanged = Schema::string().min(2).unwrap().truncate(true);
    assert_eq!(
        converted(&unchanged, "fooooooooooooooooooo"),
        json!("fooooooooooooooooooo")
    );
}

#[test]
fn test_truncate_after_transforms() {
    let a = Pattern::new("a", "g").unwrap();
    let schema = Schema::string()
        .max(5)
        .unwrap()
        .truncate(true)
        .trim()
        .replace(&a, "aa");
    assert_eq!(converted(&schema, "abc"), json!("aabc"));
    assert_eq!(converted(&schema, "abcdef"), json!("aabcd"));
    assert_eq!(converted(&schema, "  abcdef  "), json!("aabcd"));
}

#[test]
fn test_conversion_feeds_literal_sets() {
    let schema = Schema::string()
        .uppercase()
        .min(2)
        .unwrap()
        .max(3)
        .unwrap()
        .alphanum()
        .valid(["AB", "BC"]);
    check(
        &schema,
        &[
            (json!("x"), Some("\"value\" must be one of [AB, BC]")),
            (json!("123"), Some("\"value\" must be one of [AB, BC]")),
            (json!("ab"), None),
            (json!("ABc"), Some("\"value\" must be one of [AB, BC]")),
            (json!(""), Some("\"value\" is not allowed to be empty")),
            (Value::Null, NOT_A_STRING),
        ],
    );
    assert_eq!(converted(&schema, "bc"), json!("BC"));
}

#[test]
fn test_collect_all_failures() {
    let schema = Schema::string().min(5).unwrap().alphanum();
    let options = ValidationOptions::default().abort_early(false);

    let error = schema.validate_with(json!("a#"), &options).error.unwrap();
    assert_eq!(
        error.message,
        "\"value\" length must be at least 5 characters long. \"value\" must only contain alpha-numeric characters"
    );
    assert_eq!(error.kinds(), [ErrorKind::StringMin, ErrorKind::StringAlphanum]);

    let error = schema.validate_with(json!(""), &options).error.unwrap();
    assert_eq!(error.kinds()[..2], [ErrorKind::AnyEmpty, ErrorKind::StringMin]);

    let first_only = schema.validate(json!("a#")).error.unwrap();
    assert_eq!(first_only.len(), 1);
}

#[test]
fn test_label_replaces_value() {
    let schema = Schema::string().label("Name").min(3).unwrap();
    check(
        &schema,
        &[(json!("ab"), Some("\"Name\" length must be at least 3 characters long"))],
    );
}

#[test]
fn test_details_carry_context() {
    let error = Schema::string().max(2).unwrap().validate(json!("abc")).error.unwrap();
    let detail = &error.details[0];
    assert_eq!(detail.kind, ErrorKind::StringMax);
    assert!(detail.path.is_empty());
    assert_eq!(detail.context["limit"], json!(2));
    assert_eq!(detail.context["value"], json!("abc"));
    assert_eq!(detail.context["label"], json!("value"));
}

#[test]
fn test_repeated_validation_is_identical() {
    let schema = Schema::string().trim().max(3).unwrap().truncate(true);
    let first = schema.validate(json!("  abcdef "));
    for _ in 0..3 {
        assert_eq!(schema.validate(json!("  abcdef ")), first);
    }
    assert_eq!(first.value, Some(json!("abc")));
}
