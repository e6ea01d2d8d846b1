//! Integration tests for header parsing and the header model.

use http_grammar::{
    Header, HeaderCollection, HeaderError, HeaderParameter, HeaderParser, HeaderParserConfig,
    HeaderValue, ParameterValue, ParseErrorKind, TypedValue, ValueKind,
};

fn parameter<'a>(value: &'a HeaderValue, name: &str) -> Option<&'a ParameterValue> {
    value.parameter(name).and_then(HeaderParameter::value)
}

#[test]
fn value_and_parameters_split_on_top_level_semicolons() {
    let value = HeaderParser::default()
        .parse_value(r#"foo; a="x;y"; b=<http://h/p>"#)
        .unwrap();
    assert_eq!(value.value(), "foo");
    assert_eq!(value.parameters().len(), 2);
    assert_eq!(
        parameter(&value, "a"),
        Some(&ParameterValue::Quoted("x;y".to_string()))
    );
    assert_eq!(
        parameter(&value, "B"),
        Some(&ParameterValue::Uri("http://h/p".to_string()))
    );
}

#[test]
fn commas_inside_quotes_do_not_split_values() {
    let header = HeaderParser::default()
        .parse_header(r#"Accept: a, b;x="1,2""#)
        .unwrap();
    assert_eq!(header.values().len(), 2);
    assert_eq!(
        parameter(&header.values()[1], "x"),
        Some(&ParameterValue::Quoted("1,2".to_string()))
    );
}

#[test]
fn typed_header_always_holds_one_value() {
    let header = Header::typed("Content-Length", ValueKind::Integer, std::iter::empty()).unwrap();
    assert_eq!(header.values().len(), 1);
    assert_eq!(header.typed_value(), Some(&TypedValue::Integer(0)));

    let sole = header.values()[0].clone();
    assert_eq!(
        header.without_value(&sole),
        Err(HeaderError::LastTypedValue {
            name: "Content-Length".to_string()
        })
    );
}

#[test]
fn typed_header_rejects_plain_values() {
    let header = Header::content_length(10);
    assert!(matches!(
        header.with_value(HeaderValue::new("11")),
        Err(HeaderError::UntypedValue { .. })
    ));
    let decimal = Header::typed(
        "X-Ratio",
        ValueKind::Decimal,
        [HeaderValue::typed(TypedValue::parse(ValueKind::Decimal, "0.5").unwrap())],
    )
    .unwrap();
    assert!(matches!(
        decimal.with_value(HeaderValue::typed(TypedValue::Integer(1))),
        Err(HeaderError::UntypedValue { .. })
    ));
}

#[test]
fn header_block_round_trips() {
    let block = "Host: example.com\r\n\
                 Accept: text/html;q=0.9, application/json;q=1.0\r\n\
                 User-Agent: curl/8.0 (x86_64; linux), extra\r\n\
                 Content-Length: 3\r\n\
                 Link: <http://h/a,b>; rel=\"next, prev\"\r\n";
    let headers = HeaderCollection::parse(block).unwrap();
    assert_eq!(headers.len(), 5);
    assert_eq!(headers.content_length(), Some(3));
    assert_eq!(headers.get("user-agent").map(|h| h.values().len()), Some(1));
    assert_eq!(headers.get("link").map(|h| h.values().len()), Some(1));

    let printed = headers.to_string();
    assert_eq!(HeaderCollection::parse(&printed).unwrap(), headers);
}

#[test]
fn folded_lines_join_with_a_space() {
    let headers = HeaderCollection::parse("X-Long: first\r\n  second\r\n\tthird\r\n").unwrap();
    let value = headers
        .get("x-long")
        .and_then(Header::first)
        .map(HeaderValue::value);
    assert_eq!(value, Some("first second third"));
}

#[test]
fn collection_add_merges_and_set_replaces() {
    let parser = HeaderParser::default();
    let mut headers = HeaderCollection::new();
    headers.add(parser.parse_header("Accept: a, b").unwrap()).unwrap();
    headers.add(parser.parse_header("accept: b, c").unwrap()).unwrap();
    assert_eq!(headers.get("ACCEPT").map(|h| h.values().len()), Some(3));

    headers.set(parser.parse_header("Accept: z").unwrap());
    assert_eq!(headers.get("Accept").map(|h| h.values().len()), Some(1));
}

#[test]
fn configuration_controls_splitting_typing_and_enumerations() {
    let config = HeaderParserConfig::new()
        .with_unsplittable("Server")
        .with_typed("Max-Forwards", ValueKind::Integer)
        .with_enumeration("chunked");
    let parser = HeaderParser::new(config);

    let server = parser.parse_header("Server: a, b").unwrap();
    assert_eq!(server.values().len(), 1);

    let forwards = parser.parse_header("Max-Forwards: 10").unwrap();
    assert_eq!(forwards.typed_value(), Some(&TypedValue::Integer(10)));

    let value = parser.parse_value("x; coding=CHUNKED").unwrap();
    assert_eq!(
        parameter(&value, "coding"),
        Some(&ParameterValue::Enumeration("chunked".to_string()))
    );
}

#[test]
fn malformed_header_text_fails() {
    let parser = HeaderParser::default();
    for (text, expected) in [
        ("no-colon", "name"),
        ("Bad Name: x", "name"),
        ("X: \"open", "quote"),
        ("X: trailing\\", "escape"),
        ("Content-Length: 1, 2", "count"),
        ("Content-Length: 1.5", "typed"),
    ] {
        let err = parser.parse_header(text).unwrap_err();
        let matched = match expected {
            "name" => matches!(
                err.kind,
                ParseErrorKind::MissingHeaderName { .. } | ParseErrorKind::InvalidHeaderName { .. }
            ),
            "quote" => err.kind == ParseErrorKind::UnterminatedQuote,
            "escape" => err.kind == ParseErrorKind::DanglingEscape,
            "count" => matches!(err.kind, ParseErrorKind::TooManyValues { count: 2, .. }),
            _ => matches!(err.kind, ParseErrorKind::InvalidTypedValue { .. }),
        };
        assert!(matched, "{text}: {err}");
        assert!(parser.try_parse_header(text).is_none());
    }
    assert_eq!(
        parser.parse_headers("\tcontinued").unwrap_err().kind,
        ParseErrorKind::DanglingContinuation
    );
}
