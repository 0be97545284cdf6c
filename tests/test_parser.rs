use sparrow::http::parser::{ParseError, parse_complete_request, parse_http_request};
use sparrow::http::request::Method;

#[test]
fn test_parse_simple_get_request() {
    let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let (parsed, consumed) = parse_http_request(req).unwrap();

    assert_eq!(parsed.method, Method::GET);
    assert_eq!(parsed.path, "/");
    assert_eq!(parsed.version, "HTTP/1.1");
    assert_eq!(parsed.headers.get("Host").unwrap(), "example.com");
    assert!(parsed.body.is_empty());
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_post_request_with_body() {
    let req = b"POST /files/a HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\n\r\nhello";
    let (parsed, consumed) = parse_http_request(req).unwrap();

    assert_eq!(parsed.method, Method::POST);
    assert_eq!(parsed.path, "/files/a");
    assert_eq!(parsed.body, b"hello".to_vec());
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_multiple_headers() {
    let req = b"GET /path HTTP/1.1\r\nHost: example.com\r\nUser-Agent: test-client\r\nAccept: */*\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.headers.get("Host").unwrap(), "example.com");
    assert_eq!(parsed.headers.get("User-Agent").unwrap(), "test-client");
    assert_eq!(parsed.headers.get("Accept").unwrap(), "*/*");
}

#[test]
fn test_parse_header_split_on_first_colon_only() {
    let req = b"GET / HTTP/1.1\r\nHost:   localhost:4221  \r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.headers.get("Host").unwrap(), "localhost:4221");
}

#[test]
fn test_parse_duplicate_header_overwrites() {
    let req = b"GET / HTTP/1.1\r\nX-Tag: first\r\nX-Tag: second\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.headers.len(), 1);
    assert_eq!(parsed.headers.get("X-Tag").unwrap(), "second");
}

#[test]
fn test_parse_request_with_path_and_query_string() {
    let req = b"GET /search?q=rust%20lang HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    // Not decoded, not normalized
    assert_eq!(parsed.path, "/search?q=rust%20lang");
}

#[test]
fn test_parse_incomplete_request_missing_blank_line() {
    let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n";
    let result = parse_http_request(req);

    assert!(matches!(result, Err(ParseError::Incomplete)));
}

#[test]
fn test_parse_incomplete_request_partial_body() {
    let req = b"POST /files/a HTTP/1.1\r\nContent-Length: 10\r\n\r\nhello";
    let result = parse_http_request(req);

    assert!(matches!(result, Err(ParseError::Incomplete)));
}

#[test]
fn test_parse_body_without_content_length_takes_remaining_bytes() {
    let req = b"POST /files/a HTTP/1.1\r\n\r\nrest of buffer";
    let (parsed, consumed) = parse_http_request(req).unwrap();

    assert_eq!(parsed.body, b"rest of buffer".to_vec());
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_content_length_limits_body() {
    let req = b"POST /files/a HTTP/1.1\r\nContent-Length: 3\r\n\r\nabcdef";
    let (parsed, consumed) = parse_http_request(req).unwrap();

    assert_eq!(parsed.body, b"abc".to_vec());
    assert_eq!(consumed, req.len() - 3);
}

#[test]
fn test_parse_invalid_content_length() {
    let req = b"POST /files/a HTTP/1.1\r\nContent-Length: lots\r\n\r\n";

    assert_eq!(
        parse_http_request(req).unwrap_err(),
        ParseError::InvalidContentLength
    );
}

#[test]
fn test_parse_request_line_with_too_few_tokens() {
    for req in [
        &b"GET\r\n\r\n"[..],
        &b"GET /\r\n\r\n"[..],
        &b"\r\n\r\n"[..],
    ] {
        assert_eq!(
            parse_http_request(req).unwrap_err(),
            ParseError::InvalidRequest,
            "{:?}",
            String::from_utf8_lossy(req)
        );
    }
}

#[test]
fn test_parse_request_line_with_empty_path() {
    // Double space leaves an empty path token
    let req = b"GET  HTTP/1.1\r\n\r\n";

    assert_eq!(parse_http_request(req).unwrap_err(), ParseError::InvalidRequest);
}

#[test]
fn test_parse_extension_method_is_accepted() {
    let req = b"BREW /pot HTTP/1.1\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.method, Method::Extension("BREW".to_string()));
}

#[test]
fn test_parse_malformed_header() {
    let req = b"GET / HTTP/1.1\r\nBrokenHeader\r\n\r\n";
    let result = parse_http_request(req);

    assert!(matches!(result, Err(ParseError::InvalidHeader)));
}

#[test]
fn test_parse_non_utf8_head_is_invalid() {
    let req = b"GET /\xff HTTP/1.1\r\n\r\n";

    assert_eq!(parse_http_request(req).unwrap_err(), ParseError::InvalidRequest);
}

#[test]
fn test_parse_various_http_methods() {
    let methods = vec![
        ("GET", Method::GET),
        ("POST", Method::POST),
        ("PUT", Method::PUT),
        ("DELETE", Method::DELETE),
        ("HEAD", Method::HEAD),
        ("OPTIONS", Method::OPTIONS),
        ("PATCH", Method::PATCH),
    ];

    for (method_str, expected_method) in methods {
        let req = format!("{} / HTTP/1.1\r\n\r\n", method_str);
        let (parsed, _) = parse_http_request(req.as_bytes()).unwrap();
        assert_eq!(parsed.method, expected_method);
    }
}

#[test]
fn test_parse_binary_body_with_embedded_crlf() {
    let req = b"POST /files/blob HTTP/1.1\r\nContent-Length: 8\r\n\r\n\x00\r\n\r\n\xff\n\x01";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.body, vec![0x00, b'\r', b'\n', b'\r', b'\n', 0xff, b'\n', 0x01]);
}

#[test]
fn test_parse_bare_lf_framing() {
    let req = b"GET /user-agent HTTP/1.1\nUser-Agent: curl/8.0\n\nbody";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.path, "/user-agent");
    assert_eq!(parsed.headers.get("User-Agent").unwrap(), "curl/8.0");
    assert_eq!(parsed.body, b"body".to_vec());
}

#[test]
fn test_parse_header_case_preservation() {
    let req = b"GET / HTTP/1.1\r\ncontent-type: application/json\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert!(parsed.headers.contains_key("content-type"));
    assert!(!parsed.headers.contains_key("Content-Type"));
}

#[test]
fn test_parse_complete_without_blank_line() {
    let req = b"GET /echo/abc HTTP/1.1\r\nHost: localhost\r\n";
    let parsed = parse_complete_request(req).unwrap();

    assert_eq!(parsed.path, "/echo/abc");
    assert_eq!(parsed.headers.get("Host").unwrap(), "localhost");
    assert!(parsed.body.is_empty());
}

#[test]
fn test_parse_complete_ignores_content_length() {
    let req = b"POST /files/a HTTP/1.1\r\nContent-Length: 100\r\n\r\nshort";
    let parsed = parse_complete_request(req).unwrap();

    assert_eq!(parsed.body, b"short".to_vec());
}

#[test]
fn test_parse_complete_rejects_short_request_line() {
    assert_eq!(
        parse_complete_request(b"GET\r\n\r\n").unwrap_err(),
        ParseError::InvalidRequest
    );
    assert_eq!(parse_complete_request(b"").unwrap_err(), ParseError::InvalidRequest);
}

#[test]
fn test_parse_rejects_bad_lines_before_blank_line() {
    assert_eq!(parse_http_request(b"GET /\r\n").unwrap_err(), ParseError::InvalidRequest);
    assert_eq!(parse_http_request(b"GET\n").unwrap_err(), ParseError::InvalidRequest);
    assert_eq!(
        parse_http_request(b"GET / HTTP/1.1\r\nBrokenHeader\r\n").unwrap_err(),
        ParseError::InvalidHeader
    );
}

#[test]
fn test_parse_unfinished_lines_stay_incomplete() {
    for req in [
        &b"GET /"[..],
        &b"GET / HTTP/1.1\r\nHost: exam"[..],
        &b"GET / HTTP/1.1\r\nBrokenHead"[..],
    ] {
        assert_eq!(parse_http_request(req).unwrap_err(), ParseError::Incomplete);
    }
}

#[test]
fn test_parse_lowercase_content_length_frames_body() {
    let partial = b"POST /files/a HTTP/1.1\r\ncontent-length: 6\r\n\r\nabc";
    assert_eq!(parse_http_request(partial).unwrap_err(), ParseError::Incomplete);

    let full = b"POST /files/a HTTP/1.1\r\ncontent-length: 6\r\n\r\nabcdef";
    let (parsed, consumed) = parse_http_request(full).unwrap();

    assert_eq!(parsed.body, b"abcdef".to_vec());
    assert_eq!(consumed, full.len());
    // Stored as sent
    assert!(parsed.headers.contains_key("content-length"));
}
