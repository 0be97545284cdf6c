use crate::http::request::{Method, Request};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Request line has fewer than three tokens, an empty method or path,
    /// or the header block is not UTF-8.
    InvalidRequest,
    /// A header line without a `:` separator.
    InvalidHeader,
    InvalidContentLength,
    /// The message outgrew the read buffer cap.
    TooLarge,
    /// More bytes are needed before the message can be parsed.
    Incomplete,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            ParseError::InvalidRequest => "malformed request line",
            ParseError::InvalidHeader => "malformed header line",
            ParseError::InvalidContentLength => "invalid Content-Length",
            ParseError::TooLarge => "request exceeds buffer limit",
            ParseError::Incomplete => "incomplete request",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for ParseError {}

/// Parses a request out of a buffer that may still be filling up.
///
/// Returns [`ParseError::Incomplete`] until the blank line ending the
/// headers has arrived and, when `Content-Length` is present, until that
/// many body bytes follow it. Without `Content-Length` the body is whatever
/// follows the blank line. On success also returns the number of bytes
/// consumed.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    // Look for header/body separator
    let Some((headers_end, sep_len)) = find_headers_end(buf) else {
        // Reject a bad request line or header as soon as its line is in
        check_partial_head(buf)?;
        return Err(ParseError::Incomplete);
    };
    let head = head_str(&buf[..headers_end])?;
    let body_bytes = &buf[headers_end + sep_len..];

    let mut request = parse_head(head)?;

    let body = match content_length(&request.headers)? {
        Some(len) if body_bytes.len() < len => return Err(ParseError::Incomplete),
        Some(len) => &body_bytes[..len],
        None => body_bytes,
    };

    request.body = body.to_vec();
    let total_consumed = headers_end + sep_len + body.len();
    Ok((request, total_consumed))
}

/// Parses a buffer that holds everything the client is going to send.
///
/// This is the single-read framing: a missing blank line means the headers
/// run to the end of the buffer, and every byte after the blank line is body
/// regardless of `Content-Length`.
pub fn parse_complete_request(buf: &[u8]) -> Result<Request, ParseError> {
    let (head, body) = match find_headers_end(buf) {
        Some((end, sep_len)) => (&buf[..end], &buf[end + sep_len..]),
        None => (buf, &[][..]),
    };

    let mut request = parse_head(head_str(head)?)?;
    request.body = body.to_vec();
    Ok(request)
}

fn head_str(bytes: &[u8]) -> Result<&str, ParseError> {
    std::str::from_utf8(bytes).map_err(|_| ParseError::InvalidRequest)
}

// CRLF framing, bare LF tolerated
fn split_lines(head: &str) -> impl Iterator<Item = &str> {
    head.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Validates the lines that are already complete in a head still missing
/// its blank line.
fn check_partial_head(buf: &[u8]) -> Result<(), ParseError> {
    let Some(last_newline) = buf.iter().rposition(|&b| b == b'\n') else {
        return Ok(());
    };

    let mut lines = split_lines(head_str(&buf[..last_newline])?);
    if let Some(request_line) = lines.next() {
        parse_request_line(request_line)?;
    }
    for line in lines {
        parse_header_line(line)?;
    }
    Ok(())
}

fn parse_request_line(line: &str) -> Result<(Method, &str, &str), ParseError> {
    let mut parts = line.split(' ');

    let method_str = parts.next().ok_or(ParseError::InvalidRequest)?;
    let path = parts.next().ok_or(ParseError::InvalidRequest)?;
    let version = parts.next().ok_or(ParseError::InvalidRequest)?;

    let method = Method::parse(method_str).ok_or(ParseError::InvalidRequest)?;
    if path.is_empty() {
        return Err(ParseError::InvalidRequest);
    }

    Ok((method, path, version))
}

fn parse_header_line(line: &str) -> Result<(&str, &str), ParseError> {
    let (key, value) = line.split_once(':').ok_or(ParseError::InvalidHeader)?;
    Ok((key.trim(), value.trim()))
}

fn parse_head(head: &str) -> Result<Request, ParseError> {
    let mut lines = split_lines(head);

    // Request line
    let request_line = lines.next().ok_or(ParseError::InvalidRequest)?;
    let (method, path, version) = parse_request_line(request_line)?;

    // Headers
    let mut headers = HashMap::new();

    for line in lines {
        if line.is_empty() {
            break;
        }

        let (key, value) = parse_header_line(line)?;
        headers.insert(key.to_string(), value.to_string());
    }

    Ok(Request {
        method,
        path: path.to_string(),
        version: version.to_string(),
        headers,
        body: Vec::new(),
    })
}

/// Declared body length. Header names are stored as sent, but framing
/// matches this one regardless of case.
fn content_length(headers: &HashMap<String, String>) -> Result<Option<usize>, ParseError> {
    headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("Content-Length"))
        .map(|(_, v)| v.parse::<usize>().map_err(|_| ParseError::InvalidContentLength))
        .transpose()
}

/// Offset of the blank line ending the header block and the length of the
/// separator found there (4 for CRLF CRLF, 2 for LF LF).
fn find_headers_end(buf: &[u8]) -> Option<(usize, usize)> {
    let crlf = buf.windows(4).position(|w| w == b"\r\n\r\n");
    let lf = buf.windows(2).position(|w| w == b"\n\n");

    match (crlf, lf) {
        (Some(c), Some(l)) if l < c => Some((l, 2)),
        (Some(c), _) => Some((c, 4)),
        (None, Some(l)) => Some((l, 2)),
        (None, None) => None,
    }
}
