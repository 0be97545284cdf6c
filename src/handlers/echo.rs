use crate::http::request::Request;
use crate::http::response::Response;

const ECHO_PREFIX: &str = "/echo/";

/// Replies with the part of the path after `/echo/` as plain text.
///
/// Paths without that exact prefix (`/echo`, for one) echo their last
/// `/`-delimited segment instead.
pub fn echo(request: &Request) -> Response {
    let text = match request.path.strip_prefix(ECHO_PREFIX) {
        Some(rest) => rest,
        None => request.path.rsplit('/').next().unwrap_or_default(),
    };
    Response::text(text)
}
