use crate::http::request::Request;
use crate::http::response::Response;

pub const USER_AGENT: &str = "User-Agent";

/// Reflects the `User-Agent` header back as plain text; 400 when absent.
pub fn user_agent(request: &Request) -> Response {
    match request.header(USER_AGENT) {
        Some(agent) => Response::text(agent),
        None => Response::bad_request(),
    }
}
