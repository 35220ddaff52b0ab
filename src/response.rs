use std::str::FromStr;

use log::{debug, error, info};

use tiny_http::{
    StatusCode,
    Request,
    Response,
    Header,
    HeaderField,
};
use ascii::AsciiString;

use crate::request::RequestResult;


fn make_header(field: &str, value: &str) -> Option<Header> {
    let field = match HeaderField::from_str(field) {
        Ok(v) => v,
        Err(_) => {
            error!("invalid header field {}", field);
            return None;
        },
    };
    let value = match AsciiString::from_ascii(value) {
        Ok(v) => v,
        Err(e) => {
            error!("header value for {} is not ascii: {}", field, e);
            return None;
        },
    };
    Some(Header{
        field,
        value,
    })
}

/// Headers sent with every response.
pub fn server_headers() -> Vec<Header> {
    let mut headers: Vec<Header> = vec!();
    let server_header_v = format!("fsrv/{}, tiny_http (Rust)", env!("CARGO_PKG_VERSION"));
    headers.extend(make_header("Server", &server_header_v));
    headers
}

/// Build a `Content-Disposition` value that makes the client save the content as `filename`.
///
/// Printable ascii names without quotes or backslashes are sent as they are. Anything else
/// gets a sanitized ascii fallback plus the exact name in RFC 5987 form.
pub fn content_disposition(filename: &str) -> String {
    let plain = filename.chars().all(|c| c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\');
    if plain {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let fallback: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            c if !c.is_ascii() => '_',
            _ => c,
        })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename),
        )
}

/// Send the outcome of a request to the client.
pub fn exec_response(req: Request, r: RequestResult) {
    let res_status = StatusCode(200);
    let mut headers = server_headers();

    let sent = match r.v {
        Some(v) => {
            headers.extend(make_header("Content-Type", mime::TEXT_HTML_UTF_8.as_ref()));
            let mut res = Response::from_data(v.into_bytes());
            res = res.with_status_code(res_status);
            for h in headers.into_iter() {
                res.add_header(h);
            }
            req.respond(res)
        },
        None => {
            match r.f {
                Some(v) => {
                    let name = r.n.unwrap_or_default();
                    headers.extend(make_header("Content-Type", mime::APPLICATION_OCTET_STREAM.as_ref()));
                    headers.extend(make_header("Content-Disposition", &content_disposition(&name)));
                    let mut res = Response::from_file(v);
                    res = res.with_status_code(res_status);
                    for h in headers.into_iter() {
                        res.add_header(h);
                    }
                    let sent = req.respond(res);
                    if sent.is_ok() {
                        info!("download of {} complete", &name);
                    }
                    sent
                },
                None => {
                    let mut res = Response::empty(StatusCode(500));
                    for h in headers.into_iter() {
                        res.add_header(h);
                    }
                    req.respond(res)
                },
            }
        },
    };

    match sent {
        Ok(()) => {
            debug!("served {:?} response", r.typ);
        },
        Err(e) => {
            error!("failed to send {:?} response: {}", r.typ, e);
        },
    };
}
