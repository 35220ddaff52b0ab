use std::fs::File;
use std::io::{
    self,
    Read,
};
use std::time::SystemTime;

use mime::Mime;
use multipart::server::Multipart;
use tiny_http::Method;
use url::form_urlencoded;

use log::{
    debug,
    error,
    info,
    warn,
};

use crate::error::StoreError;
use crate::name::safe_file_name;
use crate::page::{
    files_page,
    info_page,
    upload_page,
};
use crate::size::human_readable_size;
use crate::store::{
    format_time,
    Store,
};

/// Name of the multipart form field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

const NO_FILE_MSG: &str = "No file selected for upload or file is too large";

#[derive(Debug, PartialEq)]
pub enum RequestResultType {
    /// Page rendered from the store state.
    Found,
    /// Store was changed.
    Changed,
    /// File content to stream.
    Download,
    /// Request could not be served as asked; an explanation is rendered.
    InputError,
    /// Store operation failed; an explanation is rendered.
    RecordError,
}

/// Outcome of a request, to be turned into a response.
///
/// `v` is the HTML body of a page, `f` with `n` is a file to send under the given name.
pub struct RequestResult {
    pub typ: RequestResultType,
    pub v: Option<String>,
    pub f: Option<File>,
    pub n: Option<String>,
}

impl RequestResult {

    fn page(typ: RequestResultType, html: String) -> RequestResult {
        RequestResult {
            typ,
            v: Some(html),
            f: None,
            n: None,
        }
    }

    fn info(typ: RequestResultType, msgs: &[String]) -> RequestResult {
        RequestResult::page(typ, info_page(msgs))
    }

    fn store_error(e: StoreError, headline: Option<&str>) -> RequestResult {
        match &e {
            StoreError::WriteFailed{..} | StoreError::DirectoryUnavailable{..} | StoreError::Io{..} => {
                error!("{}", e);
            },
            _ => {
                warn!("{}", e);
            },
        };
        let mut msgs: Vec<String> = vec!();
        if let Some(v) = headline {
            msgs.push(v.to_string());
        }
        msgs.push(e.to_string());
        RequestResult::info(RequestResultType::RecordError, &msgs)
    }
}

/// Reader failing once more than `limit` bytes have been read from it.
pub struct LimitedReader<R> {
    inner: R,
    remaining: u64,
}

impl<R: Read> LimitedReader<R> {
    pub fn new(inner: R, limit: u64) -> LimitedReader<R> {
        LimitedReader {
            inner,
            remaining: limit,
        }
    }
}

impl<R: Read> Read for LimitedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        // One byte beyond the limit is enough to tell an oversized body from one that fits exactly.
        let max = if (buf.len() as u64) > self.remaining {
            (self.remaining + 1) as usize
        } else {
            buf.len()
        };
        let n = self.inner.read(&mut buf[..max])?;
        if n as u64 > self.remaining {
            self.remaining = 0;
            return Err(io::Error::new(io::ErrorKind::InvalidData, "request body too large"));
        }
        self.remaining -= n as u64;
        Ok(n)
    }
}

/// Split a request URL into its path and the value of the `file` query parameter.
///
/// A missing parameter yields an empty name.
pub fn parse_url(url: &str) -> (&str, String) {
    let (path, query) = match url.find('?') {
        Some(i) => (&url[..i], &url[i + 1..]),
        None => (url, ""),
    };
    let file = form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == "file")
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default();
    (path, file)
}

fn boundary_of(content_type: Option<&str>) -> Option<String> {
    let m: Mime = content_type?.parse().ok()?;
    if m.type_() != mime::MULTIPART || m.subtype() != mime::FORM_DATA {
        return None;
    }
    m.get_param(mime::BOUNDARY).map(|v| v.as_str().to_string())
}

fn method_mismatch(expected: &str) -> RequestResult {
    RequestResult::info(RequestResultType::InputError, &[format!("HTTP Method should be '{}'", expected)])
}

fn list(store: &Store) -> RequestResult {
    match store.list() {
        Ok(v) => {
            RequestResult::page(RequestResultType::Found, files_page(&v, store.config().delete_enabled))
        },
        Err(e) => {
            RequestResult::store_error(e, None)
        },
    }
}

fn upload(store: &Store, content_type: Option<&str>, expected_size: Option<usize>, f: impl Read) -> RequestResult {
    let max = store.config().max_upload_size;
    if let Some(v) = expected_size {
        if v as u64 > max {
            warn!("rejecting upload of {} bytes, limit is {}", v, max);
            return RequestResult::info(RequestResultType::InputError, &[String::from(NO_FILE_MSG)]);
        }
    }
    let boundary = match boundary_of(content_type) {
        Some(v) => v,
        None => {
            warn!("upload without multipart boundary, content type {:?}", content_type);
            return RequestResult::info(RequestResultType::InputError, &[String::from(NO_FILE_MSG)]);
        },
    };

    let mut multipart = Multipart::with_body(LimitedReader::new(f, max), boundary);
    loop {
        let mut field = match multipart.read_entry() {
            Ok(Some(v)) => v,
            Ok(None) => {
                warn!("no '{}' field in upload", UPLOAD_FIELD);
                break;
            },
            Err(e) => {
                warn!("failed to read upload: {}", e);
                break;
            },
        };
        if &*field.headers.name != UPLOAD_FIELD {
            debug!("skipping form field {}", &field.headers.name);
            continue;
        }
        let filename = match field.headers.filename.take() {
            Some(v) if !v.is_empty() => v,
            _ => {
                warn!("upload field without file name");
                break;
            },
        };

        return match store.upload(&filename, &mut field.data) {
            Ok(size) => {
                let msgs = vec!(
                    String::from("Uploaded file successfully!"),
                    format!("Uploaded file: {}", safe_file_name(&filename)),
                    format!("Size: {}", human_readable_size(size)),
                    format!("Time: {}", format_time(SystemTime::now())),
                    );
                RequestResult::info(RequestResultType::Changed, &msgs)
            },
            Err(e) => {
                RequestResult::store_error(e, Some("File upload failed!"))
            },
        };
    }
    RequestResult::info(RequestResultType::InputError, &[String::from(NO_FILE_MSG)])
}

fn delete(store: &Store, name: &str) -> RequestResult {
    if !store.config().delete_enabled {
        return RequestResult::info(RequestResultType::InputError, &[String::from("Delete is disabled on this server")]);
    }
    match store.delete(name) {
        Ok(()) => {
            let msg = format!("Deleted file successfully: '{}'", safe_file_name(name));
            RequestResult::info(RequestResultType::Changed, &[msg])
        },
        Err(e) => {
            RequestResult::store_error(e, None)
        },
    }
}

fn download(store: &Store, name: &str) -> RequestResult {
    match store.open(name) {
        Ok(f) => {
            let safe_name = safe_file_name(name);
            info!("sending {}", &safe_name);
            RequestResult {
                typ: RequestResultType::Download,
                v: None,
                f: Some(f),
                n: Some(safe_name),
            }
        },
        Err(e) => {
            RequestResult::store_error(e, None)
        },
    }
}

/// Handle client input by path and method.
///
/// # Arguments
///
/// * `store` - The file store.
/// * `method` - The HTTP method of the client request.
/// * `url` - Path and query of the client request.
/// * `content_type` - Value of the `Content-Type` request header, if any.
/// * `expected_size` - Declared length of the request body, if any.
/// * `f` - Reader providing the request body.
pub fn process_method(store: &Store, method: &Method, url: &str, content_type: Option<&str>, expected_size: Option<usize>, f: impl Read) -> RequestResult {
    let (path, file) = parse_url(url);
    debug!("processing {} {}", method, url);

    match path {
        "/toUpload" => {
            if *method != Method::Get {
                return method_mismatch("GET");
            }
            let cfg = store.config();
            RequestResult::page(RequestResultType::Found, upload_page(&cfg.base_url, &cfg.max_upload_size_human()))
        },
        "/upload" => {
            if *method != Method::Post {
                return method_mismatch("POST");
            }
            upload(store, content_type, expected_size, f)
        },
        "/download" => {
            if *method != Method::Get {
                return method_mismatch("GET");
            }
            download(store, &file)
        },
        "/del" => {
            if *method != Method::Get {
                return method_mismatch("GET");
            }
            delete(store, &file)
        },
        _ => {
            if *method != Method::Get {
                return method_mismatch("GET");
            }
            list(store)
        },
    }
}
