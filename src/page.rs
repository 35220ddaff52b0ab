//! HTML pages served to browsers.
//!
//! Rendering only depends on the values handed in; nothing here touches the store.
use url::form_urlencoded;

use crate::store::FileEntry;

const TITLE: &str = "FSrv";

/// Escape text for use in HTML element content and double quoted attributes.
pub fn escape(s: &str) -> String {
    let mut r = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => r.push_str("&amp;"),
            '<' => r.push_str("&lt;"),
            '>' => r.push_str("&gt;"),
            '"' => r.push_str("&quot;"),
            '\'' => r.push_str("&#39;"),
            _ => r.push(c),
        }
    }
    r
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n  <head>\n    <meta charset=\"utf-8\">\n    <title>{}</title>\n  </head>\n  <body>\n{}  </body>\n</html>\n",
        escape(title),
        body,
        )
}

fn delete_link(name: &str) -> String {
    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("file", name)
        .finish();
    format!("/del?{}", query)
}

/// Table of stored files.
///
/// # Arguments
///
/// * `files` - Listing to show, in display order.
/// * `delete_enabled` - Whether to add a delete column.
pub fn files_page(files: &[FileEntry], delete_enabled: bool) -> String {
    let mut body = String::new();
    body.push_str("    <h1>File List</h1>\n");
    body.push_str("    <p><a href=\"/toUpload\">Go to Upload Page</a></p>\n");
    body.push_str("    <table border=\"1px\">\n      <thead>\n        <tr>");
    body.push_str("<td>Download Link</td><td>Size</td><td>ModifyTime</td><td>CURL</td>");
    if delete_enabled {
        body.push_str("<td>Delete</td>");
    }
    body.push_str("</tr>\n      </thead>\n      <tbody>\n");

    for f in files.iter() {
        body.push_str(&format!(
            "        <tr><td><a href=\"{}\">{}</a></td><td>{}</td><td>{}</td><td><code>{}</code></td>",
            escape(&f.download_link),
            escape(&f.name),
            escape(&f.size_human),
            escape(&f.modified_display),
            escape(&f.curl),
            ));
        if delete_enabled {
            body.push_str(&format!(
                "<td><a href=\"{}\">Delete</a></td>",
                escape(&delete_link(&f.name)),
                ));
        }
        body.push_str("</tr>\n");
    }

    if files.is_empty() {
        let colspan = if delete_enabled { 5 } else { 4 };
        body.push_str(&format!(
            "        <tr><td colspan=\"{}\">This file store is empty, you can upload something now.</td></tr>\n",
            colspan,
            ));
    }
    body.push_str("      </tbody>\n    </table>\n");
    layout(&format!("{} Files", TITLE), &body)
}

/// Page showing one or more messages, used for results and errors alike.
pub fn info_page(msgs: &[String]) -> String {
    let mut body = String::new();
    body.push_str("    <h1>Attention !</h1>\n");
    for m in msgs.iter() {
        body.push_str(&format!("    <p>{}</p>\n", escape(m)));
    }
    body.push_str("    <p><a href=\"/files\">Go to File List Page</a></p>\n");
    body.push_str("    <p><a href=\"/toUpload\">Go to Upload Page</a></p>\n");
    layout(&format!("{} Info", TITLE), &body)
}

/// Upload form, with a hint on how to upload from the command line.
///
/// # Arguments
///
/// * `base_url` - Advertised scheme, host and port of the server.
/// * `max_size` - Human readable upload cap.
pub fn upload_page(base_url: &str, max_size: &str) -> String {
    let mut body = String::new();
    body.push_str("    <h1>Upload File</h1>\n");
    body.push_str("    <p><a href=\"/files\">Go to File List Page</a></p>\n");
    body.push_str(&format!(
        "    <p>You can upload a file with curl:</p><p><code>curl -F 'file=@/path/file' {}/upload</code></p><p>or:</p>\n",
        escape(base_url.trim_end_matches('/')),
        ));
    body.push_str("    <form action=\"/upload\" method=\"post\" enctype=\"multipart/form-data\">\n");
    body.push_str("      <input type=\"file\" name=\"file\" required>\n");
    body.push_str("      <input type=\"submit\" value=\"Upload\">\n");
    body.push_str("    </form>\n");
    body.push_str(&format!("    <p>Attention: max upload file size is {}.</p>\n", escape(max_size)));
    layout(&format!("{} Upload", TITLE), &body)
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use crate::store::FileEntry;
    use super::{
        escape,
        files_page,
        info_page,
        upload_page,
    };

    fn entry(name: &str) -> FileEntry {
        FileEntry {
            name: name.to_string(),
            size: 5000,
            size_human: String::from("4.9 KB"),
            modified: SystemTime::UNIX_EPOCH,
            modified_display: String::from("1970-01-01 00:00:00"),
            download_link: format!("http://localhost:8080/download?file={}", name),
            curl: String::from("curl"),
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href=\"x\">'&'</a>"), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_files_page() {
        let s = files_page(&[entry("report.txt")], false);
        assert!(s.contains(">report.txt</a>"));
        assert!(s.contains("4.9 KB"));
        assert!(!s.contains("/del?"));
        assert!(!s.contains("is empty"));
    }

    #[test]
    fn test_files_page_delete() {
        let s = files_page(&[entry("a b.txt")], true);
        assert!(s.contains("<td>Delete</td>"));
        assert!(s.contains("href=\"/del?file=a+b.txt\""));
    }

    #[test]
    fn test_files_page_empty() {
        let s = files_page(&[], true);
        assert!(s.contains("colspan=\"5\""));
        let s = files_page(&[], false);
        assert!(s.contains("colspan=\"4\""));
        assert!(s.contains("This file store is empty"));
    }

    #[test]
    fn test_files_page_escapes_names() {
        let s = files_page(&[entry("<script>.txt")], true);
        assert!(!s.contains("<script>"));
        assert!(s.contains("&lt;script&gt;.txt"));
    }

    #[test]
    fn test_info_page() {
        let s = info_page(&[String::from("one"), String::from("two & three")]);
        assert!(s.contains("<p>one</p>"));
        assert!(s.contains("<p>two &amp; three</p>"));
    }

    #[test]
    fn test_upload_page() {
        let s = upload_page("http://myhost:8080", "4.0 GB");
        assert!(s.contains("curl -F 'file=@/path/file' http://myhost:8080/upload"));
        assert!(s.contains("max upload file size is 4.0 GB"));
        assert!(s.contains("enctype=\"multipart/form-data\""));
    }
}
