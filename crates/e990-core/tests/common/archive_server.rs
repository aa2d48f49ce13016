//! Minimal HTTP/1.1 server imitating the IRS archive host for integration tests.
//!
//! Serves scripted archive bodies with `Last-Modified`, honours
//! `If-Modified-Since` with 304, and answers unknown paths the way the real
//! host does for parts that do not exist.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

use chrono::{DateTime, TimeZone, Utc};

pub const ERROR_PAGE: &str = "<!DOCTYPE html>\r\n<html lang=\"en\">\r\n<head><title>Page Not Found | Internal Revenue Service</title></head>\r\n<body>The page you requested could not be found.</body>\r\n</html>\r\n";

#[derive(Debug, Clone)]
pub enum Route {
    Archive { body: Vec<u8>, last_modified: i64 },
    /// Status with an HTML body (e.g. a 503 outage page).
    Status(u16),
}

/// How paths without a route are answered.
#[derive(Debug, Clone, Copy)]
pub enum Missing {
    /// 200 with the HTML error page.
    Page,
    /// 302 to `/error.html`, which serves the page.
    Redirect,
    /// Plain 404.
    NotFound,
}

pub struct ArchiveServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ArchiveServer {
    /// URL template for this server, laid out like the IRS host.
    pub fn template(&self) -> String {
        format!("{}{{year}}/download990xml_{{year}}_{{part}}.zip", self.base_url)
    }

    /// Request log lines: `"GET /2020/download990xml_2020_1.zip ims"` (`ims` when conditional).
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }
}

pub fn archive_body(year: i32, part: u32) -> Vec<u8> {
    let mut body = b"PK\x03\x04\x14\x00\x00\x00\x08\x00".to_vec();
    body.extend_from_slice(format!("{}{:02}_EFILE_PUBLIC.xml", year, part).as_bytes());
    body.extend((0u8..=255).cycle().take(16 * 1024));
    body
}

/// Path for an archive part under the default layout.
pub fn part_path(year: i32, part: u32) -> String {
    format!("/{}/download990xml_{}_{}.zip", year, year, part)
}

/// Routes where parts `1..=count` of each `(year, count)` exist.
pub fn series(counts: &[(i32, u32)]) -> HashMap<String, Route> {
    let mut routes = HashMap::new();
    for &(year, count) in counts {
        for part in 1..=count {
            routes.insert(
                part_path(year, part),
                Route::Archive {
                    body: archive_body(year, part),
                    last_modified: 1_700_000_000 + part as i64,
                },
            );
        }
    }
    routes
}

/// Starts a server in a background thread. Runs until the process exits.
pub fn start(routes: HashMap<String, Route>, missing: Missing) -> ArchiveServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes = Arc::new(routes);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let log = Arc::clone(&log);
            thread::spawn(move || handle(stream, &routes, missing, &log));
        }
    });
    ArchiveServer {
        base_url: format!("http://127.0.0.1:{}/", port),
        requests,
    }
}

fn http_date(secs: i64) -> String {
    Utc.timestamp_opt(secs, 0)
        .single()
        .unwrap()
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

fn handle(
    mut stream: std::net::TcpStream,
    routes: &HashMap<String, Route>,
    missing: Missing,
    log: &Mutex<Vec<String>>,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let (method, path, ims) = parse_request(request);
    log.lock().unwrap().push(format!(
        "{} {}{}",
        method,
        path,
        if ims.is_some() { " ims" } else { "" }
    ));

    if path == "/error.html" {
        respond(&mut stream, "200 OK", "text/html; charset=utf-8", &[], ERROR_PAGE.as_bytes());
        return;
    }

    match routes.get(path) {
        Some(Route::Archive {
            body,
            last_modified,
        }) => {
            if ims.is_some_and(|t| t >= *last_modified) {
                respond(&mut stream, "304 Not Modified", "application/zip", &[], b"");
                return;
            }
            let lm = format!("Last-Modified: {}", http_date(*last_modified));
            respond(&mut stream, "200 OK", "application/zip", &[lm], body);
        }
        Some(Route::Status(code)) => {
            let status = format!("{} Error", code);
            respond(&mut stream, &status, "text/html", &[], ERROR_PAGE.as_bytes());
        }
        None => match missing {
            Missing::Page => {
                respond(&mut stream, "200 OK", "text/html; charset=utf-8", &[], ERROR_PAGE.as_bytes())
            }
            Missing::Redirect => respond(
                &mut stream,
                "302 Found",
                "text/html",
                &["Location: /error.html".to_string()],
                b"",
            ),
            Missing::NotFound => respond(&mut stream, "404 Not Found", "text/plain", &[], b"not found"),
        },
    }
}

fn respond(
    stream: &mut std::net::TcpStream,
    status: &str,
    content_type: &str,
    extra: &[String],
    body: &[u8],
) {
    let mut head = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        content_type,
        body.len()
    );
    for h in extra {
        head.push_str(h);
        head.push_str("\r\n");
    }
    head.push_str("\r\n");
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}

/// Returns (method, path without query, If-Modified-Since as Unix seconds).
fn parse_request(request: &str) -> (&str, &str, Option<i64>) {
    let mut lines = request.lines();
    let first = lines.next().unwrap_or("");
    let mut parts = first.split_whitespace();
    let method = parts.next().unwrap_or("");
    let target = parts.next().unwrap_or("/");
    let path = target.split('?').next().unwrap_or(target);

    let mut ims = None;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("if-modified-since") {
                ims = DateTime::parse_from_rfc2822(value.trim())
                    .ok()
                    .map(|t| t.timestamp());
            }
        }
    }
    (method, path, ims)
}
