#![allow(dead_code)]

use std::io::Write;

pub fn warc_record(kind: &str, id: Option<&str>, block: &str) -> Vec<u8> {
    let mut out = format!("WARC/1.0\r\nWARC-Type: {kind}\r\nWARC-Date: 2024-01-01T00:00:00Z\r\n");
    if let Some(id) = id {
        out.push_str(&format!("WARC-Record-ID: {id}\r\n"));
    }
    out.push_str(&format!("Content-Length: {}\r\n\r\n{}\r\n\r\n", block.len(), block));
    out.into_bytes()
}

pub fn response(id: &str, html: &str) -> Vec<u8> {
    let block = format!("HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\n\r\n{html}");
    warc_record("response", Some(id), &block)
}

pub fn page(body: &str) -> String {
    format!("<html><head><title>t</title></head><body>{body}</body></html>")
}

pub fn gzip(bytes: &[u8]) -> Vec<u8> {
    let mut enc = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    enc.write_all(bytes).unwrap();
    enc.finish().unwrap()
}

/// Response record whose HTTP block carries extra headers and a raw (possibly encoded) body.
pub fn encoded_response(id: &str, headers: &str, body: &[u8]) -> Vec<u8> {
    let mut block = format!("HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n{headers}\r\n").into_bytes();
    block.extend_from_slice(body);
    let mut out = format!("WARC/1.0\r\nWARC-Type: response\r\nWARC-Record-ID: {id}\r\nContent-Length: {}\r\n\r\n", block.len())
        .into_bytes();
    out.extend(block);
    out.extend_from_slice(b"\r\n\r\n");
    out
}
