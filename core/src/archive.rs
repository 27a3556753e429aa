//! WARC container reading.
//!
//! Two readers share one record grammar. `split` walks a byte buffer (a mapped
//! plain archive) without copying blocks; `stream` pulls records one at a time
//! from any `BufRead`, which is how `.warc.gz` files are read without inflating
//! them whole. Only `response` records come out; everything else is skipped. A
//! response record without an id is reported at its own position and reading
//! carries on, while a broken container (no version line, bad `Content-Length`,
//! truncated block) ends the sequence with one `Error::Archive`.
//!
//! Payloads are the HTTP entity body: status line and headers removed, chunked
//! transfer coding undone and gzip or deflate content coding inflated. A body
//! that fails to decode is passed through as stored.

use crate::{Error, Result};
use flate2::read::{DeflateDecoder, MultiGzDecoder, ZlibDecoder};
use memmap2::Mmap;
use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const RESPONSE: &str = "response";
/// Longest WARC header block the stream reader accepts.
const MAX_HEADER_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<'a> {
    /// `WARC-Record-ID`, unique within one archive only.
    pub id: String,
    pub uri: Option<String>,
    /// Decoded HTTP entity body. Borrowed from the archive when no decoding was needed.
    pub payload: Cow<'a, [u8]>,
}

impl Record<'_> {
    pub fn text(&self) -> Cow<'_, str> { String::from_utf8_lossy(&self.payload) }
}

/// An opened archive file.
pub enum ArchiveFile {
    Empty,
    /// Plain WARC, read in place.
    Mapped(Mmap),
    /// gzip-compressed WARC (one or many members), inflated as it is read.
    Compressed(BufReader<MultiGzDecoder<File>>),
}

/// Map a plain WARC file, or set up streaming inflation for a gzip-compressed one.
pub fn open_archive<P: AsRef<Path>>(path: P) -> Result<ArchiveFile> {
    let file = File::open(path.as_ref())?;
    if file.metadata()?.len() == 0 {
        return Ok(ArchiveFile::Empty);
    }
    // SAFETY: input archives are not modified while a run holds them.
    let map = unsafe { Mmap::map(&file)? };
    if map.starts_with(&GZIP_MAGIC) {
        drop(map);
        tracing::debug!(path = %path.as_ref().display(), "streaming compressed archive");
        return Ok(ArchiveFile::Compressed(BufReader::new(MultiGzDecoder::new(file))));
    }
    Ok(ArchiveFile::Mapped(map))
}

pub fn split(bytes: &[u8]) -> ArchiveReader<'_> { ArchiveReader::new(bytes) }

pub fn stream<R: BufRead>(reader: R) -> StreamReader<R> { StreamReader::new(reader) }

pub struct ArchiveReader<'a> {
    buf: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> ArchiveReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self { Self { buf, pos: 0, done: false } }

    /// Byte offset of the next unread record.
    pub fn offset(&self) -> usize { self.pos }

    fn fail(&mut self, offset: usize, reason: &str) -> Option<Result<Record<'a>>> {
        self.done = true;
        Some(Err(Error::Archive { offset, reason: reason.to_string() }))
    }
}

impl<'a> Iterator for ArchiveReader<'a> {
    type Item = Result<Record<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let buf = self.buf;
        while !self.done {
            while self.pos < buf.len() && matches!(buf[self.pos], b'\r' | b'\n') {
                self.pos += 1;
            }
            if self.pos >= buf.len() {
                self.done = true;
                return None;
            }

            let start = self.pos;
            let rest = &buf[start..];
            if !rest.starts_with(b"WARC/") {
                return self.fail(start, "missing WARC version line");
            }
            let Some((header_end, block_offset)) = split_header(rest) else {
                return self.fail(start, "unterminated header block");
            };
            let headers = Headers::parse(&rest[..header_end]);
            let Some(length) = content_length(&headers) else {
                return self.fail(start, "missing or invalid Content-Length");
            };
            let block_start = start + block_offset;
            let block_end = match block_start.checked_add(length) {
                Some(end) if end <= buf.len() => end,
                _ => return self.fail(start, "record block runs past end of archive"),
            };
            self.pos = block_end;

            match response_meta(&headers, start) {
                None => continue,
                Some(Err(err)) => return Some(Err(err)),
                Some(Ok((id, uri))) => {
                    return Some(Ok(Record { id, uri, payload: http_payload(&buf[block_start..block_end]) }));
                }
            }
        }
        None
    }
}

/// Record reader over a buffered byte stream. Holds at most one record block in memory.
/// Offsets count bytes of the (decompressed) stream.
pub struct StreamReader<R> {
    inner: R,
    pos: usize,
    done: bool,
}

impl<R: BufRead> StreamReader<R> {
    pub fn new(inner: R) -> Self { Self { inner, pos: 0, done: false } }

    pub fn offset(&self) -> usize { self.pos }

    fn fail(&mut self, offset: usize, reason: impl Into<String>) -> Option<Result<Record<'static>>> {
        self.done = true;
        Some(Err(Error::Archive { offset, reason: reason.into() }))
    }

    /// Consume blank lines between records. `false` at end of input.
    fn skip_separators(&mut self) -> io::Result<bool> {
        loop {
            let buf = self.inner.fill_buf()?;
            if buf.is_empty() {
                return Ok(false);
            }
            let n = buf.iter().take_while(|b| matches!(b, b'\r' | b'\n')).count();
            let found = n < buf.len();
            self.inner.consume(n);
            self.pos += n;
            if found {
                return Ok(true);
            }
        }
    }

    /// Header lines up to and including the closing blank line, and whether that line was seen.
    fn read_header(&mut self) -> io::Result<(Vec<u8>, bool)> {
        let mut header = Vec::new();
        loop {
            let limit = (MAX_HEADER_BYTES - header.len()) as u64;
            let read = (&mut self.inner).take(limit).read_until(b'\n', &mut header)?;
            self.pos += read;
            if read == 0 || !header.ends_with(b"\n") {
                return Ok((header, false));
            }
            if header.ends_with(b"\n\n") || header.ends_with(b"\n\r\n") {
                return Ok((header, true));
            }
        }
    }

    fn read_block(&mut self, length: usize, keep: bool) -> io::Result<Option<Vec<u8>>> {
        let mut limited = (&mut self.inner).take(length as u64);
        let (read, block) = if keep {
            let mut block = Vec::new();
            let read = limited.read_to_end(&mut block)?;
            (read, block)
        } else {
            (io::copy(&mut limited, &mut io::sink())? as usize, Vec::new())
        };
        self.pos += read;
        Ok((read == length).then_some(block))
    }
}

impl<R: BufRead> Iterator for StreamReader<R> {
    type Item = Result<Record<'static>>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            match self.skip_separators() {
                Ok(true) => {}
                Ok(false) => {
                    self.done = true;
                    return None;
                }
                Err(err) => return self.fail(self.pos, format!("read failed: {err}")),
            }

            let start = self.pos;
            let (header, terminated) = match self.read_header() {
                Ok(read) => read,
                Err(err) => return self.fail(start, format!("read failed: {err}")),
            };
            if !header.starts_with(b"WARC/") {
                return self.fail(start, "missing WARC version line");
            }
            if !terminated {
                return self.fail(start, "unterminated header block");
            }
            let headers = Headers::parse(&header);
            let Some(length) = content_length(&headers) else {
                return self.fail(start, "missing or invalid Content-Length");
            };

            let meta = response_meta(&headers, start);
            let block = match self.read_block(length, matches!(meta, Some(Ok(_)))) {
                Ok(Some(block)) => block,
                Ok(None) => return self.fail(start, "record block runs past end of archive"),
                Err(err) => return self.fail(start, format!("read failed: {err}")),
            };

            match meta {
                None => continue,
                Some(Err(err)) => return Some(Err(err)),
                Some(Ok((id, uri))) => {
                    let payload = Cow::Owned(http_payload(&block).into_owned());
                    return Some(Ok(Record { id, uri, payload }));
                }
            }
        }
        None
    }
}

struct Headers(Vec<(String, String)>);

impl Headers {
    /// Parse `Name: value` lines, skipping the first (version or status) line.
    fn parse(raw: &[u8]) -> Self {
        let text = String::from_utf8_lossy(raw);
        let fields = text
            .lines()
            .skip(1)
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
            .collect();
        Headers(fields)
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }
}

fn content_length(headers: &Headers) -> Option<usize> {
    headers.get("content-length").and_then(|v| v.parse().ok())
}

/// `None` for records that are not responses; otherwise the id and target URI.
fn response_meta(headers: &Headers, offset: usize) -> Option<Result<(String, Option<String>)>> {
    if headers.get("warc-type") != Some(RESPONSE) {
        return None;
    }
    let Some(id) = headers.get("warc-record-id") else {
        return Some(Err(Error::RecordParse { offset, reason: "response record without WARC-Record-ID".into() }));
    };
    Some(Ok((id.to_string(), headers.get("warc-target-uri").map(str::to_string))))
}

/// Locate the blank line closing a header block: `(end of headers, start of body)`.
/// Accepts CRLF and bare LF line endings.
fn split_header(buf: &[u8]) -> Option<(usize, usize)> {
    let mut from = 0;
    while let Some(rel) = buf[from..].iter().position(|&b| b == b'\n') {
        let nl = from + rel;
        let tail = &buf[nl + 1..];
        if tail.starts_with(b"\r\n") {
            return Some((nl, nl + 3));
        }
        if tail.starts_with(b"\n") {
            return Some((nl, nl + 2));
        }
        from = nl + 1;
    }
    None
}

/// Entity body of an HTTP response block. Blocks without a status line pass through.
fn http_payload(block: &[u8]) -> Cow<'_, [u8]> {
    if !block.starts_with(b"HTTP/") {
        return Cow::Borrowed(block);
    }
    let Some((header_end, body_start)) = split_header(block) else {
        return Cow::Borrowed(&[]);
    };
    let headers = Headers::parse(&block[..header_end]);
    let mut body = Cow::Borrowed(&block[body_start..]);

    let chunked = headers
        .get("transfer-encoding")
        .is_some_and(|v| v.to_ascii_lowercase().contains("chunked"));
    if chunked {
        match dechunk(&body) {
            Some(joined) => body = Cow::Owned(joined),
            None => tracing::debug!("chunked body did not parse, keeping it as stored"),
        }
    }
    let coding = headers.get("content-encoding").map(|v| v.trim().to_ascii_lowercase());
    if let Some(coding) = coding.filter(|c| !c.is_empty() && c != "identity") {
        match inflate(&body, &coding) {
            Some(inflated) => body = Cow::Owned(inflated),
            None => tracing::debug!(coding = %coding, "content coding not undone, keeping body as stored"),
        }
    }
    body
}

/// Join the data of a chunked body. `None` when the framing is broken.
fn dechunk(mut body: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(body.len());
    loop {
        if body.is_empty() {
            return Some(out);
        }
        let line_end = body.iter().position(|&b| b == b'\n')?;
        let line = std::str::from_utf8(&body[..line_end]).ok()?;
        let size_field = line.split(';').next().unwrap_or_default().trim();
        let size = usize::from_str_radix(size_field, 16).ok()?;
        body = &body[line_end + 1..];
        if size == 0 {
            return Some(out);
        }
        out.extend_from_slice(body.get(..size)?);
        body = &body[size..];
        body = body.strip_prefix(b"\r\n").or_else(|| body.strip_prefix(b"\n")).unwrap_or(body);
    }
}

fn inflate(body: &[u8], coding: &str) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    match coding {
        "gzip" | "x-gzip" => MultiGzDecoder::new(body).read_to_end(&mut out).ok()?,
        // Servers send both zlib-wrapped and raw deflate under this name.
        "deflate" => match ZlibDecoder::new(body).read_to_end(&mut out) {
            Ok(n) => n,
            Err(_) => {
                out.clear();
                DeflateDecoder::new(body).read_to_end(&mut out).ok()?
            }
        },
        _ => return None,
    };
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: &str, id: Option<&str>, block: &str) -> Vec<u8> {
        let mut out = format!("WARC/1.0\r\nWARC-Type: {kind}\r\n");
        if let Some(id) = id {
            out.push_str(&format!("WARC-Record-ID: {id}\r\n"));
        }
        out.push_str(&format!("Content-Length: {}\r\n\r\n{}\r\n\r\n", block.len(), block));
        out.into_bytes()
    }

    fn http(body: &str) -> String {
        format!("HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n{body}")
    }

    #[test]
    fn yields_only_response_records() {
        let mut buf = record("warcinfo", Some("<urn:uuid:0>"), "software: test");
        buf.extend(record("request", Some("<urn:uuid:1>"), "GET / HTTP/1.1\r\n\r\n"));
        buf.extend(record("response", Some("<urn:uuid:2>"), &http("<p>hello</p>")));
        buf.extend(record("metadata", Some("<urn:uuid:3>"), "fetchTimeMs: 12"));
        buf.extend(record("response", Some("<urn:uuid:4>"), &http("<p>world</p>")));

        let records: Vec<_> = split(&buf).collect::<Result<_>>().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "<urn:uuid:2>");
        assert_eq!(records[0].text(), "<p>hello</p>");
        assert_eq!(&records[1].payload[..], b"<p>world</p>");
    }

    #[test]
    fn missing_id_is_reported_in_place() {
        let mut buf = record("response", None, &http("lost"));
        buf.extend(record("response", Some("<urn:uuid:9>"), &http("kept")));

        let items: Vec<_> = split(&buf).collect();
        assert_eq!(items.len(), 2);
        assert!(matches!(items[0], Err(Error::RecordParse { offset: 0, .. })));
        assert_eq!(items[1].as_ref().unwrap().text(), "kept");
    }

    #[test]
    fn non_response_without_id_is_skipped_silently() {
        let mut buf = record("request", None, "GET /");
        buf.extend(record("response", Some("<urn:uuid:1>"), &http("x")));
        let items: Vec<_> = split(&buf).collect();
        assert_eq!(items.len(), 1);
        assert!(items[0].is_ok());
    }

    #[test]
    fn truncated_block_ends_the_sequence() {
        let mut buf = record("response", Some("<urn:uuid:1>"), &http("fine"));
        let second = record("response", Some("<urn:uuid:2>"), &http("cut off here"));
        buf.extend_from_slice(&second[..second.len() - 10]);

        let mut reader = split(&buf);
        assert!(reader.next().unwrap().is_ok());
        assert!(matches!(reader.next(), Some(Err(Error::Archive { .. }))));
        assert!(reader.next().is_none());
    }

    #[test]
    fn garbage_is_a_structural_error() {
        let items: Vec<_> = split(b"<html>not a warc</html>").collect();
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(Error::Archive { offset: 0, .. })));
    }

    #[test]
    fn header_names_are_case_insensitive_and_lf_is_accepted() {
        let block = "HTTP/1.0 200 OK\nServer: x\n\nbody";
        let raw = format!(
            "WARC/1.1\nwarc-type: response\nWARC-RECORD-ID: <id>\nwarc-target-uri: http://a.example/\ncontent-length: {}\n\n{}\n\n",
            block.len(),
            block
        );
        let rec = split(raw.as_bytes()).next().unwrap().unwrap();
        assert_eq!(rec.id, "<id>");
        assert_eq!(rec.uri.as_deref(), Some("http://a.example/"));
        assert_eq!(&rec.payload[..], b"body");
    }

    #[test]
    fn empty_buffer_has_no_records() {
        assert!(split(b"").next().is_none());
        assert!(split(b"\r\n\r\n").next().is_none());
    }

    fn gzip(bytes: &[u8]) -> Vec<u8> {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(bytes).unwrap();
        enc.finish().unwrap()
    }

    fn encoded_response(id: &str, headers: &str, body: &[u8]) -> Vec<u8> {
        let mut block = format!("HTTP/1.1 200 OK\r\n{headers}\r\n").into_bytes();
        block.extend_from_slice(body);
        let mut out = format!("WARC/1.0\r\nWARC-Type: response\r\nWARC-Record-ID: {id}\r\nContent-Length: {}\r\n\r\n", block.len())
            .into_bytes();
        out.extend(block);
        out.extend_from_slice(b"\r\n\r\n");
        out
    }

    #[test]
    fn stream_matches_split() {
        let mut buf = record("warcinfo", Some("<urn:uuid:0>"), "software: test");
        buf.extend(record("response", None, &http("lost")));
        buf.extend(record("response", Some("<urn:uuid:1>"), &http("<p>one</p>")));
        buf.extend(record("request", Some("<urn:uuid:2>"), "GET / HTTP/1.1\r\n\r\n"));
        buf.extend(record("response", Some("<urn:uuid:3>"), &http("<p>two</p>")));

        let sliced: Vec<_> = split(&buf).map(|r| r.map_err(|e| e.to_string())).collect();
        let streamed: Vec<_> = stream(&buf[..]).map(|r| r.map_err(|e| e.to_string())).collect();
        assert_eq!(sliced, streamed);
        assert_eq!(streamed.len(), 3);
    }

    #[test]
    fn multi_member_gzip_is_read_record_by_record() {
        let mut packed = gzip(&record("response", Some("<urn:uuid:1>"), &http("first")));
        packed.extend(gzip(&record("metadata", Some("<urn:uuid:2>"), "fetchTimeMs: 3")));
        packed.extend(gzip(&record("response", Some("<urn:uuid:3>"), &http("second"))));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crawl.warc.gz");
        std::fs::write(&path, &packed).unwrap();

        let ArchiveFile::Compressed(reader) = open_archive(&path).unwrap() else {
            panic!("expected a compressed archive");
        };
        let mut records = stream(reader);
        let first = records.next().unwrap().unwrap();
        assert_eq!((first.id.as_str(), &first.payload[..]), ("<urn:uuid:1>", &b"first"[..]));
        let second = records.next().unwrap().unwrap();
        assert_eq!((second.id.as_str(), &second.payload[..]), ("<urn:uuid:3>", &b"second"[..]));
        assert!(records.next().is_none());
    }

    #[test]
    fn plain_and_empty_files_open_without_inflating() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("a.warc");
        std::fs::write(&plain, record("response", Some("<id>"), &http("x"))).unwrap();
        let empty = dir.path().join("b.warc");
        std::fs::write(&empty, b"").unwrap();
        assert!(matches!(open_archive(&plain).unwrap(), ArchiveFile::Mapped(_)));
        assert!(matches!(open_archive(&empty).unwrap(), ArchiveFile::Empty));
    }

    #[test]
    fn stream_stops_on_truncated_block() {
        let mut buf = record("response", Some("<urn:uuid:1>"), &http("fine"));
        let second = record("response", Some("<urn:uuid:2>"), &http("cut off here"));
        buf.extend_from_slice(&second[..second.len() - 10]);

        let mut reader = stream(&buf[..]);
        assert!(reader.next().unwrap().is_ok());
        assert!(matches!(reader.next(), Some(Err(Error::Archive { .. }))));
        assert!(reader.next().is_none());
        assert!(matches!(stream(&b"<html>"[..]).next(), Some(Err(Error::Archive { offset: 0, .. }))));
    }

    #[test]
    fn chunked_bodies_are_joined() {
        let body = b"9\r\nGardens a\r\nd\r\nnd rivers run\r\n0\r\n\r\n";
        let buf = encoded_response("<id>", "Transfer-Encoding: chunked\r\n", body);
        let rec = split(&buf).next().unwrap().unwrap();
        assert_eq!(rec.text(), "Gardens and rivers run");
    }

    #[test]
    fn compressed_bodies_are_inflated() {
        use flate2::write::ZlibEncoder;
        use flate2::Compression;
        use std::io::Write;

        let page = b"<p>Gardens and rivers</p>";
        let buf = encoded_response("<gz>", "Content-Encoding: gzip\r\n", &gzip(page));
        assert_eq!(&split(&buf).next().unwrap().unwrap().payload[..], page);

        let mut zlib = ZlibEncoder::new(Vec::new(), Compression::default());
        zlib.write_all(page).unwrap();
        let buf = encoded_response("<df>", "Content-Encoding: Deflate\r\n", &zlib.finish().unwrap());
        assert_eq!(&stream(&buf[..]).next().unwrap().unwrap().payload[..], page);
    }

    #[test]
    fn undecodable_bodies_pass_through() {
        let buf = encoded_response("<gz>", "Content-Encoding: gzip\r\n", b"not gzip at all");
        assert_eq!(&split(&buf).next().unwrap().unwrap().payload[..], b"not gzip at all");

        let buf = encoded_response("<ch>", "Transfer-Encoding: chunked\r\n", b"zz\r\nbroken");
        assert_eq!(&split(&buf).next().unwrap().unwrap().payload[..], b"zz\r\nbroken");
    }
}
