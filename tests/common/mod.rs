//! Shared helpers for integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::cast_precision_loss)]

use flate2::Compression;
use flate2::write::GzEncoder;
use std::f32::consts::PI;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Write mono 16-bit PCM samples to a WAV file.
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &s in samples {
        #[allow(clippy::cast_possible_truncation)]
        writer
            .write_sample((s.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16)
            .unwrap();
    }
    writer.finalize().unwrap();
}

/// Pure sine tone.
pub fn sine(freq: f32, sample_rate: u32, secs: f32) -> Vec<f32> {
    let n = (sample_rate as f32 * secs) as usize;
    (0..n)
        .map(|i| 0.5 * (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
        .collect()
}

/// Short decaying 1 kHz clicks at `bpm`, silence in between.
pub fn click_track(bpm: f32, sample_rate: u32, secs: f32) -> Vec<f32> {
    let n = (sample_rate as f32 * secs) as usize;
    let interval = (60.0 / bpm * sample_rate as f32) as usize;
    let click_len = sample_rate as usize / 50;
    let mut samples = vec![0.0f32; n];
    let mut start = interval / 2;
    while start < n {
        for i in 0..click_len.min(n - start) {
            let t = i as f32 / sample_rate as f32;
            let decay = 1.0 - i as f32 / click_len as f32;
            samples[start + i] = 0.8 * decay * (2.0 * PI * 1000.0 * t).sin();
        }
        start += interval;
    }
    samples
}

/// `.tar.gz` holding `files` as `(name, contents)`.
pub fn tar_gz(files: &[(&str, &str)]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, contents) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, contents.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// `.zip` holding `files` as `(name, contents)`.
pub fn zip(files: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, contents) in files {
        writer
            .start_file(*name, zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Minimal HTTP server answering every request with the same response.
pub struct TestServer {
    /// Base URL, e.g. `http://127.0.0.1:4321`.
    pub url: String,
    hits: Arc<AtomicUsize>,
}

impl TestServer {
    /// Serve `body` with `200 OK`.
    pub fn serve(body: Vec<u8>) -> Self {
        Self::start(200, body)
    }

    /// Serve an empty body with `status`.
    pub fn status(status: u16) -> Self {
        Self::start(status, Vec::new())
    }

    fn start(status: u16, body: Vec<u8>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                counter.fetch_add(1, Ordering::SeqCst);

                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let head = format!(
                    "HTTP/1.1 {status} X\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = stream.write_all(head.as_bytes());
                let _ = stream.write_all(&body);
                let _ = stream.flush();
            }
        });

        Self { url, hits }
    }

    /// URL of `name` on this server.
    pub fn file_url(&self, name: &str) -> String {
        format!("{}/{name}", self.url)
    }

    /// Requests served so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Whether `program` can be run from PATH.
pub fn program_available(program: &str) -> bool {
    std::process::Command::new(program)
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .is_ok()
}
