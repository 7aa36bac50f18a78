//! Minimal blocking HTTP server used as a stand-in registry, plus archive
//! fixtures shaped like real npm tarballs.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct TestRegistry {
    pub url: String,
    hits: Arc<AtomicUsize>,
}

impl TestRegistry {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Serves the given path-to-body routes on a random local port. Unknown paths
/// get a 404. Every request, known or not, bumps the hit counter.
pub fn serve(routes: HashMap<String, Vec<u8>>) -> TestRegistry {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                match stream.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        request.extend_from_slice(&buf[..n]);
                        if request.windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
            counter.fetch_add(1, Ordering::SeqCst);

            let request_line = String::from_utf8_lossy(&request);
            let path = request_line
                .lines()
                .next()
                .and_then(|line| line.split_whitespace().nth(1))
                .unwrap_or("")
                .to_string();

            let response = match routes.get(&path) {
                Some(body) => {
                    let mut response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        body.len()
                    )
                    .into_bytes();
                    response.extend_from_slice(body);
                    response
                }
                None => {
                    b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                        .to_vec()
                }
            };
            let _ = stream.write_all(&response);
            let _ = stream.flush();
        }
    });

    TestRegistry {
        url: format!("http://{}", addr),
        hits,
    }
}

pub fn packument(latest: &str) -> Vec<u8> {
    format!(r#"{{"dist-tags": {{"latest": "{latest}"}}}}"#).into_bytes()
}

/// A gzipped tarball shaped like an npm package manager distribution: one
/// `package/` top level, a `package.json` with a `bin` map, and the script it
/// points at.
pub fn toolchain_tarball(name: &str, commands: &[(&str, &str)]) -> Vec<u8> {
    use flate2::Compression;
    use flate2::write::GzEncoder;

    let bin_entries: Vec<String> = commands
        .iter()
        .map(|(cmd, rel)| format!(r#""{cmd}": "{rel}""#))
        .collect();
    let manifest = format!(
        r#"{{"name": "{name}", "bin": {{{}}}}}"#,
        bin_entries.join(", ")
    );

    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let mut dir = tar::Header::new_gnu();
    dir.set_entry_type(tar::EntryType::Directory);
    dir.set_size(0);
    dir.set_mode(0o755);
    dir.set_cksum();
    builder
        .append_data(&mut dir, "package/", std::io::empty())
        .unwrap();

    let mut header = tar::Header::new_gnu();
    header.set_size(manifest.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append_data(&mut header, "package/package.json", manifest.as_bytes())
        .unwrap();

    for (_, rel) in commands {
        let script = "#!/usr/bin/env node\nconsole.log('ok');\n";
        let mut header = tar::Header::new_gnu();
        header.set_size(script.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(&mut header, format!("package/{rel}"), script.as_bytes())
            .unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap()
}
