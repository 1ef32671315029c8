//! Streaming downloads with banded progress, and archive extraction.

use crate::error::InstallError;
use futures_util::StreamExt;
use std::io::Cursor;
use std::path::Path;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// One progress update.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub message: String,
    /// Overall completion in `[0, 1]`.
    pub fraction: f32,
}

/// Receiver of progress updates.
pub trait ProgressSink: Send + Sync {
    fn report(&self, message: &str, fraction: f32);
}

impl ProgressSink for tokio::sync::mpsc::UnboundedSender<Progress> {
    fn report(&self, message: &str, fraction: f32) {
        // A dropped receiver only means nobody is watching anymore.
        let _ = self.send(Progress {
            message: message.to_string(),
            fraction: fraction.clamp(0.0, 1.0),
        });
    }
}

/// Sink that discards everything.
pub struct Silent;

impl ProgressSink for Silent {
    fn report(&self, _message: &str, _fraction: f32) {}
}

/// Slice of the overall `[0, 1]` progress range allotted to one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressBand {
    pub start: f32,
    pub end: f32,
}

impl ProgressBand {
    pub const fn new(start: f32, end: f32) -> Self {
        ProgressBand { start, end }
    }

    /// Position within the band after `done` of `total` units.
    pub fn at(&self, done: u64, total: u64) -> f32 {
        if total == 0 {
            return self.start;
        }
        let ratio = (done as f64 / total as f64).min(1.0) as f32;
        self.start + (self.end - self.start) * ratio
    }
}

fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

/// Stream `url` into `sink`, reporting progress inside `band`.
///
/// Progress inside the band is only reported when the server sends a
/// content length; otherwise only the band boundaries are reported. When a
/// length is announced, receiving a different number of bytes is an error.
pub async fn stream<W>(
    client: &reqwest::Client,
    url: &str,
    sink: &mut W,
    band: ProgressBand,
    label: &str,
    progress: &dyn ProgressSink,
) -> Result<u64, InstallError>
where
    W: AsyncWrite + Unpin,
{
    let response = crate::http::get(client, url).await?;
    let total_size = response.content_length().filter(|size| *size > 0);

    progress.report(&format!("Downloading {}...", label), band.start);

    let mut written: u64 = 0;
    let mut body = response.bytes_stream();

    while let Some(chunk) = body.next().await {
        let chunk = chunk
            .map_err(|e| InstallError::Network(format!("Failed to read download chunk from {}: {}", url, e)))?;
        sink.write_all(&chunk).await?;
        written += chunk.len() as u64;

        if let Some(total) = total_size {
            progress.report(
                &format!(
                    "Downloading {}... {:.1}MB / {:.1}MB",
                    label,
                    megabytes(written),
                    megabytes(total)
                ),
                band.at(written, total),
            );
        }
    }

    sink.flush().await?;

    if let Some(total) = total_size {
        if written != total {
            return Err(InstallError::Network(format!(
                "Download of {} truncated: received {} of {} bytes",
                url, written, total
            )));
        }
    }

    progress.report(&format!("Downloaded {}", label), band.end);
    Ok(written)
}

/// Download `url` to `dest`. The payload lands in a `.part` file first and
/// is renamed into place only once complete.
pub async fn download_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    band: ProgressBand,
    progress: &dyn ProgressSink,
) -> Result<u64, InstallError> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let label = dest
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| url.to_string());

    let temp_path = dest.with_extension("part");
    let mut file = tokio::fs::File::create(&temp_path).await?;

    let result = stream(client, url, &mut file, band, &label, progress).await;
    drop(file);

    match result {
        Ok(written) => {
            tokio::fs::rename(&temp_path, dest).await?;
            tracing::debug!("Downloaded {} bytes to {}", written, dest.display());
            Ok(written)
        }
        Err(e) => {
            let _ = tokio::fs::remove_file(&temp_path).await;
            Err(e)
        }
    }
}

/// Download `url` into memory.
pub async fn download_to_memory(
    client: &reqwest::Client,
    url: &str,
    band: ProgressBand,
    label: &str,
    progress: &dyn ProgressSink,
) -> Result<Vec<u8>, InstallError> {
    let mut buffer = Vec::new();
    stream(client, url, &mut buffer, band, label, progress).await?;
    Ok(buffer)
}

/// Extract an in-memory archive, choosing the format from `name`.
pub fn extract_archive(data: &[u8], name: &str, dest_dir: &Path) -> Result<(), InstallError> {
    if name.ends_with(".zip") {
        extract_zip(data, dest_dir)
    } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        extract_tar_gz(data, dest_dir)
    } else {
        Err(InstallError::Archive(format!("Unsupported archive format: {}", name)))
    }
}

/// Extract a tar.gz archive.
pub fn extract_tar_gz(data: &[u8], dest_dir: &Path) -> Result<(), InstallError> {
    let decoder = flate2::read::GzDecoder::new(Cursor::new(data));
    let mut archive = tar::Archive::new(decoder);

    std::fs::create_dir_all(dest_dir)?;
    archive
        .unpack(dest_dir)
        .map_err(|e| InstallError::Archive(format!("Failed to extract tar.gz archive: {}", e)))
}

/// Extract a zip archive.
pub fn extract_zip(data: &[u8], dest_dir: &Path) -> Result<(), InstallError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))?;

    std::fs::create_dir_all(dest_dir)?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let Some(relative) = file.enclosed_name() else {
            tracing::warn!("Skipping unsafe archive entry {}", file.name());
            continue;
        };
        let outpath = dest_dir.join(relative);

        if file.is_dir() {
            std::fs::create_dir_all(&outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut outfile = std::fs::File::create(&outpath)?;
            std::io::copy(&mut file, &mut outfile)?;
        }

        // Set permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = file.unix_mode() {
                std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Sink that records every update, for assertions.
    #[derive(Default)]
    pub(crate) struct Recorder {
        pub updates: Mutex<Vec<Progress>>,
    }

    impl Recorder {
        pub fn fractions(&self) -> Vec<f32> {
            self.updates.lock().unwrap().iter().map(|p| p.fraction).collect()
        }

        pub fn messages(&self) -> Vec<String> {
            self.updates.lock().unwrap().iter().map(|p| p.message.clone()).collect()
        }
    }

    impl ProgressSink for Recorder {
        fn report(&self, message: &str, fraction: f32) {
            self.updates.lock().unwrap().push(Progress {
                message: message.to_string(),
                fraction,
            });
        }
    }

    #[test]
    fn test_band_mapping() {
        let band = ProgressBand::new(0.45, 0.85);
        assert_eq!(band.at(0, 100), 0.45);
        assert!((band.at(50, 100) - 0.65).abs() < 1e-6);
        assert!((band.at(100, 100) - 0.85).abs() < 1e-6);
        assert!((band.at(500, 100) - 0.85).abs() < 1e-6);
        assert_eq!(band.at(10, 0), 0.45);
    }

    #[tokio::test]
    async fn test_stream_to_memory_stays_in_band() {
        let server = MockServer::start().await;
        let payload = vec![7u8; 200_000];
        Mock::given(method("GET"))
            .and(path("/blob"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(payload.clone()))
            .mount(&server)
            .await;

        let recorder = Recorder::default();
        let client = crate::http::client().unwrap();
        let band = ProgressBand::new(0.05, 0.35);
        let data = download_to_memory(&client, &format!("{}/blob", server.uri()), band, "blob", &recorder)
            .await
            .unwrap();

        assert_eq!(data, payload);
        let fractions = recorder.fractions();
        assert_eq!(fractions.first().copied(), Some(0.05));
        assert_eq!(fractions.last().copied(), Some(0.35));
        assert!(fractions.iter().all(|f| (0.05..=0.35).contains(f)));
        assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
    }

    /// Answer a single request with a hand-written HTTP response.
    async fn serve_once(response: &'static [u8]) -> String {
        use tokio::io::AsyncReadExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{}/blob", addr)
    }

    #[tokio::test]
    async fn test_unknown_length_reports_band_edges_only() {
        let url = serve_once(
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n\
              5\r\nhello\r\n6\r\n world\r\n0\r\n\r\n",
        )
        .await;

        let recorder = Recorder::default();
        let client = crate::http::client().unwrap();
        let data = download_to_memory(&client, &url, ProgressBand::new(0.05, 0.35), "blob", &recorder)
            .await
            .unwrap();

        assert_eq!(data, b"hello world");
        assert_eq!(recorder.fractions(), vec![0.05, 0.35]);
        assert_eq!(
            recorder.messages(),
            vec!["Downloading blob...".to_string(), "Downloaded blob".to_string()]
        );
    }

    #[tokio::test]
    async fn test_truncated_body_is_rejected() {
        let url = serve_once(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\nConnection: close\r\n\r\nonly ten b").await;

        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("server.jar");
        let recorder = Recorder::default();
        let client = crate::http::client().unwrap();
        let result = download_file(&client, &url, &dest, ProgressBand::new(0.45, 0.85), &recorder).await;

        assert!(matches!(result, Err(InstallError::Network(_))), "{result:?}");
        assert!(!recorder.fractions().contains(&0.85));
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_download_file_renames_into_place() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/server.jar"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jar-bytes".to_vec()))
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("server.jar");
        let client = crate::http::client().unwrap();
        let written = download_file(
            &client,
            &format!("{}/server.jar", server.uri()),
            &dest,
            ProgressBand::new(0.45, 0.85),
            &Silent,
        )
        .await
        .unwrap();

        assert_eq!(written, 9);
        assert_eq!(std::fs::read(&dest).unwrap(), b"jar-bytes");
        assert!(!tmp.path().join("server.part").exists());
    }

    #[tokio::test]
    async fn test_http_failure_propagates_and_leaves_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("server.jar");
        let client = crate::http::client().unwrap();
        let result = download_file(
            &client,
            &format!("{}/missing.jar", server.uri()),
            &dest,
            ProgressBand::new(0.45, 0.85),
            &Silent,
        )
        .await;

        assert!(matches!(result, Err(InstallError::Network(_))));
        assert!(!dest.exists());
        assert!(!tmp.path().join("server.part").exists());
    }

    #[test]
    fn test_extract_zip_and_tar() {
        use std::io::Write;

        let tmp = tempfile::tempdir().unwrap();

        let mut zip_bytes = Vec::new();
        {
            let mut writer = zip::ZipWriter::new(Cursor::new(&mut zip_bytes));
            let options = zip::write::SimpleFileOptions::default();
            writer.add_directory("jdk-17/bin/", options).unwrap();
            writer.start_file("jdk-17/bin/java.exe", options).unwrap();
            writer.write_all(b"exe").unwrap();
            writer.finish().unwrap();
        }
        extract_archive(&zip_bytes, "jdk.zip", &tmp.path().join("z")).unwrap();
        assert!(tmp.path().join("z/jdk-17/bin/java.exe").exists());

        let mut tar_bytes = Vec::new();
        {
            let encoder =
                flate2::write::GzEncoder::new(&mut tar_bytes, flate2::Compression::default());
            let mut builder = tar::Builder::new(encoder);
            let mut header = tar::Header::new_gnu();
            header.set_size(4);
            header.set_mode(0o755);
            header.set_cksum();
            builder
                .append_data(&mut header, "jdk-17/bin/java", &b"java"[..])
                .unwrap();
            builder.into_inner().unwrap().finish().unwrap();
        }
        extract_archive(&tar_bytes, "jdk.tar.gz", &tmp.path().join("t")).unwrap();
        assert!(tmp.path().join("t/jdk-17/bin/java").exists());

        assert!(matches!(
            extract_archive(b"", "jdk.rar", tmp.path()),
            Err(InstallError::Archive(_))
        ));
    }
}
