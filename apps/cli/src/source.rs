use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::fs;

use skipdeck_core::{FetchError, Transcript, TranscriptProvider, TranscriptSegment};

/// One entry of the transcript JSON file: an array of
/// `{"start": 30.0, "duration": 6.0, "text": "..."}` records.
#[derive(Debug, Deserialize)]
struct SegmentRecord {
    start: f64,
    duration: f64,
    text: String,
}

/// Reads a transcript from a local JSON file, standing in for a caption
/// download service.
pub struct FileTranscriptSource {
    path: PathBuf,
}

impl FileTranscriptSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl TranscriptProvider for FileTranscriptSource {
    async fn fetch(&self, url: &str) -> Result<Transcript, FetchError> {
        let raw = fs::read_to_string(&self.path).await.map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                FetchError::NotFound {
                    url: url.to_string(),
                }
            } else {
                FetchError::Network {
                    url: url.to_string(),
                    reason: err.to_string(),
                }
            }
        })?;

        let records: Vec<SegmentRecord> =
            serde_json::from_str(&raw).map_err(|err| FetchError::NoTranscript {
                url: url.to_string(),
                reason: format!("malformed transcript JSON: {err}"),
            })?;

        let mut segments = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let segment = TranscriptSegment::new(record.start, record.duration, record.text)
                .map_err(|err| FetchError::NoTranscript {
                    url: url.to_string(),
                    reason: format!("segment {index}: {err}"),
                })?;
            segments.push(segment);
        }
        Ok(Transcript::new(segments))
    }
}
