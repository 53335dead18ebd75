use async_trait::async_trait;

use crate::error::FetchError;
use crate::types::Transcript;

/// Where transcripts come from. The pipeline only consumes this
/// capability; concrete implementations (file readers, HTTP clients)
/// live with the application that owns the I/O.
///
/// `fetch` resolves a caller-supplied label, usually a video URL, into
/// an ordered transcript. Implementations map their failure modes onto
/// [`FetchError`] so the pipeline can report them uniformly.
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Transcript, FetchError>;
}
