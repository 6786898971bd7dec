use futures::TryStreamExt;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;
use url::Url;

/// Opens `url` as a byte stream. Non-success statuses are errors.
pub async fn open_remote(
    client: &reqwest::Client,
    url: &Url,
) -> Result<Box<dyn AsyncRead + Unpin + Send>, reqwest::Error> {
    let response = client.get(url.clone()).send().await?.error_for_status()?;

    tracing::info!(
        "🌐 Fetching {} (Content-Length: {:?})",
        url,
        response.content_length()
    );

    let stream = response.bytes_stream().map_err(std::io::Error::other);
    Ok(Box::new(StreamReader::new(Box::pin(stream))))
}

/// Last non-empty path segment of `url`, percent-decoded.
pub fn remote_basename(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(|segment| {
            percent_encoding::percent_decode_str(segment)
                .decode_utf8_lossy()
                .into_owned()
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "download".to_string())
}
