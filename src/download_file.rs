//! Local cache of the data files the crate reads: correction tables and JPL kernels.
//!
//! A file is looked for at its cache path first. When it is missing and the `download`
//! feature is enabled, it is streamed from its canonical URL and kept for the next runs.

use std::fs::File;
use std::io::BufReader;

use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;

use crate::skyward_errors::SkywardError;

/// `<user cache dir>/skyward_cache`
pub fn cache_root() -> Result<Utf8PathBuf, SkywardError> {
    let base_dir = BaseDirs::new().ok_or_else(|| {
        SkywardError::UnableToCreateBaseDir("no home directory for this user".into())
    })?;
    let cache_path = Utf8Path::from_path(base_dir.cache_dir()).ok_or_else(|| {
        SkywardError::Utf8PathError(format!("{}", base_dir.cache_dir().display()))
    })?;
    Ok(cache_path.join("skyward_cache"))
}

/// Stream a remote data file into the local cache.
///
/// The response body is consumed chunk by chunk with tokio file I/O, since an
/// EOP table weighs a few megabytes and a planetary kernel a few dozen.
///
/// The content is first written next to `path` with a `.part` suffix and renamed
/// once complete, so an interrupted transfer never leaves a truncated file behind.
///
/// Arguments
/// ---------
/// * `url`: the URL of the file to download
/// * `path`: the path to save the downloaded file
///
/// Return
/// ------
/// * An error if the download fails
/// * Ok(()) if the download is successful
#[cfg(feature = "download")]
async fn download_big_file(url: &str, path: &Utf8Path) -> Result<(), SkywardError> {
    use tokio::{fs::File, io::AsyncWriteExt};
    use tokio_stream::StreamExt;

    let partial = Utf8PathBuf::from(format!("{path}.part"));
    let mut file = File::create(&partial).await?;
    log::info!("Downloading {url}...");

    let mut stream = reqwest::get(url)
        .await?
        .error_for_status()?
        .bytes_stream();

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result?;
        file.write_all(&chunk).await?;
    }

    file.flush().await?;
    tokio::fs::rename(&partial, path).await?;

    log::info!("Downloaded {url}");
    Ok(())
}

/// Fetch `url` into `local_file`, creating the cache directory if needed.
#[cfg(feature = "download")]
fn fetch_file(
    local_file: &Utf8Path,
    url: &str,
    failure: fn(String) -> SkywardError,
) -> Result<(), SkywardError> {
    if let Some(parent) = local_file.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| SkywardError::UnableToCreateBaseDir(format!("{parent}: {e}")))?;
    }

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| failure(format!("unable to start the download of {url}: {e}")))?;
    rt.block_on(download_big_file(url, local_file)).map_err(|e| {
        let _ = std::fs::remove_file(format!("{local_file}.part"));
        failure(format!("unable to download {url}: {e}"))
    })
}

#[cfg(not(feature = "download"))]
fn fetch_file(
    local_file: &Utf8Path,
    _url: &str,
    failure: fn(String) -> SkywardError,
) -> Result<(), SkywardError> {
    Err(failure(format!(
        "{local_file} not found and the download feature is disabled"
    )))
}

/// Open a cached data file, downloading it first when it is missing.
///
/// Arguments
/// ---------
/// * `local_file`: path of the file in the local cache
/// * `url`: canonical source of the file
/// * `failure`: the error variant reported when the file can be neither opened nor fetched
///
/// Return
/// ------
/// * a buffered reader over the local file
/// * `failure(message)` if the file can be neither opened nor fetched
pub fn open_or_fetch(
    local_file: &Utf8Path,
    url: &str,
    failure: fn(String) -> SkywardError,
) -> Result<BufReader<File>, SkywardError> {
    if let Ok(file) = File::open(local_file) {
        return Ok(BufReader::new(file));
    }

    fetch_file(local_file, url, failure)?;

    File::open(local_file)
        .map(BufReader::new)
        .map_err(|e| failure(format!("unable to open {local_file}: {e}")))
}
