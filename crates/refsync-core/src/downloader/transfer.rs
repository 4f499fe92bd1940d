//! Single HTTP GET streamed to a `.part` file, renamed into place on success.

use super::part_file::part_path;
use super::DownloadOptions;
use crate::retry::TransferError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write buffer between curl's chunks and the disk.
const WRITE_BUF: usize = 64 * 1024;

/// One attempt: GET `url`, stream the body to `dest.part`, check the status, rename to `dest`.
/// The `.part` file is truncated at the start of every attempt, so retries never append.
/// Returns the number of body bytes written.
pub(super) fn fetch_to_path(
    url: &str,
    dest: &Path,
    opts: &DownloadOptions,
) -> Result<u64, TransferError> {
    let part = part_path(dest);
    let file = File::create(&part).map_err(TransferError::Storage)?;
    let mut writer = BufWriter::with_capacity(WRITE_BUF, file);
    let mut written = 0u64;
    let mut write_error: Option<std::io::Error> = None;

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(opts.max_redirections)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.timeout(opts.timeout)?;
    easy.useragent(&opts.user_agent)?;
    // Stop at the status line for 4xx/5xx instead of saving an error page.
    easy.fail_on_error(true)?;

    let performed = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match writer.write_all(data) {
            Ok(()) => {
                written += data.len() as u64;
                Ok(data.len())
            }
            Err(e) => {
                write_error = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform()
    };

    if let Err(e) = performed {
        if e.is_write_error() {
            if let Some(io_err) = write_error.take() {
                return Err(TransferError::Storage(io_err));
            }
        }
        if e.is_http_returned_error() {
            return Err(TransferError::Http(easy.response_code()?));
        }
        return Err(TransferError::Curl(e));
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(TransferError::Http(code));
    }

    writer.flush().map_err(TransferError::Storage)?;
    drop(writer);
    std::fs::rename(&part, dest).map_err(TransferError::Storage)?;
    Ok(written)
}
