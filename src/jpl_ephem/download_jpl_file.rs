//! Where the ephemeris comes from: parsing of the source string and location
//! of the DE kernel on disk.
//!
//! Accepted source strings:
//!
//! * `"naif:DE440"`: a DE version, looked up in the per-user cache directory
//!   (`<cache_dir>/ndastro/jpl_ephem/de440.bsp`) and downloaded from NAIF when
//!   missing if the `jpl-download` feature is enabled,
//! * `"naif:/path/to/kernel.bsp"`: a kernel at a user-provided path,
//! * `"analytic"`: the built-in low-precision ephemeris, no file involved.
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;
use log::debug;

use crate::ndastro_errors::NdastroError;

use super::naif::naif_version::NaifVersion;

#[cfg(feature = "jpl-download")]
use {
    log::info,
    tokio::{fs::File, io::AsyncWriteExt},
    tokio_stream::StreamExt,
};

#[derive(Debug, Clone, PartialEq)]
pub enum EphemFileSource {
    /// A DE kernel distributed by NAIF, cached per user.
    Naif(NaifVersion),
    /// A kernel at a user-provided path.
    NaifPath(Utf8PathBuf),
    Analytic,
}

impl TryFrom<&str> for EphemFileSource {
    type Error = NdastroError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("analytic") {
            return Ok(EphemFileSource::Analytic);
        }

        let Some((kind, target)) = trimmed.split_once(':') else {
            return Err(NdastroError::InvalidJPLStringFormat(format!(
                "{value}, expected 'naif:<version>', 'naif:<path>' or 'analytic'"
            )));
        };

        match kind.to_ascii_lowercase().as_str() {
            "naif" if target.is_empty() => Err(NdastroError::InvalidJPLStringFormat(format!(
                "{value}, missing version or path after 'naif:'"
            ))),
            "naif" if target.contains('/') || target.contains('\\') || target.ends_with(".bsp") => {
                Ok(EphemFileSource::NaifPath(Utf8PathBuf::from(target)))
            }
            "naif" => Ok(EphemFileSource::Naif(target.parse()?)),
            _ => Err(NdastroError::InvalidJPLStringFormat(format!(
                "{value}, unknown ephemeris kind '{kind}'"
            ))),
        }
    }
}

/// Resolved location of a DE kernel on disk.
#[derive(Debug, Clone, PartialEq)]
pub enum EphemFilePath {
    Naif(Utf8PathBuf),
}

impl EphemFilePath {
    pub fn path(&self) -> &Utf8Path {
        match self {
            EphemFilePath::Naif(path) => path,
        }
    }

    /// Locate the kernel described by `file_source`.
    ///
    /// Return
    /// ------
    /// * The path of an existing kernel file.
    /// * [`NdastroError::JPLFileNotFound`] when a user path does not exist, or
    ///   when a cached version is missing and cannot be downloaded.
    pub fn get_ephemeris_file(file_source: &EphemFileSource) -> Result<Self, NdastroError> {
        match file_source {
            EphemFileSource::NaifPath(path) => {
                if path.exists() {
                    Ok(EphemFilePath::Naif(path.clone()))
                } else {
                    Err(NdastroError::JPLFileNotFound(path.to_string()))
                }
            }
            EphemFileSource::Naif(version) => {
                let local_file = cache_directory()?.join(version.get_filename());
                if local_file.exists() {
                    debug!("Found cached kernel {local_file}");
                    return Ok(EphemFilePath::Naif(local_file));
                }
                fetch_kernel(*version, &local_file)?;
                Ok(EphemFilePath::Naif(local_file))
            }
            EphemFileSource::Analytic => Err(NdastroError::InvalidJPLStringFormat(
                "the analytic ephemeris has no kernel file".into(),
            )),
        }
    }
}

/// `<cache_dir>/ndastro/jpl_ephem`, created if needed.
pub fn cache_directory() -> Result<Utf8PathBuf, NdastroError> {
    let base_dir = BaseDirs::new().ok_or_else(|| {
        NdastroError::UnableToCreateBaseDir("no home directory for the current user".into())
    })?;
    let cache = Utf8Path::from_path(base_dir.cache_dir()).ok_or_else(|| {
        NdastroError::UnableToCreateBaseDir(format!(
            "cache directory {} is not valid UTF-8",
            base_dir.cache_dir().display()
        ))
    })?;
    let cache_path = cache.join("ndastro").join("jpl_ephem");
    fs::create_dir_all(&cache_path)
        .map_err(|err| NdastroError::UnableToCreateBaseDir(format!("{cache_path}: {err}")))?;
    Ok(cache_path)
}

#[cfg(not(feature = "jpl-download"))]
fn fetch_kernel(_version: NaifVersion, local_file: &Utf8Path) -> Result<(), NdastroError> {
    Err(NdastroError::JPLFileNotFound(local_file.to_string()))
}

#[cfg(feature = "jpl-download")]
fn fetch_kernel(version: NaifVersion, local_file: &Utf8Path) -> Result<(), NdastroError> {
    let url = version.url();
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(download_big_file(&url, local_file));
    if result.is_err() {
        // never leave a truncated kernel in the cache
        let _ = fs::remove_file(local_file);
    }
    result
}

/// Stream a large file from `url` to `path` chunk by chunk.
#[cfg(feature = "jpl-download")]
async fn download_big_file(url: &str, path: &Utf8Path) -> Result<(), NdastroError> {
    let mut file = File::create(path).await?;
    info!("Downloading {url}...");

    let mut stream = reqwest::get(url).await?.error_for_status()?.bytes_stream();

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result?;
        file.write_all(&chunk).await?;
    }

    file.flush().await?;

    info!("Downloaded {url} to {path}");
    Ok(())
}

#[cfg(test)]
mod test_ephem_source {
    use super::*;

    #[test]
    fn test_parse_source() {
        assert_eq!(
            EphemFileSource::try_from("naif:DE440").unwrap(),
            EphemFileSource::Naif(NaifVersion::DE440)
        );
        assert_eq!(
            EphemFileSource::try_from(" NAIF:de440s ").unwrap(),
            EphemFileSource::Naif(NaifVersion::DE440s)
        );
        assert_eq!(
            EphemFileSource::try_from("naif:/data/kernels/de440.bsp").unwrap(),
            EphemFileSource::NaifPath(Utf8PathBuf::from("/data/kernels/de440.bsp"))
        );
        assert_eq!(
            EphemFileSource::try_from("Analytic").unwrap(),
            EphemFileSource::Analytic
        );
    }

    #[test]
    fn test_invalid_source() {
        assert!(matches!(
            EphemFileSource::try_from("de440"),
            Err(NdastroError::InvalidJPLStringFormat(_))
        ));
        assert!(matches!(
            EphemFileSource::try_from("horizon:DE440"),
            Err(NdastroError::InvalidJPLStringFormat(_))
        ));
        assert!(matches!(
            EphemFileSource::try_from("naif:"),
            Err(NdastroError::InvalidJPLStringFormat(_))
        ));
        assert_eq!(
            EphemFileSource::try_from("naif:DE999"),
            Err(NdastroError::InvalidJPLEphemFileVersion("DE999".to_string()))
        );
    }

    #[test]
    fn test_missing_user_path() {
        let source = EphemFileSource::NaifPath(Utf8PathBuf::from("/nonexistent/kernel.bsp"));
        assert_eq!(
            EphemFilePath::get_ephemeris_file(&source),
            Err(NdastroError::JPLFileNotFound("/nonexistent/kernel.bsp".to_string()))
        );
        assert!(EphemFilePath::get_ephemeris_file(&EphemFileSource::Analytic).is_err());
    }

    #[test]
    #[cfg(feature = "jpl-download")]
    fn test_feature_download_jpl_ephem() {
        let source = EphemFileSource::Naif(NaifVersion::DE440s);
        let path = EphemFilePath::get_ephemeris_file(&source).unwrap();
        assert!(path.path().exists(), "JPL ephemeris file not found");
        assert_eq!(path.path().file_name(), Some("de440s.bsp"));
    }
}
