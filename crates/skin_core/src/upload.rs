use crate::preview::PreviewId;
use anyhow::{Context, Result};
use image::ImageFormat;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Largest accepted upload: 10 MiB, inclusive.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

const IMAGE_TYPE_PREFIX: &str = "image/";
const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// Why a selected file was turned away. The messages are shown to the operator as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AcquireError {
    #[error("Silakan pilih file gambar yang valid (JPG, PNG, dll.)")]
    InvalidType,
    #[error("Ukuran file terlalu besar. Maksimal 10MB.")]
    TooLarge,
}

/// A file the operator picked or dropped, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub name: String,
    /// Declared media type, e.g. `image/jpeg`.
    pub media_type: String,
    pub bytes: Arc<[u8]>,
}

impl CandidateFile {
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk and sniff its media type. At most one byte past
    /// [`MAX_UPLOAD_BYTES`] is read, which is enough for `validate` to report
    /// `TooLarge` without buffering the whole file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("tidak dapat membuka file: {}", path.display()))?;
        let mut bytes = Vec::new();
        file.take(MAX_UPLOAD_BYTES + 1)
            .read_to_end(&mut bytes)
            .with_context(|| format!("tidak dapat membaca file: {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let media_type = sniff_media_type(path, &bytes);
        Ok(Self::new(name, media_type, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// An accepted photo, owned by the session until it is superseded or reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub name: String,
    pub media_type: String,
    pub bytes: Arc<[u8]>,
    /// Handle of the preview resource allocated for this image.
    pub preview: PreviewId,
}

impl UploadedImage {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Check a candidate against the upload contract. The type check runs first, so a
/// huge text file is reported as `InvalidType`.
pub fn validate(
    candidate: CandidateFile,
    preview: PreviewId,
) -> Result<UploadedImage, AcquireError> {
    if !candidate.media_type.starts_with(IMAGE_TYPE_PREFIX) {
        return Err(AcquireError::InvalidType);
    }
    if candidate.size() > MAX_UPLOAD_BYTES {
        return Err(AcquireError::TooLarge);
    }
    Ok(UploadedImage {
        name: candidate.name,
        media_type: candidate.media_type,
        bytes: candidate.bytes,
        preview,
    })
}

/// Declared media type of a file. The extension decides; the content is only
/// consulted when the name has no extension at all, since a few ASCII bytes
/// (`BM`, `P1`) already look like an image header.
pub fn sniff_media_type(path: &Path, bytes: &[u8]) -> String {
    let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
        return match image::guess_format(bytes) {
            Ok(format) => format.to_mime_type().to_string(),
            Err(_) => UNKNOWN_MEDIA_TYPE.to_string(),
        };
    };
    if let Some(format) = ImageFormat::from_extension(ext) {
        return format.to_mime_type().to_string();
    }
    match ext.to_ascii_lowercase().as_str() {
        "txt" | "csv" | "md" => "text/plain".to_string(),
        _ => UNKNOWN_MEDIA_TYPE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

    fn candidate(media_type: &str, size: usize) -> CandidateFile {
        CandidateFile::new("foto", media_type, vec![0u8; size])
    }

    #[rstest]
    #[case("text/plain")]
    #[case("application/pdf")]
    #[case("video/mp4")]
    #[case("")]
    fn non_image_types_are_rejected(#[case] media_type: &str) {
        let err = validate(candidate(media_type, 16), PreviewId::new(1)).unwrap_err();
        assert_eq!(err, AcquireError::InvalidType);
    }

    #[rstest]
    #[case(MAX_UPLOAD_BYTES as usize + 1)]
    #[case(12 * 1024 * 1024)]
    fn oversized_images_are_rejected(#[case] size: usize) {
        let err = validate(candidate("image/png", size), PreviewId::new(1)).unwrap_err();
        assert_eq!(err, AcquireError::TooLarge);
    }

    #[test]
    fn type_is_checked_before_size() {
        let err = validate(candidate("text/plain", 11 * 1024 * 1024), PreviewId::new(1))
            .unwrap_err();
        assert_eq!(err, AcquireError::InvalidType);
    }

    #[rstest]
    #[case("image/jpeg", 0)]
    #[case("image/png", 2_000_000)]
    #[case("image/gif", MAX_UPLOAD_BYTES as usize)]
    fn images_within_limit_are_accepted(#[case] media_type: &str, #[case] size: usize) {
        let image = validate(candidate(media_type, size), PreviewId::new(7)).unwrap();
        assert_eq!(image.size(), size as u64);
        assert_eq!(image.media_type, media_type);
        assert_eq!(image.preview, PreviewId::new(7));
    }

    #[test]
    fn rejection_messages_are_operator_facing() {
        assert_eq!(
            AcquireError::TooLarge.to_string(),
            "Ukuran file terlalu besar. Maksimal 10MB."
        );
        assert!(AcquireError::InvalidType.to_string().starts_with("Silakan pilih"));
    }

    #[rstest]
    #[case("scan.txt", PNG_MAGIC, "text/plain")]
    #[case("catatan.txt", b"BMI 22", "text/plain")]
    #[case("hasil.csv", b"P1,P2,P3", "text/plain")]
    #[case("foto.png", b"BMI 22", "image/png")]
    fn extension_outranks_content(
        #[case] name: &str,
        #[case] bytes: &[u8],
        #[case] expected: &str,
    ) {
        assert_eq!(sniff_media_type(Path::new(name), bytes), expected);
    }

    #[rstest]
    #[case(PNG_MAGIC, "image/png")]
    #[case(b"\xff\xd8\xff\xe0", "image/jpeg")]
    #[case(b"hello", "application/octet-stream")]
    fn content_decides_without_extension(#[case] bytes: &[u8], #[case] expected: &str) {
        let path = PathBuf::from("kamera_0001");
        assert_eq!(sniff_media_type(&path, bytes), expected);
    }

    #[rstest]
    #[case("wajah.JPG", "image/jpeg")]
    #[case("wajah.png", "image/png")]
    #[case("catatan.txt", "text/plain")]
    #[case("arsip.bin", "application/octet-stream")]
    fn sniff_falls_back_to_extension(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(sniff_media_type(Path::new(name), b"not an image"), expected);
    }

    #[test]
    fn from_path_reads_name_size_and_type() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("pasien.png");
        fs::write(&path, PNG_MAGIC)?;

        let file = CandidateFile::from_path(&path)?;
        assert_eq!(file.name, "pasien.png");
        assert_eq!(file.media_type, "image/png");
        assert_eq!(file.size(), PNG_MAGIC.len() as u64);
        Ok(())
    }

    #[test]
    fn text_note_with_image_like_header_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("catatan.txt");
        fs::write(&path, "BMI pasien: 22.5\nTekanan darah normal\n")?;

        let file = CandidateFile::from_path(&path)?;
        assert_eq!(file.media_type, "text/plain");
        assert_eq!(
            validate(file, PreviewId::new(1)).unwrap_err(),
            AcquireError::InvalidType
        );
        Ok(())
    }

    #[test]
    fn huge_file_is_read_only_past_the_limit() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("besar.png");
        File::create(&path)?.set_len(200 * 1024 * 1024)?;

        let file = CandidateFile::from_path(&path)?;
        assert_eq!(file.media_type, "image/png");
        assert_eq!(file.size(), MAX_UPLOAD_BYTES + 1);
        assert_eq!(
            validate(file, PreviewId::new(1)).unwrap_err(),
            AcquireError::TooLarge
        );
        Ok(())
    }

    #[test]
    fn file_at_the_limit_is_read_whole() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("pas.jpg");
        File::create(&path)?.set_len(MAX_UPLOAD_BYTES)?;

        let file = CandidateFile::from_path(&path)?;
        assert_eq!(file.size(), MAX_UPLOAD_BYTES);
        assert!(validate(file, PreviewId::new(1)).is_ok());
        Ok(())
    }

    #[test]
    fn from_path_reports_missing_file() {
        let dir = tempdir().unwrap();
        assert!(CandidateFile::from_path(dir.path().join("hilang.jpg")).is_err());
    }
}
