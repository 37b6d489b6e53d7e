use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::ColorType;
use log::{debug, info, warn};
use uuid::Uuid;

use super::error::{CaptureError, PreprocessError};
use super::handoff::Navigator;
use super::models::{mime_for_path, CapturedImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Camera,
    Library,
}

impl SourceKind {
    pub fn permission_name(&self) -> &'static str {
        match self {
            SourceKind::Camera => "Camera",
            SourceKind::Library => "Photo library",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Platform side of image acquisition.
#[async_trait]
pub trait CaptureBackend: Send + Sync {
    async fn request_permission(&self, kind: SourceKind) -> PermissionStatus;

    /// Returns the URI of the acquired photo, or `None` when the user backed out.
    async fn acquire(&self, kind: SourceKind) -> Result<Option<String>, CaptureError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreprocessOptions {
    pub enabled: bool,
    pub max_width: u32,
    pub jpeg_quality: u8,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            max_width: 800,
            jpeg_quality: 70,
        }
    }
}

pub struct ImageSource<B: CaptureBackend> {
    backend: B,
    navigator: Arc<dyn Navigator>,
    options: PreprocessOptions,
    output_dir: PathBuf,
}

impl<B: CaptureBackend> ImageSource<B> {
    pub fn new(backend: B, navigator: Arc<dyn Navigator>, options: PreprocessOptions) -> Self {
        Self {
            backend,
            navigator,
            options,
            output_dir: std::env::temp_dir(),
        }
    }

    /// Directory that receives re-encoded images.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub async fn capture_from_camera(&self) -> Result<CapturedImage, CaptureError> {
        self.obtain(SourceKind::Camera).await
    }

    pub async fn pick_from_library(&self) -> Result<CapturedImage, CaptureError> {
        self.obtain(SourceKind::Library).await
    }

    async fn obtain(&self, kind: SourceKind) -> Result<CapturedImage, CaptureError> {
        if self.backend.request_permission(kind).await != PermissionStatus::Granted {
            warn!("{} permission denied", kind.permission_name());
            self.navigator.alert(
                "Permission Required",
                &format!("{} permission is required.", kind.permission_name()),
            );
            return Err(CaptureError::PermissionDenied(kind.permission_name()));
        }

        let uri = match self.backend.acquire(kind).await? {
            Some(uri) => uri,
            None => {
                debug!("{:?} capture cancelled by user", kind);
                return Err(CaptureError::Cancelled);
            }
        };

        let original = CapturedImage::new(uri.as_str(), mime_for_path(Path::new(&uri)));
        if !self.options.enabled {
            return Ok(original);
        }

        let options = self.options;
        let output_dir = self.output_dir.clone();
        let source = original.clone();
        let processed =
            tokio::task::spawn_blocking(move || preprocess(&source, &options, &output_dir)).await;

        // Pre-processing is best-effort; the original is still a valid capture
        match processed {
            Ok(Ok(image)) => Ok(image),
            Ok(Err(e)) => {
                warn!("Skipping pre-processing of {}: {}", uri, e);
                Ok(original)
            }
            Err(e) => {
                warn!("Pre-processing task for {} failed: {}", uri, e);
                Ok(original)
            }
        }
    }
}

/// Shrinks `image` to at most `max_width` pixels wide (aspect preserved,
/// never upscaled) and re-encodes it as JPEG into `output_dir`.
pub fn preprocess(
    image: &CapturedImage,
    options: &PreprocessOptions,
    output_dir: &Path,
) -> Result<CapturedImage, PreprocessError> {
    let path = image
        .local_path()
        .ok_or_else(|| PreprocessError::NotLocal(image.uri.clone()))?;

    let decoded = image::open(&path)?;
    let resized = if decoded.width() > options.max_width {
        decoded.resize(options.max_width, u32::MAX, FilterType::Lanczos3)
    } else {
        decoded
    };
    let rgb = resized.to_rgb8();

    let out_path = output_dir.join(format!("snapmeal-{}.jpg", Uuid::new_v4()));
    let mut writer = BufWriter::new(std::fs::File::create(&out_path)?);
    JpegEncoder::new_with_quality(&mut writer, options.jpeg_quality).encode(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        ColorType::Rgb8,
    )?;
    writer.flush()?;

    info!(
        "Re-encoded {} to {}x{} JPEG at {}",
        image.uri,
        rgb.width(),
        rgb.height(),
        out_path.display()
    );

    let uri = url::Url::from_file_path(&out_path)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| out_path.to_string_lossy().into_owned());

    Ok(CapturedImage::new(uri, "image/jpeg").with_dimensions(rgb.width(), rgb.height()))
}

/// Backend for desktop use: the "capture" is a file chosen up front.
/// No file means the user cancelled.
#[derive(Debug, Clone, Default)]
pub struct FileSystemBackend {
    path: Option<PathBuf>,
}

impl FileSystemBackend {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

#[async_trait]
impl CaptureBackend for FileSystemBackend {
    async fn request_permission(&self, _kind: SourceKind) -> PermissionStatus {
        let Some(path) = &self.path else {
            return PermissionStatus::Granted;
        };
        match tokio::fs::File::open(path).await {
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => PermissionStatus::Denied,
            _ => PermissionStatus::Granted,
        }
    }

    async fn acquire(&self, _kind: SourceKind) -> Result<Option<String>, CaptureError> {
        match &self.path {
            None => Ok(None),
            Some(path) if !path.is_file() => Err(CaptureError::Backend(format!(
                "{} is not a readable file",
                path.display()
            ))),
            Some(path) => Ok(Some(path.to_string_lossy().into_owned())),
        }
    }
}
