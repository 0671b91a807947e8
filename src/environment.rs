//! Cube-map environment: face references, loading and the one-shot load
//! state the rest of the scene reads.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use glam::Vec3;
use image::RgbaImage;
use log::{error, info};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of faces in a cube map.
pub const FACE_COUNT: usize = 6;

/// File names in +X, -X, +Y, -Y, +Z, -Z order.
pub const DEFAULT_FACE_NAMES: [&str; FACE_COUNT] =
    ["posx", "negx", "posy", "negy", "posz", "negz"];

/// Where the six faces live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaceBase {
    Directory(PathBuf),
    Url(String),
}

/// A single face location, resolved from a [`FaceSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaceRef {
    Path(PathBuf),
    Url(String),
}

impl fmt::Display for FaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// Ordered references to the six faces of a cube map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceSet {
    pub base: FaceBase,
    pub names: [String; FACE_COUNT],
}

impl FaceSet {
    /// Faces named `posx.<ext>` .. `negz.<ext>` inside `directory`.
    pub fn directory(directory: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            base: FaceBase::Directory(directory.into()),
            names: default_names(extension),
        }
    }

    /// Faces named `posx.<ext>` .. `negz.<ext>` under a remote base URL.
    pub fn url(base: impl Into<String>, extension: &str) -> Self {
        Self {
            base: FaceBase::Url(base.into()),
            names: default_names(extension),
        }
    }

    pub fn with_names(base: FaceBase, names: [String; FACE_COUNT]) -> Self {
        Self { base, names }
    }

    pub fn references(&self) -> Vec<FaceRef> {
        self.names
            .iter()
            .map(|name| match &self.base {
                FaceBase::Directory(dir) => FaceRef::Path(dir.join(name)),
                FaceBase::Url(base) => FaceRef::Url(join_url(base, name)),
            })
            .collect()
    }

    /// Fetches and decodes every face, stopping at the first failure.
    pub async fn load<F>(&self, fetcher: &F) -> Result<CubeFaces, EnvironmentError>
    where
        F: FaceFetcher,
    {
        let mut faces = Vec::with_capacity(FACE_COUNT);
        for reference in self.references() {
            let bytes = fetcher.fetch(&reference).await?;
            let image = image::load_from_memory(&bytes)
                .map_err(|err| EnvironmentError::Decode {
                    reference: reference.to_string(),
                    reason: err.to_string(),
                })?
                .to_rgba8();
            faces.push((reference, image));
        }
        CubeFaces::from_faces(faces)
    }
}

fn default_names(extension: &str) -> [String; FACE_COUNT] {
    let extension = extension.trim_start_matches('.');
    DEFAULT_FACE_NAMES.map(|name| format!("{name}.{extension}"))
}

fn join_url(base: &str, name: &str) -> String {
    if base.is_empty() || base.ends_with('/') {
        format!("{base}{name}")
    } else {
        format!("{base}/{name}")
    }
}

/// Reasons an environment map can fail to load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvironmentError {
    #[error("cannot resolve {reference}: {reason}")]
    Unresolvable { reference: String, reason: String },
    #[error("cannot decode {reference}: {reason}")]
    Decode { reference: String, reason: String },
    #[error("face {reference} is {width}x{height}, expected a {expected}x{expected} square")]
    FaceSize {
        reference: String,
        width: u32,
        height: u32,
        expected: u32,
    },
}

/// Source of raw face bytes.
pub trait FaceFetcher {
    fn fetch(&self, reference: &FaceRef)
        -> impl Future<Output = Result<Vec<u8>, EnvironmentError>>;
}

/// Reads faces from the local file system and fetches remote ones over HTTP.
///
/// Requests block, so interactive hosts load through `spawn_load`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeFetcher;

impl FaceFetcher for NativeFetcher {
    async fn fetch(&self, reference: &FaceRef) -> Result<Vec<u8>, EnvironmentError> {
        let unresolvable = |reason: String| EnvironmentError::Unresolvable {
            reference: reference.to_string(),
            reason,
        };
        match reference {
            FaceRef::Path(path) => std::fs::read(path).map_err(|err| unresolvable(err.to_string())),
            FaceRef::Url(url) => fetch_url(url).map_err(unresolvable),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn fetch_url(url: &str) -> Result<Vec<u8>, String> {
    let response = reqwest::blocking::get(url)
        .and_then(|response| response.error_for_status())
        .map_err(|err| err.to_string())?;
    let bytes = response.bytes().map_err(|err| err.to_string())?;
    Ok(bytes.to_vec())
}

#[cfg(target_arch = "wasm32")]
fn fetch_url(_url: &str) -> Result<Vec<u8>, String> {
    Err("remote faces go through the page's fetch() on the web build".to_string())
}

/// Decoded cube map: six square RGBA faces of equal size.
#[derive(Clone, PartialEq)]
pub struct CubeFaces {
    size: u32,
    faces: Vec<RgbaImage>,
}

impl fmt::Debug for CubeFaces {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CubeFaces")
            .field("size", &self.size)
            .field("faces", &self.faces.len())
            .finish()
    }
}

impl CubeFaces {
    fn from_faces(faces: Vec<(FaceRef, RgbaImage)>) -> Result<Self, EnvironmentError> {
        let expected = faces
            .first()
            .map(|(_, image)| image.width())
            .unwrap_or_default();
        for (reference, image) in &faces {
            if image.width() != expected || image.height() != expected || expected == 0 {
                return Err(EnvironmentError::FaceSize {
                    reference: reference.to_string(),
                    width: image.width(),
                    height: image.height(),
                    expected,
                });
            }
        }
        Ok(Self {
            size: expected,
            faces: faces.into_iter().map(|(_, image)| image).collect(),
        })
    }

    /// Six identical faces filled with one color.
    pub fn solid(size: u32, rgba: [u8; 4]) -> Self {
        let face = RgbaImage::from_pixel(size.max(1), size.max(1), image::Rgba(rgba));
        Self {
            size: size.max(1),
            faces: vec![face; FACE_COUNT],
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Raw RGBA bytes of face `index` (+X, -X, +Y, -Y, +Z, -Z).
    pub fn face(&self, index: usize) -> &[u8] {
        self.faces[index].as_raw()
    }
}

/// Load state of the scene's single environment map.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvironmentState {
    /// No faces configured.
    Absent,
    Pending,
    Loaded(Arc<CubeFaces>),
    Failed(String),
}

impl EnvironmentState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Pending => "pending",
            Self::Loaded(_) => "loaded",
            Self::Failed(_) => "failed",
        }
    }
}

/// What the renderer clears the frame to.
#[derive(Debug, Clone, PartialEq)]
pub enum Backdrop {
    Color(Vec3),
    Environment(Arc<CubeFaces>),
}

/// The scene's environment map together with its backdrop colors.
#[derive(Debug, Clone)]
pub struct EnvironmentMap {
    source: Option<FaceSet>,
    state: EnvironmentState,
    clear_color: Vec3,
    fallback_color: Vec3,
}

impl EnvironmentMap {
    pub fn new(source: Option<FaceSet>, clear_color: Vec3, fallback_color: Vec3) -> Self {
        let state = if source.is_some() {
            EnvironmentState::Pending
        } else {
            EnvironmentState::Absent
        };
        Self {
            source,
            state,
            clear_color,
            fallback_color,
        }
    }

    pub fn source(&self) -> Option<&FaceSet> {
        self.source.as_ref()
    }

    pub fn state(&self) -> &EnvironmentState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, EnvironmentState::Pending)
    }

    /// Applies the result of the one load attempt.
    ///
    /// Returns `false` and leaves the state untouched unless the map is still
    /// pending.
    pub fn resolve(&mut self, result: Result<CubeFaces, EnvironmentError>) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.state = match result {
            Ok(faces) => {
                info!(
                    "Environment map loaded successfully ({}x{} per face)",
                    faces.size(),
                    faces.size()
                );
                EnvironmentState::Loaded(Arc::new(faces))
            }
            Err(err) => {
                error!("Failed to load environment map textures. Check the 6 files: {err}");
                EnvironmentState::Failed(err.to_string())
            }
        };
        true
    }

    pub fn backdrop(&self) -> Backdrop {
        match &self.state {
            EnvironmentState::Loaded(faces) => Backdrop::Environment(Arc::clone(faces)),
            EnvironmentState::Failed(_) => Backdrop::Color(self.fallback_color),
            EnvironmentState::Absent | EnvironmentState::Pending => {
                Backdrop::Color(self.clear_color)
            }
        }
    }

    pub fn faces(&self) -> Option<&Arc<CubeFaces>> {
        match &self.state {
            EnvironmentState::Loaded(faces) => Some(faces),
            _ => None,
        }
    }
}

/// One-shot hand-off between a background load and the render loop.
#[derive(Clone, Default)]
pub struct EnvironmentSlot {
    inner: Arc<Mutex<Option<Result<CubeFaces, EnvironmentError>>>>,
}

impl EnvironmentSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill(&self, result: Result<CubeFaces, EnvironmentError>) {
        let mut guard = self.inner.lock();
        if guard.is_none() {
            *guard = Some(result);
        }
    }

    pub fn take(&self) -> Option<Result<CubeFaces, EnvironmentError>> {
        self.inner.lock().take()
    }
}

/// Starts loading `faces` on a background thread.
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_load<F>(faces: FaceSet, fetcher: F) -> EnvironmentSlot
where
    F: FaceFetcher + Send + 'static,
{
    let slot = EnvironmentSlot::new();
    let handoff = slot.clone();
    std::thread::Builder::new()
        .name("environment-loader".into())
        .spawn(move || handoff.fill(pollster::block_on(faces.load(&fetcher))))
        .map(|_| ())
        .unwrap_or_else(|err| {
            slot.fill(Err(EnvironmentError::Unresolvable {
                reference: "environment-loader".to_string(),
                reason: err.to_string(),
            }))
        });
    slot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::hex_color;

    fn write_faces(dir: &std::path::Path, extension: &str, size: u32) {
        for name in DEFAULT_FACE_NAMES {
            let image = RgbaImage::from_pixel(size, size, image::Rgba([40, 80, 120, 255]));
            image
                .save(dir.join(format!("{name}.{extension}")))
                .expect("write face");
        }
    }

    fn map(source: Option<FaceSet>) -> EnvironmentMap {
        EnvironmentMap::new(source, hex_color(0x333333), hex_color(0x666666))
    }

    #[test]
    fn references_follow_cube_face_order() {
        let faces = FaceSet::directory("./textures/", "jpeg");
        let refs: Vec<String> = faces.references().iter().map(|r| r.to_string()).collect();
        assert_eq!(refs[0], "./textures/posx.jpeg");
        assert_eq!(refs[5], "./textures/negz.jpeg");

        let remote = FaceSet::url("https://example.com/cube", ".jpg");
        assert_eq!(
            remote.references()[2],
            FaceRef::Url("https://example.com/cube/posy.jpg".to_string())
        );
    }

    #[test]
    fn loads_six_matching_faces() {
        let dir = tempfile::tempdir().unwrap();
        write_faces(dir.path(), "png", 4);
        let faces = pollster::block_on(FaceSet::directory(dir.path(), "png").load(&NativeFetcher))
            .expect("faces load");
        assert_eq!(faces.size(), 4);
        assert_eq!(&faces.face(3)[..4], &[40, 80, 120, 255]);
    }

    #[test]
    fn one_unresolvable_face_fails_the_whole_load() {
        let dir = tempfile::tempdir().unwrap();
        write_faces(dir.path(), "png", 2);
        let mut names = default_names("png");
        names[4] = "posz.jpeg".to_string();
        let set = FaceSet::with_names(FaceBase::Directory(dir.path().to_path_buf()), names);
        let err = pollster::block_on(set.load(&NativeFetcher)).unwrap_err();
        assert!(matches!(err, EnvironmentError::Unresolvable { ref reference, .. } if reference.ends_with("posz.jpeg")));
    }

    #[test]
    fn mismatched_face_sizes_fail() {
        let dir = tempfile::tempdir().unwrap();
        write_faces(dir.path(), "png", 4);
        RgbaImage::new(8, 8).save(dir.path().join("negy.png")).unwrap();
        let err = pollster::block_on(FaceSet::directory(dir.path(), "png").load(&NativeFetcher))
            .unwrap_err();
        assert!(matches!(err, EnvironmentError::FaceSize { width: 8, expected: 4, .. }));
    }

    /// Serves `face` for every `.png` path and 404 for anything else, one
    /// request per connection.
    fn serve_faces(face: Vec<u8>, requests: usize) -> String {
        use std::io::{BufRead, BufReader, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}/cube/", listener.local_addr().unwrap());
        std::thread::spawn(move || {
            for stream in listener.incoming().take(requests) {
                let mut stream = stream.unwrap();
                let mut request_line = String::new();
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                reader.read_line(&mut request_line).unwrap();
                let mut header = String::new();
                while reader.read_line(&mut header).unwrap() > 2 {
                    header.clear();
                }
                let (status, body): (&str, &[u8]) = if request_line.contains(".png ") {
                    ("200 OK", face.as_slice())
                } else {
                    ("404 Not Found", &b""[..])
                };
                write!(
                    stream,
                    "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                )
                .unwrap();
                stream.write_all(body).unwrap();
            }
        });
        base
    }

    fn png_bytes(size: u32) -> Vec<u8> {
        let mut bytes = std::io::Cursor::new(Vec::new());
        RgbaImage::from_pixel(size, size, image::Rgba([200, 10, 10, 255]))
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    #[test]
    fn remote_faces_load_over_http() {
        let base = serve_faces(png_bytes(2), FACE_COUNT);
        let faces = pollster::block_on(FaceSet::url(base, "png").load(&NativeFetcher))
            .expect("remote faces load");
        assert_eq!(faces.size(), 2);
        assert_eq!(&faces.face(5)[..4], &[200, 10, 10, 255]);
    }

    #[test]
    fn missing_remote_face_is_unresolvable() {
        let base = serve_faces(png_bytes(2), 1);
        let err = pollster::block_on(FaceSet::url(base, "jpg").load(&NativeFetcher)).unwrap_err();
        assert!(
            matches!(err, EnvironmentError::Unresolvable { ref reference, ref reason }
                if reference.ends_with("/cube/posx.jpg") && reason.contains("404"))
        );
    }

    #[test]
    fn unreachable_host_is_unresolvable() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let set = FaceSet::url(format!("http://127.0.0.1:{port}/cube"), "png");
        let err = pollster::block_on(set.load(&NativeFetcher)).unwrap_err();
        assert!(
            matches!(err, EnvironmentError::Unresolvable { ref reference, .. }
                if reference.ends_with("/cube/posx.png"))
        );
    }

    #[test]
    fn resolve_happens_once() {
        let mut env = map(Some(FaceSet::directory("faces", "png")));
        assert_eq!(env.backdrop(), Backdrop::Color(hex_color(0x333333)));
        assert!(env.resolve(Err(EnvironmentError::Unresolvable {
            reference: "faces/posx.png".into(),
            reason: "missing".into(),
        })));
        assert_eq!(env.backdrop(), Backdrop::Color(hex_color(0x666666)));
        assert!(!env.resolve(Ok(CubeFaces::solid(1, [255; 4]))));
        assert_eq!(env.state().label(), "failed");
        assert_eq!(env.backdrop(), Backdrop::Color(hex_color(0x666666)));
    }

    #[test]
    fn loaded_map_becomes_backdrop() {
        let mut env = map(Some(FaceSet::directory("faces", "png")));
        assert!(env.resolve(Ok(CubeFaces::solid(2, [1, 2, 3, 255]))));
        assert!(matches!(env.backdrop(), Backdrop::Environment(ref faces) if faces.size() == 2));
        assert!(!env.resolve(Err(EnvironmentError::Decode {
            reference: "late".into(),
            reason: "ignored".into(),
        })));
        assert!(env.faces().is_some());
    }

    #[test]
    fn absent_source_never_resolves() {
        let mut env = map(None);
        assert_eq!(env.state(), &EnvironmentState::Absent);
        assert!(!env.resolve(Ok(CubeFaces::solid(1, [0; 4]))));
    }

    #[test]
    fn slot_keeps_first_result() {
        let slot = EnvironmentSlot::new();
        slot.fill(Ok(CubeFaces::solid(1, [0; 4])));
        slot.fill(Err(EnvironmentError::Decode {
            reference: "x".into(),
            reason: "y".into(),
        }));
        assert!(matches!(slot.take(), Some(Ok(_))));
        assert!(slot.take().is_none());
    }

    #[test]
    fn background_load_fills_slot() {
        let dir = tempfile::tempdir().unwrap();
        write_faces(dir.path(), "png", 2);
        let slot = spawn_load(FaceSet::directory(dir.path(), "png"), NativeFetcher);
        let mut result = None;
        for _ in 0..500 {
            if let Some(value) = slot.take() {
                result = Some(value);
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert!(matches!(result, Some(Ok(ref faces)) if faces.size() == 2));
    }
}
