//! Labeled image folders: `<label>_<suffix>.<ext>` files in one directory.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::core::{Image, ImageView};

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("dataset directory {0} does not exist")]
    MissingDirectory(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no *.{extension} files in {dir}")]
    NoMatchingFiles { dir: PathBuf, extension: String },

    #[error("cannot derive a label from {path}: {reason}")]
    MalformedFilename { path: PathBuf, reason: &'static str },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: ::image::ImageError,
    },

    #[error(
        "{path} is {got:?} (width, height, channels) but the dataset started with {expected:?}"
    )]
    ShapeMismatch {
        path: PathBuf,
        expected: (usize, usize, usize),
        got: (usize, usize, usize),
    },
}

/// How a label is cut out of a file name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelRule {
    /// Everything before the first occurrence of the delimiter.
    Delimiter(char),
    /// The first `n` characters of the file stem.
    Prefix(usize),
}

impl Default for LabelRule {
    fn default() -> Self {
        Self::Delimiter('_')
    }
}

impl LabelRule {
    pub fn label_for(&self, path: &Path) -> Result<String, LoadError> {
        let malformed = |reason| LoadError::MalformedFilename {
            path: path.to_path_buf(),
            reason,
        };
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| malformed("file name is not valid UTF-8"))?;

        let label = match *self {
            LabelRule::Delimiter(delim) => name
                .split_once(delim)
                .map(|(head, _)| head)
                .ok_or_else(|| malformed("label delimiter not found"))?,
            LabelRule::Prefix(n) => {
                let stem = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or_default();
                match stem.char_indices().nth(n) {
                    Some((end, _)) => &stem[..end],
                    None if stem.chars().count() == n => stem,
                    None => return Err(malformed("file stem shorter than the label prefix")),
                }
            }
        };

        if label.is_empty() {
            return Err(malformed("empty label"));
        }
        Ok(label.to_owned())
    }
}

/// Decoded images with one label and one source path each, in load order.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    pub images: Vec<Image>,
    pub labels: Vec<String>,
    pub paths: Vec<PathBuf>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn views(&self) -> Vec<ImageView<'_>> {
        self.images.iter().map(Image::view).collect()
    }
}

/// Loader configuration. The defaults read `*.bmp` files labeled by the
/// text before the first underscore.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetLoader {
    /// Matched case-insensitively, without the leading dot.
    pub extension: String,
    pub label_rule: LabelRule,
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self {
            extension: "bmp".to_string(),
            label_rule: LabelRule::default(),
        }
    }
}

impl DatasetLoader {
    pub fn with_extension(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            ..Self::default()
        }
    }

    /// Matching files in natural filename order (`img_2` before `img_10`).
    pub fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
        if !dir.is_dir() {
            return Err(LoadError::MissingDirectory(dir.to_path_buf()));
        }
        let io_err = |source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let wanted = self.extension.trim_start_matches('.');
        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            let matches = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(wanted));
            if matches && path.is_file() {
                files.push(path);
            }
        }

        files.sort_by(|a, b| natural_cmp(&file_name_lossy(a), &file_name_lossy(b)));
        Ok(files)
    }

    /// Load every matching image. Fails on the first bad file; nothing is
    /// returned partially.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, dir), fields(dir = %dir.as_ref().display()))
    )]
    pub fn load(&self, dir: impl AsRef<Path>) -> Result<Dataset, LoadError> {
        let dir = dir.as_ref();
        let files = self.list_files(dir)?;
        if files.is_empty() {
            return Err(LoadError::NoMatchingFiles {
                dir: dir.to_path_buf(),
                extension: self.extension.clone(),
            });
        }
        info!("found {} *.{} files in {}", files.len(), self.extension, dir.display());

        let mut dataset = Dataset::default();
        let mut expected = None;
        for path in files {
            let label = self.label_rule.label_for(&path)?;
            let image = load_image(&path)?;
            let shape = image.view().shape();
            match expected {
                None => expected = Some(shape),
                Some(expected) if expected != shape => {
                    return Err(LoadError::ShapeMismatch {
                        path,
                        expected,
                        got: shape,
                    });
                }
                Some(_) => {}
            }
            debug!("{} -> {label:?} {shape:?}", path.display());
            dataset.images.push(image);
            dataset.labels.push(label);
            dataset.paths.push(path);
        }
        Ok(dataset)
    }
}

/// Decode one file: grayscale sources stay single-channel, everything else
/// becomes RGB with alpha dropped.
pub fn load_image(path: impl AsRef<Path>) -> Result<Image, LoadError> {
    let path = path.as_ref();
    let decoded = ::image::open(path).map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let (width, height) = (decoded.width() as usize, decoded.height() as usize);
    let (channels, data) = if decoded.color().has_color() {
        (3, decoded.to_rgb8().into_raw())
    } else {
        (1, decoded.to_luma8().into_raw())
    };
    Ok(Image {
        width,
        height,
        channels,
        data,
    })
}

fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Split into alternating digit and non-digit runs.
fn chunks(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut prev_digit = None;
    for (i, ch) in s.char_indices() {
        let digit = ch.is_ascii_digit();
        if prev_digit.is_some_and(|p| p != digit) {
            out.push(&s[start..i]);
            start = i;
        }
        prev_digit = Some(digit);
    }
    if start < s.len() {
        out.push(&s[start..]);
    }
    out
}

/// Order strings with embedded numbers by value: `a2 < a10`.
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (ca, cb) = (chunks(a), chunks(b));
    for (x, y) in ca.iter().zip(&cb) {
        let both_digits = x.as_bytes()[0].is_ascii_digit() && y.as_bytes()[0].is_ascii_digit();
        let ord = if both_digits {
            let (tx, ty) = (x.trim_start_matches('0'), y.trim_start_matches('0'));
            tx.len()
                .cmp(&ty.len())
                .then_with(|| tx.cmp(ty))
                .then_with(|| x.len().cmp(&y.len()))
        } else {
            x.cmp(y)
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    ca.len().cmp(&cb.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::{GrayImage, Luma, Rgb, RgbImage, RgbaImage};

    fn write_gray(dir: &Path, name: &str, w: u32, h: u32) {
        GrayImage::from_fn(w, h, |x, y| Luma([(x * 7 + y * 3) as u8]))
            .save(dir.join(name))
            .unwrap();
    }

    #[test]
    fn natural_order_compares_numbers_by_value() {
        let mut names = vec!["img_10.bmp", "img_2.bmp", "img_1.bmp", "drone_3.bmp"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, ["drone_3.bmp", "img_1.bmp", "img_2.bmp", "img_10.bmp"]);
        assert_eq!(natural_cmp("a01", "a1"), Ordering::Greater);
        assert_eq!(natural_cmp("a", "a1"), Ordering::Less);
    }

    #[test]
    fn label_rules() {
        let rule = LabelRule::default();
        assert_eq!(rule.label_for(Path::new("/x/order_12.bmp")).unwrap(), "order");
        assert_eq!(
            rule.label_for(Path::new("inspection_a_b.bmp")).unwrap(),
            "inspection"
        );
        assert!(matches!(
            rule.label_for(Path::new("nodelim.bmp")),
            Err(LoadError::MalformedFilename { .. })
        ));
        assert!(matches!(
            rule.label_for(Path::new("_leading.bmp")),
            Err(LoadError::MalformedFilename { .. })
        ));

        let prefix = LabelRule::Prefix(3);
        assert_eq!(prefix.label_for(Path::new("abc123.png")).unwrap(), "abc");
        assert_eq!(prefix.label_for(Path::new("abc.png")).unwrap(), "abc");
        assert!(prefix.label_for(Path::new("ab.png")).is_err());
    }

    #[test]
    fn loads_labels_paired_with_paths() {
        let dir = tempfile::tempdir().unwrap();
        write_gray(dir.path(), "order_1.bmp", 32, 24);
        write_gray(dir.path(), "order_2.bmp", 32, 24);
        write_gray(dir.path(), "drone_1.BMP", 32, 24);
        write_gray(dir.path(), "ignored_1.png", 32, 24);

        let ds = DatasetLoader::default().load(dir.path()).unwrap();
        assert_eq!(ds.len(), 3);
        let mut counts = std::collections::BTreeMap::new();
        for (label, path) in ds.labels.iter().zip(&ds.paths) {
            let name = path.file_name().unwrap().to_str().unwrap();
            assert!(name.starts_with(&format!("{label}_")), "{name} vs {label}");
            *counts.entry(label.as_str()).or_insert(0) += 1;
        }
        assert_eq!(counts["order"], 2);
        assert_eq!(counts["drone"], 1);
        assert_eq!(ds.labels, ["drone", "order", "order"]);
        let names: Vec<_> = ds
            .paths
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, ["drone_1.BMP", "order_1.bmp", "order_2.bmp"]);
        assert!(ds.images.iter().all(|img| img.channels == ds.images[0].channels));
        assert_eq!(ds.images[0].width, 32);
        assert_eq!(ds.images[0].height, 24);
    }

    #[test]
    fn channel_count_follows_the_decoded_color_type() {
        let gray_dir = tempfile::tempdir().unwrap();
        write_gray(gray_dir.path(), "gray.png", 8, 8);
        let gray = load_image(gray_dir.path().join("gray.png")).unwrap();
        assert_eq!(gray.channels, 1);

        let dir = tempfile::tempdir().unwrap();

        RgbImage::from_pixel(8, 8, Rgb([10, 20, 30]))
            .save(dir.path().join("a_1.png"))
            .unwrap();
        RgbaImage::from_pixel(8, 8, ::image::Rgba([1, 2, 3, 255]))
            .save(dir.path().join("b_1.png"))
            .unwrap();
        let ds = DatasetLoader::with_extension("png")
            .load(dir.path())
            .unwrap();
        assert_eq!(ds.len(), 2);
        assert!(ds.images.iter().all(|img| img.channels == 3));
        assert_eq!(&ds.images[0].data[..3], &[10, 20, 30]);
        assert_eq!(&ds.images[1].data[..3], &[1, 2, 3]);
    }

    #[test]
    fn load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let loader = DatasetLoader::default();

        assert!(matches!(
            loader.load(dir.path().join("absent")),
            Err(LoadError::MissingDirectory(_))
        ));
        assert!(matches!(
            loader.load(dir.path()),
            Err(LoadError::NoMatchingFiles { .. })
        ));

        write_gray(dir.path(), "a_1.bmp", 16, 16);
        write_gray(dir.path(), "b_1.bmp", 16, 8);
        assert!(matches!(
            loader.load(dir.path()),
            Err(LoadError::ShapeMismatch { .. })
        ));

        fs::write(dir.path().join("c_1.bmp"), b"not an image").unwrap();
        fs::remove_file(dir.path().join("b_1.bmp")).unwrap();
        assert!(matches!(
            loader.load(dir.path()),
            Err(LoadError::Decode { .. })
        ));
    }
}
