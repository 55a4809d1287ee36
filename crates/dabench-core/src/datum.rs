//! Labeled sample records and image-list manifest parsing.
//!
//! A manifest is plain text with one `<path> <integer label>` pair per line,
//! whitespace-separated. Paths may be relative to the dataset directory or
//! absolute; relative paths are resolved at load time so every stored record
//! carries an absolute image path.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// One labeled image sample.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Datum {
    /// Absolute path to the image file.
    pub impath: PathBuf,
    /// Integer class label from the manifest.
    pub label: u32,
    /// Index of the domain this sample belongs to, relative to the domain
    /// list the caller passed in.
    pub domain: usize,
    /// Human-readable class name, taken from the image path's parent
    /// directory component.
    pub classname: String,
}

/// Reads one manifest file into sample records.
///
/// Blank lines are skipped. Any line that does not split into exactly a path
/// and an integer label is a fatal configuration error. `lowercase` controls
/// whether the derived class name is folded to lower case (Office-Home does
/// this, VisDA keeps the raw directory name).
pub fn read_image_list(
    list_path: &Path,
    dataset_dir: &Path,
    domain: usize,
    lowercase: bool,
) -> Result<Vec<Datum>> {
    let content = fs::read_to_string(list_path)
        .with_context(|| format!("failed to read image list {}", list_path.display()))?;

    let mut items = Vec::new();
    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let mut fields = line.split_whitespace();
        let (Some(path), Some(label), None) = (fields.next(), fields.next(), fields.next()) else {
            bail!(
                "malformed manifest line {} in {}: '{}'",
                idx + 1,
                list_path.display(),
                raw
            );
        };
        let label: u32 = label.parse().with_context(|| {
            format!("invalid label at line {} in {}", idx + 1, list_path.display())
        })?;

        let mut classname = classname_of(path).with_context(|| {
            format!("no class directory in path at line {} in {}", idx + 1, list_path.display())
        })?;
        if lowercase {
            classname = classname.to_lowercase();
        }

        let impath = if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            dataset_dir.join(path)
        };

        items.push(Datum {
            impath,
            label,
            domain,
            classname,
        });
    }

    Ok(items)
}

/// Second-to-last path component, e.g. `art/Alarm_Clock/0001.jpg` ->
/// `Alarm_Clock`.
fn classname_of(path: &str) -> Option<String> {
    Path::new(path)
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_list(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn reads_records_and_resolves_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let list = write_list(
            tmp.path(),
            "art.txt",
            "art/Alarm_Clock/0001.jpg 0\nart/Backpack/0002.jpg 1\n\nart/Bed/0003.jpg 2\n",
        );

        let items = read_image_list(&list, tmp.path(), 0, true).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].classname, "alarm_clock");
        assert_eq!(items[2].label, 2);
        for item in &items {
            assert!(item.impath.starts_with(tmp.path()));
        }
    }

    #[test]
    fn keeps_raw_classname_without_lowercase() {
        let tmp = tempfile::tempdir().unwrap();
        let list = write_list(tmp.path(), "train.txt", "train/aeroplane/img.jpg 0\n");

        let items = read_image_list(&list, tmp.path(), 0, false).unwrap();
        assert_eq!(items[0].classname, "aeroplane");
    }

    #[test]
    fn absolute_paths_are_kept() {
        let tmp = tempfile::tempdir().unwrap();
        let list = write_list(tmp.path(), "a.txt", "/data/art/Bed/1.jpg 4\n");

        let items = read_image_list(&list, tmp.path(), 1, true).unwrap();
        assert_eq!(items[0].impath, PathBuf::from("/data/art/Bed/1.jpg"));
        assert_eq!(items[0].domain, 1);
    }

    #[test]
    fn malformed_line_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let missing_label = write_list(tmp.path(), "bad1.txt", "art/Bed/1.jpg\n");
        assert!(read_image_list(&missing_label, tmp.path(), 0, true).is_err());

        let extra_field = write_list(tmp.path(), "bad2.txt", "art/Bed/1.jpg 0 extra\n");
        assert!(read_image_list(&extra_field, tmp.path(), 0, true).is_err());

        let bad_label = write_list(tmp.path(), "bad3.txt", "art/Bed/1.jpg four\n");
        assert!(read_image_list(&bad_label, tmp.path(), 0, true).is_err());
    }

    #[test]
    fn missing_file_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(read_image_list(&tmp.path().join("nope.txt"), tmp.path(), 0, true).is_err());
    }
}
