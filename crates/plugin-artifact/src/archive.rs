use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use zip::ZipArchive;

/// Lists archive entries whose names end with `extension`, in archive order.
///
/// The extension match ignores ASCII case. Directory entries never match.
pub fn list_entries_with_extension(path: &Path, extension: &str) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("{} is not a valid zip archive", path.display()))?;

    let suffix = extension.to_ascii_lowercase();
    let mut entries = Vec::new();
    for index in 0..archive.len() {
        let entry = archive
            .by_index(index)
            .with_context(|| format!("failed to read entry {index} of {}", path.display()))?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name();
        if name.to_ascii_lowercase().ends_with(&suffix) {
            entries.push(name.to_string());
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, names: &[&str]) {
        let file = File::create(path).expect("create zip");
        let mut writer = ZipWriter::new(file);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for name in names {
            writer.start_file(*name, options).expect("start entry");
            writer.write_all(b"payload").expect("write entry");
        }
        writer.finish().expect("finish zip");
    }

    #[test]
    fn keeps_only_matching_entries_in_order() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("plugin.zip");
        write_zip(
            &path,
            &["Plugin.dll", "meta.json", "lib/Helper.DLL", "readme.dll.txt"],
        );

        let entries = list_entries_with_extension(&path, ".dll").expect("list");
        assert_eq!(entries, vec!["Plugin.dll", "lib/Helper.DLL"]);
    }

    #[test]
    fn rejects_non_zip_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("broken.zip");
        fs::write(&path, b"definitely not a zip").expect("write");

        let err = list_entries_with_extension(&path, ".dll").expect_err("not a zip");
        assert!(err.to_string().contains("not a valid zip archive"));
    }
}
