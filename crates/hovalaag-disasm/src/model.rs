use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;

use hovalaag_asm::{assemble, Program};

/// A loaded image plus whatever names are known for its addresses.
#[derive(Debug, Clone)]
pub struct Image {
    pub program: Program,
    pub labels: BTreeMap<u8, String>,
}

pub fn load_image(path: &Path) -> Result<Image> {
    let bytes = std::fs::read(path).with_context(|| format!("couldn't open '{}'", path.display()))?;
    let program = Program::from_bytes(&bytes).with_context(|| format!("invalid program '{}'", path.display()))?;
    Ok(Image { program, labels: BTreeMap::new() })
}

/// Takes label names from the source the image was assembled from.
///
/// Returns `false` when the source no longer assembles to the same words, in
/// which case the names are still applied but may be stale.
pub fn import_source_labels(img: &mut Image, source: &Path) -> Result<bool> {
    let text = std::fs::read_to_string(source)
        .with_context(|| format!("couldn't open '{}'", source.display()))?;
    let asm = assemble(&text)?;
    for (name, pc) in asm.labels.iter() {
        img.labels.entry(pc).or_insert_with(|| name.to_string());
    }
    Ok(asm.program == img.program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_decodes_words() {
        let cwd = std::env::current_dir().unwrap();
        let path = cwd.join("_test_image.bin");
        let asm = assemble("  A=D\n  B=A\n").unwrap();
        std::fs::write(&path, asm.program.to_bytes()).unwrap();
        let img = load_image(&path).unwrap();
        assert_eq!(img.program, asm.program);
        assert!(img.labels.is_empty());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn loader_rejects_partial_words() {
        let cwd = std::env::current_dir().unwrap();
        let path = cwd.join("_test_image_bad.bin");
        std::fs::write(&path, [0u8, 1, 2]).unwrap();
        assert!(load_image(&path).is_err());
        let _ = std::fs::remove_file(&path);
    }
}
