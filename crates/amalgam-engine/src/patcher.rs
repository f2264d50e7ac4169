//! Conditional-Guard Patcher
//!
//! Hides the feature-detection directives of one header from the
//! preprocessor by turning them into comment lines. The assembler turns them
//! back into directives once the preprocessor has run.

use amalgam_core::config::PatchConfig;
use amalgam_core::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Comment out every directive that follows the first line containing
/// `scope_marker`, except the file's final line.
///
/// Line count and line order are preserved, so the rewrite is undone by
/// stripping `comment_prefix` from lines starting with `comment_prefix#`.
pub fn patch_guards(text: &str, scope_marker: &str, comment_prefix: &str) -> String {
    let mut lines: Vec<&str> = text.split_inclusive('\n').collect();
    let Some(last) = lines.pop() else {
        return String::new();
    };

    let (mut patched, _) = lines.into_iter().fold(
        (String::with_capacity(text.len() + 64), false),
        |(mut out, in_scope), line| {
            let in_scope = in_scope || line.contains(scope_marker);
            if in_scope && line.starts_with('#') {
                out.push_str(comment_prefix);
            }
            out.push_str(line);
            (out, in_scope)
        },
    );

    patched.push_str(last);
    patched
}

/// Scratch copy of the library directory with the designated header patched.
///
/// The copy is removed when this value is dropped.
pub struct PatchedTree {
    _scratch: TempDir,
    library_dir: PathBuf,
}

impl PatchedTree {
    /// Copy `library_dir` into a fresh scratch directory and patch the
    /// designated header in the copy
    pub fn create(library_dir: &Path, patch: &PatchConfig) -> Result<Self> {
        let scratch = TempDir::new()?;
        let name = library_dir
            .file_name()
            .ok_or_else(|| Error::Config(format!("invalid library dir: {}", library_dir.display())))?;
        let copy = scratch.path().join(name);

        copy_tree(library_dir, &copy)?;
        info!("Copied {} to {}", library_dir.display(), copy.display());

        let designated = copy.join(&patch.designated_file);
        if !designated.is_file() {
            return Err(Error::Config(format!(
                "designated file {} not found in {}",
                patch.designated_file.display(),
                library_dir.display()
            )));
        }

        let original = fs::read_to_string(&designated)?;
        let patched = patch_guards(&original, &patch.scope_marker, &patch.comment_prefix);
        fs::write(&designated, patched)?;
        debug!("Patched guard directives in {}", designated.display());

        Ok(Self {
            _scratch: scratch,
            library_dir: copy,
        })
    }

    /// Root of the patched copy
    pub fn library_dir(&self) -> &Path {
        &self.library_dir
    }

    /// Resolve a path relative to the patched copy
    pub fn path(&self, relative: &Path) -> PathBuf {
        self.library_dir.join(relative)
    }
}

fn copy_tree(from: &Path, to: &Path) -> Result<()> {
    for entry in WalkDir::new(from).follow_links(true) {
        let entry = entry.map_err(|e| Error::Walk(e.to_string()))?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| Error::Walk(e.to_string()))?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const STD_HPP: &str = "\
#ifndef LIB_STD_HPP
#define LIB_STD_HPP

#ifdef HAS_FAST_INT
#include <fast_int/fast_int.hpp>
#endif

namespace lib { namespace detail {

inline int parse(const char *s)
{
#ifdef HAS_FAST_INT
  return fast(s);
#else
  return slow(s);
#endif
}

}}

#endif
";

    #[test]
    fn test_directives_after_scope_marker_are_commented() {
        let patched = patch_guards(STD_HPP, "namespace", "//");

        assert_eq!(
            patched,
            "\
#ifndef LIB_STD_HPP
#define LIB_STD_HPP

#ifdef HAS_FAST_INT
#include <fast_int/fast_int.hpp>
#endif

namespace lib { namespace detail {

inline int parse(const char *s)
{
//#ifdef HAS_FAST_INT
  return fast(s);
//#else
  return slow(s);
//#endif
}

}}

#endif
"
        );
    }

    #[test]
    fn test_line_count_is_preserved() {
        let patched = patch_guards(STD_HPP, "namespace", "//");
        assert_eq!(patched.lines().count(), STD_HPP.lines().count());
    }

    #[test]
    fn test_final_line_is_never_patched() {
        let text = "namespace x {\n#ifdef FEATURE\n#endif\n}\n#endif\n";
        let patched = patch_guards(text, "namespace", "//");
        assert_eq!(patched, "namespace x {\n//#ifdef FEATURE\n//#endif\n}\n#endif\n");
    }

    #[test]
    fn test_final_line_without_newline_is_kept() {
        let text = "namespace x {\n#define A\n#endif";
        assert_eq!(patch_guards(text, "namespace", "//"), "namespace x {\n//#define A\n#endif");
    }

    #[test]
    fn test_no_scope_marker_leaves_text_unchanged() {
        let text = "#ifndef A\n#define A\n#endif\n";
        assert_eq!(patch_guards(text, "namespace", "//"), text);
    }

    #[test]
    fn test_empty_file() {
        assert_eq!(patch_guards("", "namespace", "//"), "");
    }

    #[test]
    fn test_patched_tree_only_touches_designated_file() {
        let source = TempDir::new().unwrap();
        let lib = source.path().join("lib");
        fs::create_dir_all(lib.join("lib")).unwrap();
        fs::write(lib.join("lib.hpp"), "#include \"lib/std.hpp\"\nnamespace a {\n#define B\n}\n").unwrap();
        fs::write(lib.join("lib/std.hpp"), STD_HPP).unwrap();

        let patch = PatchConfig {
            designated_file: PathBuf::from("lib/std.hpp"),
            ..PatchConfig::default()
        };
        let tree = PatchedTree::create(&lib, &patch).unwrap();

        assert_eq!(tree.library_dir().file_name().unwrap(), "lib");
        assert_eq!(
            fs::read_to_string(tree.path(Path::new("lib.hpp"))).unwrap(),
            "#include \"lib/std.hpp\"\nnamespace a {\n#define B\n}\n"
        );
        assert!(fs::read_to_string(tree.path(Path::new("lib/std.hpp")))
            .unwrap()
            .contains("//#ifdef HAS_FAST_INT"));

        // The source tree is left alone
        assert_eq!(fs::read_to_string(lib.join("lib/std.hpp")).unwrap(), STD_HPP);
    }

    #[test]
    fn test_scratch_copy_removed_on_drop() {
        let source = TempDir::new().unwrap();
        let lib = source.path().join("lib");
        fs::create_dir_all(&lib).unwrap();
        fs::write(lib.join("std.hpp"), STD_HPP).unwrap();

        let patch = PatchConfig {
            designated_file: PathBuf::from("std.hpp"),
            ..PatchConfig::default()
        };
        let tree = PatchedTree::create(&lib, &patch).unwrap();
        let copy = tree.library_dir().to_path_buf();
        assert!(copy.exists());

        drop(tree);
        assert!(!copy.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_header_is_copied_with_contents() {
        let source = TempDir::new().unwrap();
        let lib = source.path().join("lib");
        fs::create_dir_all(&lib).unwrap();
        fs::write(lib.join("std.hpp"), STD_HPP).unwrap();
        fs::write(source.path().join("shared.hpp"), "int shared();\n").unwrap();
        std::os::unix::fs::symlink(source.path().join("shared.hpp"), lib.join("shared.hpp")).unwrap();

        let patch = PatchConfig {
            designated_file: PathBuf::from("std.hpp"),
            ..PatchConfig::default()
        };
        let tree = PatchedTree::create(&lib, &patch).unwrap();

        assert_eq!(
            fs::read_to_string(tree.path(Path::new("shared.hpp"))).unwrap(),
            "int shared();\n"
        );
    }

    #[test]
    fn test_missing_designated_file() {
        let source = TempDir::new().unwrap();
        let lib = source.path().join("lib");
        fs::create_dir_all(&lib).unwrap();

        let result = PatchedTree::create(&lib, &PatchConfig::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
