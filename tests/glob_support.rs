//! Integration tests for recursive corpus enumeration.

use anyhow::Result;
use corpus_unify::testing::*;
use corpus_unify::*;
use std::fs;

#[test]
fn nested_files_at_any_depth_are_found() -> Result<()> {
    let fx = CorpusFixture::new()?;
    fx.add_report("top.txt", "a")?;
    fx.add_report("p10/one.txt", "b")?;
    fx.add_report("p10/p10000032/two.txt", "c")?;
    fx.add_report("p10/p10000032/deeper/three.txt", "d")?;

    let files = enumerate_files(fx.corpus_root(), "txt")?;
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(files.len(), 4);
    assert!(names.contains(&"two.txt".to_string()));
    assert!(names.contains(&"three.txt".to_string()));
    Ok(())
}

#[test]
fn extension_filter_excludes_other_files() -> Result<()> {
    let fx = CorpusFixture::new()?;
    fx.add_report("a.txt", "a")?;
    fx.add_report("b.csv", "b")?;
    fx.add_report("c.txt.bak", "c")?;
    fx.add_report("sub/d.TXT", "d")?;

    let files = enumerate_files(fx.corpus_root(), ".txt")?;
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("a.txt"));
    Ok(())
}

#[test]
fn directories_named_like_files_are_skipped() -> Result<()> {
    let fx = CorpusFixture::new()?;
    fs::create_dir_all(fx.corpus_root().join("looks_like.txt"))?;
    fx.add_report("looks_like.txt/inner.txt", "x")?;

    let files = enumerate_files(fx.corpus_root(), "txt")?;
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("inner.txt"));
    Ok(())
}

#[test]
fn empty_root_is_not_an_error() -> Result<()> {
    let fx = CorpusFixture::new()?;
    assert!(enumerate_files(fx.corpus_root(), "txt")?.is_empty());
    Ok(())
}

#[test]
fn results_are_sorted() -> Result<()> {
    let fx = CorpusFixture::new()?;
    for name in ["c.txt", "a.txt", "b/z.txt", "b/a.txt"] {
        fx.add_report(name, name)?;
    }
    let files = enumerate_files(fx.corpus_root(), "txt")?;
    let mut sorted = files.clone();
    sorted.sort();
    assert_eq!(files, sorted);
    Ok(())
}

#[test]
fn root_with_glob_metacharacters_is_literal() -> Result<()> {
    let fx = CorpusFixture::new()?;
    let root = fx.path().join("run[1]");
    fs::create_dir_all(root.join("x"))?;
    fs::write(root.join("x/r.txt"), "hello")?;

    let files = enumerate_files(&root, "txt")?;
    assert_eq!(files.len(), 1);
    Ok(())
}

#[test]
fn hidden_files_and_directories_are_skipped() -> Result<()> {
    let fx = CorpusFixture::new()?;
    fx.add_report("visible.txt", "a")?;
    fx.add_report(".draft.txt", "b")?;
    fx.add_report(".cache/p10/s1.txt", "c")?;
    fx.add_report("p11/.old/s2.txt", "d")?;

    let files = enumerate_files(fx.corpus_root(), "txt")?;
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("visible.txt"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn unreadable_subdirectory_is_skipped() -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let fx = CorpusFixture::new()?;
    fx.add_report("p10/a.txt", "a")?;
    fx.add_report("p11/b.txt", "b")?;
    fx.add_report("locked/c.txt", "c")?;
    let locked = fx.corpus_root().join("locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))?;

    // Privileged users ignore permission bits; nothing to check then.
    let still_readable = fs::read_dir(&locked).is_ok();
    let files = if still_readable {
        None
    } else {
        Some(enumerate_files(fx.corpus_root(), "txt"))
    };
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))?;

    if let Some(files) = files {
        let files = files?;
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| !p.starts_with(&locked)));
    }
    Ok(())
}
