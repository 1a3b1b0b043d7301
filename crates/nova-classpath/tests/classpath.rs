use std::io::Write;

use nova_classpath::{ClassProvider, Classpath, ClasspathEntry};
use pretty_assertions::assert_eq;

fn write_jar(path: &std::path::Path, entries: &[(&str, &[u8])]) {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default();
    for (name, bytes) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap();
}

#[test]
fn first_entry_wins() {
    let temp = tempfile::tempdir().unwrap();
    let dir = temp.path().join("classes");
    std::fs::create_dir_all(dir.join("com/example")).unwrap();
    std::fs::write(dir.join("com/example/A.class"), b"from-dir").unwrap();

    let jar = temp.path().join("lib.jar");
    write_jar(
        &jar,
        &[
            ("com/example/A.class", b"from-jar"),
            ("com/example/B.class", b"only-in-jar"),
        ],
    );

    let cp = Classpath::open(&[
        ClasspathEntry::ClassDir(dir.clone()),
        ClasspathEntry::Jar(jar.clone()),
    ]);
    assert_eq!(cp.len(), 2);
    assert_eq!(cp.bytes_for_class("com.example.A"), Some(b"from-dir".to_vec()));
    assert_eq!(cp.bytes_for_class("com.example.B"), Some(b"only-in-jar".to_vec()));
    assert!(cp.has_resource("com/example/B.class"));
    assert_eq!(cp.bytes_for_class("com.example.C"), None);
}

#[test]
fn multi_release_entries_only_fill_gaps() {
    let temp = tempfile::tempdir().unwrap();
    let jar = temp.path().join("mr.jar");
    write_jar(
        &jar,
        &[
            ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\nMulti-Release: true\n"),
            ("p/Base.class", b"base"),
            ("META-INF/versions/9/p/Base.class", b"nine"),
            ("META-INF/versions/9/p/Versioned.class", b"nine"),
            ("META-INF/versions/11/p/Versioned.class", b"eleven"),
        ],
    );

    let cp = Classpath::open(&[ClasspathEntry::Jar(jar)]);
    assert_eq!(cp.bytes_for_class("p.Base"), Some(b"base".to_vec()));
    assert_eq!(cp.bytes_for_class("p.Versioned"), Some(b"eleven".to_vec()));
}

#[test]
fn unreadable_entries_are_skipped() {
    let temp = tempfile::tempdir().unwrap();
    let bogus = temp.path().join("broken.jar");
    std::fs::write(&bogus, b"not a zip").unwrap();

    let cp = Classpath::open(&[
        ClasspathEntry::Jar(bogus),
        ClasspathEntry::ClassDir(temp.path().join("missing")),
    ]);
    assert!(cp.is_empty());
    assert_eq!(cp.bytes_for_class("java.lang.Object"), None);
}
