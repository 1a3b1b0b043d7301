//! Completion from class files written by a real `javac`.

use nova_classpath::Classpath;
use nova_sema::tree::{ClassDecl, ClassKind, Name};
use nova_sema::{analyze, AnalyzerConfig, Constant, TreeBuilder};
use nova_test_utils::javac::{compile_classes, javac_available, JavacOptions};
use nova_test_utils::minimal_jdk_classes;
use pretty_assertions::assert_eq;

const BOX: &str = r#"
package demo;

public class Box<T extends Comparable<T>> implements java.io.Serializable {
    public static final int LIMIT = 42;
    public T value;

    public T get() {
        return value;
    }
}
"#;

#[test]
#[ignore]
fn generic_class_compiled_by_javac() {
    if !javac_available() {
        eprintln!("javac not found; skipping");
        return;
    }
    let compiled = compile_classes(
        &[("demo/Box.java", BOX)],
        &JavacOptions {
            release: Some(8),
            ..JavacOptions::default()
        },
    )
    .unwrap();
    // The fixture JDK shares the output directory so one entry serves both.
    for class in minimal_jdk_classes() {
        let path = compiled.classes_dir().join(format!("{}.class", class.internal_name()));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, class.build()).unwrap();
    }
    let classpath = Classpath::open(&[compiled.classpath_entry()]);

    let mut b = TreeBuilder::new();
    let class = b.class(ClassDecl::new(ClassKind::Class, "User"));
    let unit = b.unit(Some("p"), vec![], vec![class]);
    let tree = b.finish(unit);

    let mut analysis = analyze(&tree, &classpath, AnalyzerConfig::default()).unwrap();
    let env = analysis.sema().env_of(tree.root());
    let sema = analysis.sema_mut();
    let class = sema.load_class("demo.Box").unwrap();

    let type_variables = sema.type_variables(class);
    assert_eq!(type_variables.len(), 1);
    let t = sema.type_symbol(type_variables[0]);
    let bounds: Vec<String> = sema.bounds(t).into_iter().map(|ty| sema.display(ty)).collect();
    assert_eq!(bounds, vec!["java.lang.Comparable<T>"]);

    let interfaces: Vec<String> = sema.interfaces(class).into_iter().map(|ty| sema.display(ty)).collect();
    assert_eq!(interfaces, vec!["java.io.Serializable"]);

    let site = sema.type_of_symbol(class);
    let value = sema.find_field(env, site, &Name::new("value"), class);
    assert_eq!(sema.display(value.ty), "T");

    let limit = sema.find_field(env, site, &Name::new("LIMIT"), class).symbol().unwrap();
    assert_eq!(sema.constant_value(limit), Some(Constant::Int(42)));
    assert!(sema.is_static(limit));
}
