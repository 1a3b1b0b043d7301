use nova_classpath::{Classpath, ClasspathEntry};
use nova_sema::tree::{ClassDecl, ClassKind, MethodDecl, Name, VariableDecl};
use nova_sema::types::Primitive;
use nova_sema::{analyze, AnnotationValue, AnalyzerConfig, Completion, Flags, SymbolKind, TreeBuilder};
use nova_test_utils::{
    access, capture_logs, minimal_jdk, minimal_jdk_classes, minimal_jdk_with, AnnotationSpec, ClassFileBuilder,
    ElementSpec, MemberSpec,
};
use pretty_assertions::assert_eq;

#[test]
fn new_instance_of_a_binary_class_exposes_its_hierarchy() {
    let mut b = TreeBuilder::new();
    let array_list = b.qualified("java.util.ArrayList");
    let creation = b.new_class(array_list, vec![]);
    let object = b.ident("Object");
    let list = b.local(object, "list", Some(creation));
    let body = b.block(vec![list]);
    let void = b.void();
    let run = b.method(MethodDecl::new("run", Some(void)).body(body));
    let main = b.class(ClassDecl::new(ClassKind::Class, "Main").members(vec![run]));
    let unit = b.unit(Some("p"), vec![], vec![main]);
    let tree = b.finish(unit);
    let classpath = minimal_jdk();

    let mut analysis = analyze(&tree, &classpath, AnalyzerConfig::default()).unwrap();
    assert!(analysis.classes_not_found().is_empty());

    let constructor = analysis.symbol_of(creation).unwrap();
    assert_eq!(analysis.sema().kind(constructor), SymbolKind::Method);
    assert_eq!(analysis.references(constructor), &[creation]);

    let ty = analysis.type_of(creation).unwrap();
    let sema = analysis.sema_mut();
    let class = sema.type_symbol(ty);
    assert_eq!(sema.full_name(class), "java.util.ArrayList");

    let superclass = sema.superclass(class).unwrap();
    let superclass = sema.type_symbol(superclass);
    assert_eq!(sema.name(superclass).as_str(), "AbstractList");

    let interfaces: Vec<String> = sema
        .interfaces(class)
        .into_iter()
        .map(|ty| {
            let symbol = sema.type_symbol(ty);
            sema.full_name(symbol)
        })
        .collect();
    assert_eq!(
        interfaces,
        vec![
            "java.util.List",
            "java.util.RandomAccess",
            "java.lang.Cloneable",
            "java.io.Serializable",
        ]
    );
}

#[test]
fn exact_primitive_overload_is_preferred() {
    let mut b = TreeBuilder::new();
    let int = b.primitive(Primitive::Int);
    let x = b.local(int, "x", None);
    let void = b.void();
    let empty = b.block(vec![]);
    let by_int = b.method(MethodDecl::new("foo", Some(void)).params(vec![x]).body(empty));

    let object = b.ident("Object");
    let o = b.local(object, "o", None);
    let void = b.void();
    let empty = b.block(vec![]);
    let by_object = b.method(MethodDecl::new("foo", Some(void)).params(vec![o]).body(empty));

    let callee = b.ident("foo");
    let one = b.int(1);
    let call = b.call(callee, vec![one]);
    let stmt = b.expr_stmt(call);
    let body = b.block(vec![stmt]);
    let void = b.void();
    let run = b.method(MethodDecl::new("run", Some(void)).body(body));

    let class = b.class(ClassDecl::new(ClassKind::Class, "A").members(vec![by_int, by_object, run]));
    let unit = b.unit(Some("p"), vec![], vec![class]);
    let tree = b.finish(unit);
    let classpath = minimal_jdk();

    let analysis = analyze(&tree, &classpath, AnalyzerConfig::default()).unwrap();
    let foo_int = analysis.symbol_of(by_int).unwrap();
    let foo_object = analysis.symbol_of(by_object).unwrap();
    assert_ne!(foo_int, foo_object);
    assert_eq!(analysis.symbol_of(callee), Some(foo_int));
    assert_eq!(analysis.declaration_of(foo_int), Some(by_int));
    assert_eq!(analysis.type_name_of(call).as_deref(), Some("void"));
}

#[test]
fn missing_qualified_class_is_reported_once() {
    let mut b = TreeBuilder::new();
    let missing = b.qualified("com.acme.Missing");
    let field = b.variable(VariableDecl::new(missing, "m"));
    let class = b.class(ClassDecl::new(ClassKind::Class, "A").members(vec![field]));
    let unit = b.unit(Some("p"), vec![], vec![class]);
    let tree = b.finish(unit);
    let classpath = minimal_jdk();

    let (analysis, logs) = capture_logs(tracing::Level::WARN, || {
        analyze(&tree, &classpath, AnalyzerConfig::default()).unwrap()
    });

    assert_eq!(
        analysis.classes_not_found().iter().cloned().collect::<Vec<_>>(),
        vec!["com.acme.Missing".to_string()]
    );
    assert_eq!(analysis.type_name_of(missing).as_deref(), Some("!unknown!"));
    assert_eq!(logs.matches("class not found on classpath").count(), 1, "{logs}");
    assert!(logs.contains("com.acme.Missing"), "{logs}");
}

#[test]
fn missing_classes_can_be_recorded_silently() {
    let mut b = TreeBuilder::new();
    let import = b.import("com.acme.Gone", false);
    let class = b.class(ClassDecl::new(ClassKind::Class, "A"));
    let unit = b.unit(Some("p"), vec![import], vec![class]);
    let tree = b.finish(unit);
    let classpath = minimal_jdk();
    let config = AnalyzerConfig {
        report_missing_classes: false,
        ..AnalyzerConfig::default()
    };

    let (analysis, logs) = capture_logs(tracing::Level::WARN, || analyze(&tree, &classpath, config).unwrap());
    assert!(analysis.classes_not_found().contains("com.acme.Gone"));
    assert!(!logs.contains("class not found"), "{logs}");
}

#[test]
fn private_members_are_visible_only_inside_their_outermost_class() {
    let mut b = TreeBuilder::new();
    let int = b.primitive(Primitive::Int);
    let secret = b.variable(VariableDecl::new(int, "secret").flags(Flags::PRIVATE));
    let read = b.ident("secret");
    let ret = b.ret(Some(read));
    let body_a = b.block(vec![ret]);
    let int = b.primitive(Primitive::Int);
    let peek = b.method(MethodDecl::new("peek", Some(int)).body(body_a));
    let a = b.class(ClassDecl::new(ClassKind::Class, "A").members(vec![secret, peek]));

    let body_b = b.block(vec![]);
    let void = b.void();
    let poke = b.method(MethodDecl::new("poke", Some(void)).body(body_b));
    let other = b.class(ClassDecl::new(ClassKind::Class, "B").members(vec![poke]));

    let unit = b.unit(Some("p"), vec![], vec![a, other]);
    let tree = b.finish(unit);
    let classpath = minimal_jdk();

    let mut analysis = analyze(&tree, &classpath, AnalyzerConfig::default()).unwrap();
    let field = analysis.symbol_of(secret).unwrap();
    let class_a = analysis.symbol_of(a).unwrap();
    assert_eq!(analysis.symbol_of(read), Some(field));
    assert_eq!(analysis.references(field), &[read]);

    let sema = analysis.sema_mut();
    let inside = sema.env_of(ret);
    let outside = sema.env_of(body_b);
    assert!(sema.is_accessible(inside, class_a, field));
    assert!(!sema.is_accessible(outside, class_a, field));
}

#[test]
fn least_upper_bound_of_sibling_exceptions() {
    let mut b = TreeBuilder::new();
    let exception = b.ident("Exception");
    let first = b.class(ClassDecl::new(ClassKind::Class, "First").extends(exception));
    let exception = b.ident("Exception");
    let second = b.class(ClassDecl::new(ClassKind::Class, "Second").extends(exception));
    let unit = b.unit(Some("p"), vec![], vec![first, second]);
    let tree = b.finish(unit);
    let classpath = minimal_jdk();

    let mut analysis = analyze(&tree, &classpath, AnalyzerConfig::default()).unwrap();
    let first = analysis.symbol_of(first).unwrap();
    let second = analysis.symbol_of(second).unwrap();
    let sema = analysis.sema_mut();
    let first_type = sema.type_of_symbol(first);
    let second_type = sema.type_of_symbol(second);

    let lub = sema.least_upper_bound(&[first_type, second_type]);
    assert_eq!(sema.display(lub), "java.lang.Exception");
    assert!(sema.is_subtype(first_type, lub));
    assert!(sema.is_subtype(second_type, lub));
}

#[test]
fn completion_runs_once_per_symbol() {
    let mut b = TreeBuilder::new();
    let class = b.class(ClassDecl::new(ClassKind::Class, "A"));
    let unit = b.unit(Some("p"), vec![], vec![class]);
    let tree = b.finish(unit);
    let classpath = minimal_jdk();

    let mut analysis = analyze(&tree, &classpath, AnalyzerConfig::default()).unwrap();
    let sema = analysis.sema_mut();
    let array_list = sema.load_class("java.util.ArrayList").unwrap();
    assert!(matches!(sema.symbol(array_list).completion(), Completion::Uninitialized(_)));

    sema.complete(array_list);
    let after_first = sema.completion_stats();
    assert_eq!(sema.symbol(array_list).completion(), Completion::Completed);
    sema.complete(array_list);
    assert_eq!(sema.completion_stats(), after_first);

    assert!(sema.load_class("java.util.LinkedList").is_none());
}

#[test]
fn classes_load_from_a_class_directory() {
    let dir = tempfile::tempdir().unwrap();
    for class in minimal_jdk_classes() {
        let path = dir.path().join(format!("{}.class", class.internal_name()));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, class.build()).unwrap();
    }
    let config = AnalyzerConfig {
        classpath: vec![ClasspathEntry::ClassDir(dir.path().to_path_buf())],
        ..AnalyzerConfig::default()
    };
    let classpath = Classpath::open(&config.classpath);
    assert_eq!(classpath.len(), 1);

    let mut b = TreeBuilder::new();
    let string = b.ident("String");
    let hello = b.string("hello");
    let field = b.variable(VariableDecl::new(string, "greeting").init(Some(hello)));
    let class = b.class(ClassDecl::new(ClassKind::Class, "A").members(vec![field]));
    let unit = b.unit(Some("p"), vec![], vec![class]);
    let tree = b.finish(unit);

    let analysis = analyze(&tree, &classpath, config).unwrap();
    assert!(analysis.classes_not_found().is_empty());
    assert_eq!(analysis.type_name_of(string).as_deref(), Some("java.lang.String"));
    assert_eq!(analysis.type_name_of(hello).as_deref(), Some("java.lang.String"));
    assert!(analysis.completion_stats().bytecode > 0);
}

#[test]
fn summary_serializes_resolved_nodes() {
    let mut b = TreeBuilder::new();
    let missing = b.qualified("com.acme.Missing");
    let field = b.variable(VariableDecl::new(missing, "m"));
    let class = b.class(ClassDecl::new(ClassKind::Class, "A").members(vec![field]));
    let unit = b.unit(Some("p"), vec![], vec![class]);
    let tree = b.finish(unit);
    let classpath = minimal_jdk();
    let config = AnalyzerConfig {
        report_missing_classes: false,
        ..AnalyzerConfig::default()
    };

    let analysis = analyze(&tree, &classpath, config).unwrap();
    let summary = serde_json::to_value(analysis.summary()).unwrap();
    assert_eq!(summary["classes_not_found"], serde_json::json!(["com.acme.Missing"]));

    let nodes = summary["nodes"].as_array().unwrap();
    let class_node = nodes
        .iter()
        .find(|node| node["node"] == serde_json::json!(class.index()))
        .unwrap();
    assert_eq!(class_node["symbol"], "p.A");
    assert_eq!(class_node["kind"], "type");
    assert!(nodes.windows(2).all(|pair| pair[0]["node"].as_u64() < pair[1]["node"].as_u64()));
}

#[test]
fn override_matches_parameters_after_substitution() {
    let mut b = TreeBuilder::new();
    let t = b.type_param("T", vec![]);
    let t_ref = b.ident("T");
    let item = b.local(t_ref, "item", None);
    let void = b.void();
    let body = b.block(vec![]);
    let base_put = b.method(MethodDecl::new("put", Some(void)).params(vec![item]).body(body));
    let base = b.class(
        ClassDecl::new(ClassKind::Class, "Base")
            .type_params(vec![t])
            .members(vec![base_put]),
    );

    let base_ref = b.ident("Base");
    let string = b.ident("String");
    let base_of_string = b.parameterized(base_ref, vec![string]);
    let string = b.ident("String");
    let s = b.local(string, "s", None);
    let void = b.void();
    let body = b.block(vec![]);
    let by_string = b.method(MethodDecl::new("put", Some(void)).params(vec![s]).body(body));
    let object = b.ident("Object");
    let o = b.local(object, "o", None);
    let void = b.void();
    let body = b.block(vec![]);
    let by_object = b.method(MethodDecl::new("put", Some(void)).params(vec![o]).body(body));
    let strings = b.class(
        ClassDecl::new(ClassKind::Class, "Strings")
            .extends(base_of_string)
            .members(vec![by_string, by_object]),
    );

    let unit = b.unit(Some("p"), vec![], vec![base, strings]);
    let tree = b.finish(unit);
    let classpath = minimal_jdk();

    let mut analysis = analyze(&tree, &classpath, AnalyzerConfig::default()).unwrap();
    let base_put = analysis.symbol_of(base_put).unwrap();
    let by_string = analysis.symbol_of(by_string).unwrap();
    let by_object = analysis.symbol_of(by_object).unwrap();
    let sema = analysis.sema_mut();
    assert_eq!(sema.overridden_method(by_string), Some(base_put));
    assert_eq!(sema.overridden_method(by_object), None);
    assert_eq!(sema.method_signature(by_string), "p.Strings#put(Ljava/lang/String;)V");
}

#[test]
fn enum_annotation_values_on_the_enum_itself_resolve_after_completion() {
    let constant = access::PUBLIC | access::STATIC | access::FINAL | access::ENUM;
    let tag = ClassFileBuilder::annotation_type("q/Tag")
        .method(MemberSpec::new(access::PUBLIC | access::ABSTRACT, "value", "()Lq/Mode;"));
    let mode = ClassFileBuilder::class("q/Mode")
        .access(access::PUBLIC | access::FINAL | access::SUPER | access::ENUM)
        .extends("java/lang/Enum")
        .signature("Ljava/lang/Enum<Lq/Mode;>;")
        .field(MemberSpec::new(constant, "FAST", "Lq/Mode;"))
        .field(MemberSpec::new(constant, "SLOW", "Lq/Mode;"))
        .method(
            MemberSpec::new(access::PUBLIC, "fallback", "()Lq/Mode;").annotation(
                AnnotationSpec::new("Lq/Tag;").element(
                    "value",
                    ElementSpec::Enum {
                        type_descriptor: "Lq/Mode;".to_string(),
                        constant: "SLOW".to_string(),
                    },
                ),
            ),
        );
    let classpath = minimal_jdk_with(vec![tag, mode]);

    let mut b = TreeBuilder::new();
    let class = b.class(ClassDecl::new(ClassKind::Class, "User"));
    let unit = b.unit(Some("p"), vec![], vec![class]);
    let tree = b.finish(unit);

    let mut analysis = analyze(&tree, &classpath, AnalyzerConfig::default()).unwrap();
    let sema = analysis.sema_mut();
    let mode = sema.load_class("q.Mode").unwrap();
    let members = sema.members(mode).unwrap();
    let slow = sema
        .lookup(members, &Name::new("SLOW"))
        .into_iter()
        .find(|member| sema.kind(*member) == SymbolKind::Variable)
        .unwrap();
    let fallback = sema
        .lookup(members, &Name::new("fallback"))
        .into_iter()
        .find(|member| sema.kind(*member) == SymbolKind::Method)
        .unwrap();
    assert_eq!(sema.symbol(mode).completion(), Completion::Completed);

    let annotations = sema.annotations(fallback);
    assert_eq!(annotations.len(), 1);
    let (name, value) = &annotations[0].values[0];
    assert_eq!(name.as_str(), "value");
    match value {
        AnnotationValue::Enum {
            type_symbol, constant, ..
        } => {
            assert_eq!(*type_symbol, mode);
            assert_eq!(*constant, Some(slow));
        }
        other => panic!("expected an enum value, got {other:?}"),
    }
}
