use std::fmt::Display;
use std::io;
use std::sync::Arc;

use prefix_log::{
    create, DispatchError, Level, LoggerBuilder, Member, Members, MemorySink, Name, Prototype,
    Sink, Target, TargetExt, TargetKind, DEFAULT_FUNCTIONS,
};

struct Dummy {
    members: Members,
}

impl Dummy {
    fn new() -> Self {
        Self {
            members: Members::new(),
        }
    }
}

impl Target for Dummy {
    fn members(&self) -> &Members {
        &self.members
    }

    fn members_mut(&mut self) -> &mut Members {
        &mut self.members
    }
}

fn received(sink: &MemorySink) -> Vec<(String, Vec<String>)> {
    sink.calls()
        .into_iter()
        .map(|call| (call.method, call.args))
        .collect()
}

#[test]
fn adds_logger_to_plain_object() {
    let mut obj = Members::new();
    create("logger")
        .with_backend(Arc::new(MemorySink::new("memory")))
        .build()
        .unwrap()
        .attach(&mut obj);

    assert!(obj.logger().is_some());
}

#[test]
fn adds_logger_to_type_prototype() {
    struct Service;

    let prototype = LoggerBuilder::default()
        .with_backend(Arc::new(MemorySink::new("memory")))
        .build()
        .unwrap()
        .attach_type::<Service>();

    assert!(prototype.logger().is_some());
    assert!(Prototype::<Service>::of().logger().is_some());
}

#[test]
fn exposes_exactly_the_configured_methods() {
    let functions = ["notice", "alert", "panic"];
    let logger = create("App")
        .with_backend(Arc::new(MemorySink::new("memory")))
        .with_functions(functions)
        .build()
        .unwrap()
        .standalone();

    assert_eq!(logger.methods().collect::<Vec<_>>(), functions);
    for method in DEFAULT_FUNCTIONS {
        assert!(!logger.has_method(method));
    }
}

#[test]
fn attached_and_standalone_loggers_have_every_method() {
    let factory = create("App")
        .with_backend(Arc::new(MemorySink::new("memory")))
        .build()
        .unwrap();

    let mut obj = Members::new();
    factory.attach(&mut obj);
    let attached = obj.logger().unwrap();
    let standalone = factory.standalone();

    for method in DEFAULT_FUNCTIONS {
        assert!(attached.method(method).is_some());
        assert!(standalone.method(method).is_some());
    }
}

#[test]
fn forwards_prefix_and_arguments() {
    let sink = Arc::new(MemorySink::new("memory"));
    let mut dummy = Dummy::new();
    create("Dummy")
        .with_backend(sink.clone())
        .build()
        .unwrap()
        .attach(&mut dummy);

    assert!(dummy.logger().unwrap().log(&[&"ok"]).unwrap());
    assert_eq!(
        received(&sink),
        [("log".to_owned(), vec!["[Dummy]".to_owned(), "ok".to_owned()])]
    );
}

#[test]
fn forwards_to_every_sink() {
    let first = Arc::new(MemorySink::new("first"));
    let second = Arc::new(MemorySink::new("second"));
    let logger = create("Fan")
        .with_backends([first.clone() as Arc<dyn Sink>, second.clone()])
        .build()
        .unwrap()
        .standalone();

    logger.error(&[&"disk full", &507]).unwrap();
    for sink in [&first, &second] {
        assert_eq!(sink.calls()[0].method, "error");
        assert_eq!(sink.calls()[0].args, ["[Fan]", "disk full", "507"]);
    }
}

#[test]
fn level_by_name_and_rank_agree() {
    for level in [Level::from("info"), Level::Rank(1)] {
        let sink = Arc::new(MemorySink::new("memory"));
        let logger = create("Levels")
            .with_backend(sink.clone())
            .with_functions(["log", "info", "warn"])
            .with_level(level)
            .build()
            .unwrap()
            .standalone();

        assert!(logger.log(&[&"a"]).unwrap());
        assert!(logger.info(&[&"b"]).unwrap());
        assert!(!logger.warn(&[&"c"]).unwrap());

        let methods: Vec<String> = sink.calls().into_iter().map(|call| call.method).collect();
        assert_eq!(methods, ["log", "info"]);
    }
}

#[test]
fn flatten_installs_methods_on_the_target() {
    let sink = Arc::new(MemorySink::new("memory"));
    let mut dummy = Dummy::new();
    create("Flat")
        .with_backend(sink.clone())
        .with_accessor("this")
        .build()
        .unwrap()
        .attach(&mut dummy);

    assert!(dummy.logger().is_none());
    for method in DEFAULT_FUNCTIONS {
        assert!(matches!(dummy.member(method), Some(Member::Method(_))));
    }
    assert!(dummy.call("warn", &[&"flat"]).unwrap());
    assert_eq!(sink.calls()[0].args, ["[Flat]", "flat"]);
}

#[test]
fn flatten_on_prototype_is_inherited() {
    struct Component {
        members: Members,
    }

    impl Target for Component {
        fn members(&self) -> &Members {
            &self.members
        }

        fn members_mut(&mut self) -> &mut Members {
            &mut self.members
        }
    }

    let sink = Arc::new(MemorySink::new("memory"));
    create("Component")
        .with_backend(sink.clone())
        .with_accessor("this")
        .build()
        .unwrap()
        .attach_type::<Component>();

    let instance = Component {
        members: Members::new(),
    };
    assert!(instance.members().is_empty());
    assert!(instance.call("info", &[&"inherited"]).unwrap());
    assert_eq!(sink.calls()[0].args, ["[Component]", "inherited"]);
}

#[test]
fn standalone_logger_is_usable_directly() {
    let sink = Arc::new(MemorySink::new("memory"));
    let logger = create("Solo")
        .with_backend(sink.clone())
        .with_accessor("ignored")
        .build()
        .unwrap()
        .standalone();

    assert_eq!(logger.target().kind, TargetKind::Standalone);
    assert!(logger.trace(&[&"here"]).unwrap());
    assert_eq!(sink.calls()[0].args, ["[Solo]", "here"]);
}

#[test]
fn attaching_twice_does_not_accumulate() {
    let sink = Arc::new(MemorySink::new("memory"));
    let factory = create("Twice").with_backend(sink.clone()).build().unwrap();
    let mut dummy = Dummy::new();
    factory.attach(&mut dummy);
    factory.attach(&mut dummy);

    assert_eq!(dummy.members().len(), 1);
    dummy.logger().unwrap().info(&[&"once"]).unwrap();
    assert_eq!(sink.calls().len(), 1);
}

#[test]
fn dynamic_name_is_resolved_per_call() {
    let sink = Arc::new(MemorySink::new("memory"));
    let mut dummy = Dummy::new();
    create(Name::dynamic(|ctx| {
        let short_type = ctx.target.type_name.rsplit("::").next().unwrap_or_default();
        format!("{short_type}#{}", ctx.args.len())
    }))
    .with_backend(sink.clone())
    .build()
    .unwrap()
    .attach(&mut dummy);

    let logger = dummy.logger().unwrap();
    logger.log(&[&"one"]).unwrap();
    logger.log(&[&"one", &"two"]).unwrap();

    let prefixes: Vec<String> = sink
        .calls()
        .into_iter()
        .map(|call| call.args[0].clone())
        .collect();
    assert_eq!(prefixes, ["[Dummy#1]", "[Dummy#2]"]);
}

#[test]
fn returns_true_for_inline_use() {
    let sink = Arc::new(MemorySink::new("memory"));
    let logger = create("Inline")
        .with_backend(sink.clone())
        .with_level("warn")
        .build()
        .unwrap()
        .standalone();

    let delivered = logger.warn(&[&"checked"]).unwrap_or(false) && sink.calls().len() == 1;
    assert!(delivered);
    assert!(!logger.debug(&[&"filtered"]).unwrap());
}

#[test]
fn sink_failures_propagate() {
    struct Broken;

    impl Sink for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn supports(&self, _method: &str) -> bool {
            true
        }

        fn call(&self, _method: &str, _args: &[&dyn Display]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    let after = Arc::new(MemorySink::new("after"));
    let sinks = || [Arc::new(Broken) as Arc<dyn Sink>, after.clone()];

    let strict = create("Strict").with_backends(sinks()).build().unwrap().standalone();
    let err = strict.log(&[&"lost"]).unwrap_err();
    assert!(matches!(err, DispatchError::Sink { ref sink, .. } if sink == "broken"));
    assert!(after.calls().is_empty());

    let isolated = create("Isolated")
        .with_backends(sinks())
        .with_sink_isolation(true)
        .build()
        .unwrap()
        .standalone();
    assert!(isolated.log(&[&"kept"]).is_err());
    assert_eq!(after.calls()[0].args, ["[Isolated]", "kept"]);
}

#[test]
fn missing_backend_method_fails_at_call_time() {
    let sink = Arc::new(MemorySink::with_methods("partial", ["log", "info"]));
    let logger = create("Lazy")
        .with_backend(sink.clone())
        .build()
        .expect("sinks are not checked when building");

    let logger = logger.standalone();
    assert!(logger.info(&[&"fine"]).unwrap());
    let err = logger.warn(&[&"unsupported"]).unwrap_err();
    assert_eq!(err.to_string(), "Sink 'partial' does not support 'warn'");
}
