use prefix_log::{prefix, Members, Name, Target, TargetExt};

struct App {
    members: Members,
}

impl Target for App {
    fn members(&self) -> &Members {
        &self.members
    }

    fn members_mut(&mut self) -> &mut Members {
        &mut self.members
    }
}

fn main() {
    // Output goes to the console, which writes to the target named by the `PREFIX_LOG` environment
    // variable (`stderr`, `stdout`, or a file path)
    prefix_log::create("App")
        .with_level("error")
        .build()
        .expect("The default configuration is valid")
        .attach_type::<App>();

    let app = App {
        members: Members::new(),
    };
    let logger = app.logger().expect("Every App inherits the logger");
    // Logger methods return whether the call was delivered, so they can be chained inline
    if let Err(err) = logger.warn(&[&"watch out!"]) {
        eprintln!("Could not log: {err}");
    }
    match logger.debug(&[&"Hidden, debug is above the error level"]) {
        Ok(true) => {}
        Ok(false) => println!("The debug message was filtered out"),
        Err(err) => eprintln!("Could not log: {err}"),
    }

    // Methods can also be flattened onto the target, with the name computed on every call
    let mut worker = Members::new();
    prefix_log::create(Name::dynamic(|ctx| format!("worker:{}", ctx.method)))
        .with_accessor("this")
        .with_prefixer(prefix::timestamped())
        .build()
        .expect("The default configuration is valid")
        .attach(&mut worker);
    let started = worker.call("info", &[&"started", &3, &"jobs"]).unwrap_or(false)
        && worker.call("log", &[&"ready"]).unwrap_or(false);
    assert!(started, "Both messages pass the default level");
}
