use std::path::PathBuf;

use mal::{Interpreter, InterpreterBuilder, MalError, Value};

fn temp_script(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("mal-{}-{name}", std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_builder_without_prelude() {
    let interp = InterpreterBuilder::new().with_prelude(false).build();
    assert!(matches!(interp.eval_str("(not true)"), Err(MalError::Unbound(_))));
    assert_eq!(interp.eval_str("(+ 1 2)").unwrap(), Value::Int(3));
}

#[test]
fn test_builder_max_depth() {
    let interp = InterpreterBuilder::new().with_max_depth(40).build();
    interp
        .eval_str("(def! sum (fn* (n) (if (= n 0) 0 (+ n (sum (- n 1))))))")
        .unwrap();
    assert_eq!(interp.eval_str("(sum 10)").unwrap(), Value::Int(55));
    let err = interp.eval_str("(sum 200)").unwrap_err();
    assert_eq!(err.to_string(), "maximum recursion depth exceeded");
    assert_eq!(
        interp
            .eval_str("(try* (sum 200) (catch* e :too-deep))")
            .unwrap(),
        Value::keyword("too-deep")
    );
    assert_eq!(interp.eval_str("(sum 5)").unwrap(), Value::Int(15));
}

#[test]
fn test_default_limit_on_small_thread_stack() {
    let handle = std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(|| {
            let interp = Interpreter::new();
            interp
                .eval_str("(def! deep (fn* (n) (if (= n 0) 0 (+ 1 (deep (- n 1))))))")
                .unwrap();
            let reached = interp.eval_str("(deep 990)").unwrap();
            let caught = interp
                .eval_str("(try* (deep 100000) (catch* e e))")
                .unwrap();
            // `Value` is `Rc`-based and not `Send`; assert inside the thread.
            assert_eq!(reached, Value::Int(990));
            assert_eq!(caught, Value::string("maximum recursion depth exceeded"));
        })
        .unwrap();
    handle.join().unwrap();
}

#[test]
fn test_deeply_nested_read_string_is_catchable() {
    let interp = Interpreter::new();
    let deep = "(".repeat(100_000);
    let src = format!("(try* (read-string \"{deep}\") (catch* e :caught))");
    assert_eq!(interp.eval_str(&src).unwrap(), Value::keyword("caught"));
}

#[test]
fn test_interpreters_are_independent() {
    let a = Interpreter::new();
    let b = Interpreter::new();
    a.eval_str("(def! shared (atom 1))").unwrap();
    b.eval_str("(def! shared (atom 100))").unwrap();
    a.eval_str("(swap! shared + 1)").unwrap();
    assert_eq!(a.eval_str("@shared").unwrap(), Value::Int(2));
    assert_eq!(b.eval_str("@shared").unwrap(), Value::Int(100));
}

#[test]
fn test_set_argv() {
    let interp = Interpreter::new();
    interp.set_argv(&["one", "two"]);
    assert_eq!(
        interp.eval_str("*ARGV*").unwrap(),
        Value::list(vec![Value::string("one"), Value::string("two")])
    );
}

#[test]
fn test_load_file_defines_in_root() {
    let path = temp_script(
        "load.mal",
        "; helper definitions\n(def! double (fn* (x) (* 2 x)))\n(def! loaded (double 21))\n",
    );
    let interp = Interpreter::new();
    let result = interp.load_file(path.to_str().unwrap()).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(result, Value::Nil);
    assert_eq!(interp.eval_str("loaded").unwrap(), Value::Int(42));
    assert_eq!(interp.eval_str("(double 4)").unwrap(), Value::Int(8));
}

#[test]
fn test_load_file_sees_argv() {
    let path = temp_script("argv.mal", "(def! first-arg (first *ARGV*))");
    let interp = Interpreter::new();
    interp.set_argv(&["hello"]);
    interp.load_file(path.to_str().unwrap()).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(interp.eval_str("first-arg").unwrap(), Value::string("hello"));
}

#[test]
fn test_load_file_builtin() {
    let path = temp_script("builtin.mal", "(def! via-builtin :yes)\n");
    let interp = Interpreter::new();
    let src = format!("(load-file \"{}\")", path.display());
    assert_eq!(interp.eval_str(&src).unwrap(), Value::Nil);
    std::fs::remove_file(&path).unwrap();
    assert_eq!(interp.eval_str("via-builtin").unwrap(), Value::keyword("yes"));
}

#[test]
fn test_load_file_without_prelude() {
    let path = temp_script("bare.mal", "(def! bare 1)");
    let interp = InterpreterBuilder::new().with_prelude(false).build();
    interp.load_file(path.to_str().unwrap()).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(interp.eval_str("bare").unwrap(), Value::Int(1));
}

#[test]
fn test_load_missing_file() {
    let interp = Interpreter::new();
    let err = interp.load_file("/no/such/file.mal").unwrap_err();
    assert!(matches!(err, MalError::Io(_)));
}

#[test]
fn test_register_fn() {
    let interp = Interpreter::new();
    interp.register_fn("square", |args: &[Value]| match &args[0] {
        Value::Int(n) => Ok(Value::Int(n * n)),
        other => Err(MalError::type_error("integer", other.type_name())),
    });
    assert_eq!(interp.eval_str("(map square [1 2 3])").unwrap(), mal::read_str("(1 4 9)").unwrap());
}

#[test]
fn test_eval_parsed_value() {
    let interp = Interpreter::new();
    let expr = mal::read_str("(str \"n=\" (+ 1 1))").unwrap();
    assert_eq!(interp.eval(&expr).unwrap(), Value::string("n=2"));
}

#[test]
fn test_global_env_names_include_builtins() {
    let interp = Interpreter::new();
    let names = interp.global_env().names();
    for expected in ["+", "cons", "load-file", "*ARGV*", "*host-language*"] {
        assert!(names.iter().any(|n| n == expected), "missing {expected}");
    }
}
