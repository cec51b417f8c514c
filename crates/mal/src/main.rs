use std::path::PathBuf;
use std::thread;

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use mal::{suggest_similar, Interpreter, InterpreterBuilder, MalError, SPECIAL_FORM_NAMES};

#[derive(Parser)]
#[command(name = "mal", about = "Mal-arkey: a small Lisp interpreter")]
struct Cli {
    /// File to execute
    file: Option<String>,

    /// Arguments bound to *ARGV* when running a file
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,

    /// Evaluate an expression and print the result
    #[arg(short, long)]
    eval: Option<String>,

    /// Skip loading the prelude (not, cond, load-file)
    #[arg(long)]
    no_prelude: bool,

    /// Maximum depth of nested (non-tail) evaluation
    #[arg(long, default_value_t = 1000)]
    max_depth: usize,

    /// Stack size of the interpreter thread, in MiB
    #[arg(long, default_value_t = 64)]
    stack_mb: usize,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(stack_size) = cli.stack_mb.checked_mul(1024 * 1024) else {
        eprintln!("Error: invalid --stack-mb: {}", cli.stack_mb);
        std::process::exit(2);
    };
    let result = thread::Builder::new()
        .name("mal-worker".to_string())
        .stack_size(stack_size)
        .spawn(move || run(cli))
        .map_err(|e| format!("failed to start interpreter thread: {e}"))
        .and_then(|h| h.join().map_err(|_| "interpreter thread panicked".to_string()));

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> i32 {
    let interpreter = InterpreterBuilder::new()
        .with_prelude(!cli.no_prelude)
        .with_max_depth(cli.max_depth)
        .build();

    if let Some(expr) = &cli.eval {
        return match interpreter.eval_str(expr) {
            Ok(val) => {
                println!("{}", interpreter.print(&val, true));
                0
            }
            Err(e) => {
                report(&interpreter, &e);
                1
            }
        };
    }

    if let Some(file) = &cli.file {
        interpreter.set_argv(&cli.args);
        return match interpreter.load_file(file) {
            Ok(_) => 0,
            Err(e) => {
                report(&interpreter, &e);
                1
            }
        };
    }

    repl(&interpreter)
}

fn repl(interpreter: &Interpreter) -> i32 {
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("Error: failed to create line editor: {e}");
            return 1;
        }
    };
    let history_path = history_path();
    let _ = rl.load_history(&history_path);

    if let Err(e) = interpreter.eval_str(r#"(println (str "Mal [" *host-language* "]"))"#) {
        report(interpreter, &e);
    }

    let mut buffer = String::new();
    let mut in_multiline = false;

    loop {
        let prompt = if in_multiline { "  ... " } else { "user> " };
        match rl.readline(prompt) {
            Ok(line) => {
                if in_multiline {
                    buffer.push('\n');
                    buffer.push_str(&line);
                } else {
                    buffer = line;
                }

                if !is_balanced(&buffer) {
                    in_multiline = true;
                    continue;
                }

                in_multiline = false;
                let input = buffer.trim().to_string();
                buffer.clear();

                if input.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&input);

                match interpreter.eval_str(&input) {
                    Ok(val) => println!("{}", interpreter.print(&val, true)),
                    Err(e) => report(interpreter, &e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                if in_multiline {
                    buffer.clear();
                    in_multiline = false;
                    println!("^C");
                }
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Error: {e}");
                break;
            }
        }
    }

    if let Err(e) = rl.save_history(&history_path) {
        tracing::debug!(error = %e, "could not save history");
    }
    0
}

fn report(interpreter: &Interpreter, err: &MalError) {
    match err {
        MalError::Throw(value) => eprintln!("Error: {}", interpreter.print(value, true)),
        other => eprintln!("Error: {other}"),
    }
    if let MalError::Unbound(name) = err {
        let names = interpreter.global_env().names();
        let candidates: Vec<&str> = names
            .iter()
            .map(String::as_str)
            .chain(SPECIAL_FORM_NAMES.iter().copied())
            .collect();
        if let Some(suggestion) = suggest_similar(name, &candidates) {
            eprintln!("  Hint: did you mean '{suggestion}'?");
        }
    }
}

/// True when every opened bracket outside strings and comments is closed.
fn is_balanced(input: &str) -> bool {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut in_comment = false;
    let mut escape = false;
    for ch in input.chars() {
        if in_comment {
            in_comment = ch != '\n';
            continue;
        }
        if escape {
            escape = false;
            continue;
        }
        if ch == '\\' && in_string {
            escape = true;
            continue;
        }
        if ch == '"' {
            in_string = !in_string;
            continue;
        }
        if in_string {
            continue;
        }
        match ch {
            ';' => in_comment = true,
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            _ => {}
        }
    }
    depth <= 0 && !in_string
}

fn history_path() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".mal_history")
}
