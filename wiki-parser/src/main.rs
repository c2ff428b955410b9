use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

fn main() {
    if let Err(err) = run() {
        eprintln!("{}: {err}", env!("CARGO_PKG_NAME"));
        process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let mut args = env::args();
    let program = args
        .next()
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());

    let mut mode = Mode::Text;
    let mut next = args.next();
    if next.as_deref().is_some_and(is_paragraphs_flag) {
        mode = Mode::Paragraphs;
        next = args.next();
    }

    let input = match next {
        Some(flag) if is_help_flag(&flag) => {
            print_help(&program);
            return Ok(());
        }
        Some(flag) if is_version_flag(&flag) => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Some(path) if path == "-" => Input::Stdin,
        Some(path) => Input::File(path),
        None => Input::Stdin,
    };

    if let Some(extra) = args.next() {
        return Err(format!("unexpected argument: {extra}\n{}", usage(&program)));
    }

    let html = match input {
        Input::Stdin => read_stdin()?,
        Input::File(path) => read_file(&path)?,
    };

    let text = match mode {
        Mode::Text => wiki_parser::extract_text(&html),
        Mode::Paragraphs => wiki_parser::extract_paragraphs(&html)
            .iter()
            .enumerate()
            .map(|(idx, paragraph)| format!("[p{}] {paragraph}", idx + 1))
            .collect::<Vec<_>>()
            .join("\n"),
    };
    println!("{text}");
    Ok(())
}

enum Mode {
    Text,
    Paragraphs,
}

enum Input {
    Stdin,
    File(String),
}

fn is_help_flag(arg: &str) -> bool {
    arg == "-h" || arg == "--help"
}

fn is_paragraphs_flag(arg: &str) -> bool {
    arg == "-p" || arg == "--paragraphs"
}

fn is_version_flag(arg: &str) -> bool {
    arg == "-V" || arg == "--version"
}

fn read_file(path: &str) -> Result<String, String> {
    fs::read_to_string(path).map_err(|err| format!("failed to read '{path}': {err}"))
}

fn read_stdin() -> Result<String, String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .map_err(|err| format!("failed to read stdin: {err}"))?;
    Ok(buf)
}

fn print_help(program: &str) {
    println!(
        "{}\n\n\
         Options:\n  \
         -p, --paragraphs  Number each extracted paragraph\n  \
         -h, --help        Show this message\n  \
         -V, --version     Print package version",
        usage(program)
    );
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {program} [-p] [HTML_FILE|-]\n\n\
         Prints the cleaned paragraph text of a rendered Wikipedia article. \
         Provide a path to an HTML file or '-' to read from stdin. \
         When no argument is passed, stdin is used."
    )
}
