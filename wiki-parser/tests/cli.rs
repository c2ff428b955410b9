use std::io::Write;
use std::process::{Command, Stdio};

fn expected_with_newline(expected: &str) -> String {
    format!("{}\n", expected.trim_end_matches('\n'))
}

#[test]
fn cli_reads_file_path() {
    let output = Command::new(env!("CARGO_BIN_EXE_wiki_parser"))
        .arg("tests/fixtures/html/sections-and-math.html")
        .output()
        .expect("run CLI");

    assert!(
        output.status.success(),
        "cli exited with {}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("[4]") && !stdout.contains("[12]"), "{stdout}");
    assert!(!stdout.contains("CO2"), "math markup leaked: {stdout}");
    assert!(!stdout.contains("List entries"), "{stdout}");
    assert!(stdout.contains("Jan van Helmont & others"), "{stdout}");

    let expected = include_str!("fixtures/expected/sections-and-math.txt");
    assert_eq!(stdout, expected_with_newline(expected));
}

#[test]
fn cli_reads_stdin_when_no_args() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_wiki_parser"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn CLI");

    let html = include_str!("fixtures/html/lead-with-infobox.html");
    child
        .stdin
        .as_mut()
        .expect("stdin open")
        .write_all(html.as_bytes())
        .expect("write stdin");

    let output = child.wait_with_output().expect("read CLI output");
    assert!(
        output.status.success(),
        "cli exited with {}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 2);
    assert!(!stdout.contains("[1]"), "citation leaked: {stdout}");
    assert!(!stdout.contains("Overall equation"), "infobox leaked: {stdout}");
    assert!(!stdout.contains("Composite image"), "caption leaked: {stdout}");

    let expected = include_str!("fixtures/expected/lead-with-infobox.txt");
    assert_eq!(stdout, expected_with_newline(expected));
}

#[test]
fn cli_numbers_paragraphs() {
    let output = Command::new(env!("CARGO_BIN_EXE_wiki_parser"))
        .args(["--paragraphs", "tests/fixtures/html/sections-and-math.html"])
        .output()
        .expect("run CLI");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("[p1] The overall equation"));
    assert!(lines[1].starts_with("[p2] Early experiments"));
}

#[test]
fn cli_rejects_extra_arguments() {
    let output = Command::new(env!("CARGO_BIN_EXE_wiki_parser"))
        .args(["one.html", "two.html"])
        .output()
        .expect("run CLI");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unexpected argument: two.html"));
}
