use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_command(args: &[&str]) -> Output {
    Command::new("cargo")
        .arg("run")
        .arg("--")
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

const DECK: &str =
    "---\ntheme: dark\n---\n# Test Slide\n\nThis is a test slide.\n\n???\nRemember to smile\n\n---\n\n## Second\n\n- one\n- two\n";

fn write_deck(dir: &Path) -> std::path::PathBuf {
    let markdown_path = dir.join("deck.md");
    fs::write(&markdown_path, DECK).expect("Failed to write markdown file");
    markdown_path
}

#[test]
fn test_html_command() {
    // Create temporary directory
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let temp_path = temp_dir.path();
    let markdown_path = write_deck(temp_path);

    // Create sample CSS file
    let css_path = temp_path.join("test.css");
    let css_content = "body { font-family: Arial; }";
    fs::write(&css_path, css_content).expect("Failed to write CSS file");

    // Output HTML path in a directory that does not exist yet
    let output_path = temp_path.join("out").join("deck.html");

    let output = run_command(&[
        "html",
        "-i",
        markdown_path.to_str().unwrap(),
        "-o",
        output_path.to_str().unwrap(),
        "--css",
        css_path.to_str().unwrap(),
    ]);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(output_path.exists(), "Output file was not created");

    let html_content = fs::read_to_string(&output_path).expect("Failed to read output file");
    assert!(
        html_content.contains("<h1>Test Slide</h1>"),
        "Missing markdown content"
    );
    assert!(
        html_content.contains("<style>body { font-family: Arial; }</style>"),
        "Missing CSS"
    );
    assert!(
        html_content.contains(r#"<body class="theme-dark">"#),
        "Missing frontmatter theme"
    );
    assert!(
        !html_content.contains("Remember to smile"),
        "Speaker notes leaked into the deck"
    );
}

#[test]
fn test_html_command_link_mode() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let markdown_path = write_deck(temp_dir.path());
    let output_path = temp_dir.path().join("deck.html");

    let output = run_command(&[
        "html",
        "-i",
        markdown_path.to_str().unwrap(),
        "-o",
        output_path.to_str().unwrap(),
        "--css",
        "theme.css",
        "--mode",
        "link",
    ]);

    assert!(output.status.success(), "Command failed: {:?}", output);
    let html_content = fs::read_to_string(&output_path).expect("Failed to read output file");
    assert!(html_content.contains(r#"<link rel="stylesheet" href="theme.css">"#));
}

#[test]
fn test_html_command_rejects_unknown_mode() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let markdown_path = write_deck(temp_dir.path());
    let output_path = temp_dir.path().join("deck.html");

    let output = run_command(&[
        "html",
        "-i",
        markdown_path.to_str().unwrap(),
        "-o",
        output_path.to_str().unwrap(),
        "--mode",
        "inline",
    ]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
    assert!(!output_path.exists());
}

#[test]
fn test_slides_command_json() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let markdown_path = write_deck(temp_dir.path());

    let output = run_command(&["slides", markdown_path.to_str().unwrap(), "--json"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let slides: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("Output is not JSON");
    let slides = slides.as_array().expect("Expected an array of slides");
    assert_eq!(slides.len(), 2);
    assert_eq!(
        slides[0]["content"],
        "# Test Slide\n\nThis is a test slide."
    );
    assert_eq!(slides[0]["notes"], "Remember to smile");
    assert_eq!(slides[1]["notes"], "");
}

#[test]
fn test_slides_command_text() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let markdown_path = write_deck(temp_dir.path());

    let output = run_command(&["slides", markdown_path.to_str().unwrap(), "--notes"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let text = stdout(&output);
    assert!(text.contains("--- Slide 1 / 2 ---"));
    assert!(text.contains("--- Slide 2 / 2 ---"));
    assert!(text.contains("Remember to smile"));
}

#[test]
fn test_outline_command() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let markdown_path = temp_dir.path().join("outline.md");
    fs::write(&markdown_path, "# A\n---\n## B\n").expect("Failed to write markdown file");

    let output = run_command(&["outline", markdown_path.to_str().unwrap(), "--json"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let items: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("Output is not JSON");
    assert_eq!(
        items,
        serde_json::json!([
            { "type": "h1", "text": "A", "sourceLine": 0 },
            { "type": "slide", "text": "Slide 2", "sourceLine": 1 },
            { "type": "h2", "text": "B", "sourceLine": 2 },
        ])
    );
}

#[test]
fn test_status_command() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let markdown_path = temp_dir.path().join("talk.md");
    fs::write(&markdown_path, "# Hello world\n---\nBye").expect("Failed to write markdown file");

    let output = run_command(&["status", markdown_path.to_str().unwrap()]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert_eq!(stdout(&output).trim(), "talk.md | 2 slides | 5 words");
}

#[test]
fn test_files_and_search_commands() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();
    fs::create_dir(root.join("drafts")).expect("Failed to create dir");
    fs::write(root.join("talk.md"), "# Intro\nRust is fun\n").expect("Failed to write");
    fs::write(root.join("drafts").join("old.md"), "rust, again").expect("Failed to write");
    fs::write(root.join(".secret.md"), "rust").expect("Failed to write");

    let output = run_command(&["files", root.to_str().unwrap()]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    let listing: Vec<String> = stdout(&output).lines().map(str::to_string).collect();
    assert_eq!(listing, vec!["drafts/", "talk.md"]);

    let output = run_command(&["search", "RUST", "--dir", root.to_str().unwrap(), "--json"]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    let results: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("Output is not JSON");
    let results = results.as_array().expect("Expected an array of results");
    assert_eq!(results.len(), 2);
    assert!(results
        .iter()
        .any(|r| r["file"] == "talk.md" && r["matches"][0]["line"] == 2));
}

#[test]
fn test_missing_input_fails() {
    let output = run_command(&["slides", "/definitely/not/a/deck.md"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}
