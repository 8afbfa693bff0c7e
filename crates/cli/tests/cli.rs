use assert_cmd::Command;
use esl_pptx::PptxReader;
use predicates::prelude::*;
use std::fs::File;
use std::path::Path;
use tempfile::TempDir;

const PNG_1X1: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13, b'I', b'H', b'D', b'R', 0, 0, 0,
    1, 0, 0, 0, 1, 8, 6, 0, 0, 0,
];

fn esl_deck(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("esl-deck").unwrap();
    cmd.current_dir(dir)
        .env_remove("OPENAI_API_KEY")
        .env_remove("STABILITY_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &Path, server: &mockito::Server) -> std::path::PathBuf {
    let path = dir.join("test-config.toml");
    std::fs::write(
        &path,
        format!(
            r#"
            [text]
            api_url = "{url}/v1"
            api_key = "sk-text"
            timeout_secs = 10

            [image]
            api_url = "{url}/v2beta/stable-image/generate/ultra"
            api_key = "sk-image"
            timeout_secs = 10
            "#,
            url = server.url()
        ),
    )
    .unwrap();
    path
}

fn decoy_completion() -> String {
    serde_json::json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": "{\"confusion_words\": [\"hat\", \"bat\"]}"
            }
        }]
    })
    .to_string()
}

#[test]
fn test_blank_word_is_rejected_before_any_request() {
    let dir = TempDir::new().unwrap();

    esl_deck(dir.path())
        .args(["generate", "apple", ""])
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "Please enter all words before generating the exercise",
        ))
        .stderr(predicate::str::contains("Word 2"));

    assert!(!dir.path().join("ESL_Exercise.pptx").exists());
}

#[test]
fn test_too_many_words_is_rejected() {
    let dir = TempDir::new().unwrap();
    let words: Vec<String> = (1..=11).map(|i| format!("word{}", i)).collect();

    esl_deck(dir.path())
        .arg("generate")
        .args(&words)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Warning:"));
}

#[test]
fn test_prompt_count_out_of_range() {
    let dir = TempDir::new().unwrap();

    esl_deck(dir.path())
        .args(["generate", "--count", "0"])
        .assert()
        .code(2);
}

#[test]
fn test_inspect_missing_file() {
    let dir = TempDir::new().unwrap();

    esl_deck(dir.path())
        .args(["inspect", "nope.pptx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open"));
}

#[test]
fn test_generate_end_to_end() {
    let mut server = mockito::Server::new();
    let chat = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-text")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(decoy_completion())
        .expect(2)
        .create();
    let image = server
        .mock("POST", "/v2beta/stable-image/generate/ultra")
        .match_header("authorization", "Bearer sk-image")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(PNG_1X1)
        .expect(2)
        .create();

    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &server);

    esl_deck(dir.path())
        .args(["generate", "cat", "dog", "--seed", "7", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("ESL_Exercise.pptx"))
        .stderr(predicate::str::contains("Created slide 1/2: cat"))
        .stderr(predicate::str::contains("Created slide 2/2: dog"));

    chat.assert();
    image.assert();

    let output = dir.path().join("ESL_Exercise.pptx");
    let summaries = PptxReader::new()
        .read(File::open(&output).unwrap())
        .unwrap();

    assert_eq!(summaries.len(), 2);
    for (summary, target) in summaries.iter().zip(["cat", "dog"]) {
        assert_eq!(summary.pictures, 1);
        assert_eq!(summary.labels.len(), 3);

        let letters: Vec<&str> = summary.labels.iter().map(|l| &l[..3]).collect();
        assert_eq!(letters, vec!["A. ", "B. ", "C. "]);

        let mut words: Vec<&str> = summary.labels.iter().map(|l| &l[3..]).collect();
        words.sort_unstable();
        let mut expected = vec![target, "hat", "bat"];
        expected.sort_unstable();
        assert_eq!(words, expected);
    }

    esl_deck(dir.path())
        .args(["inspect", "ESL_Exercise.pptx", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"pictures\": 1"));
}

#[test]
fn test_image_failure_aborts_without_output() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(decoy_completion())
        .create();
    server
        .mock("POST", "/v2beta/stable-image/generate/ultra")
        .with_status(402)
        .with_header("content-type", "application/json")
        .with_body(r#"{"errors": ["insufficient credits"]}"#)
        .create();

    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &server);

    esl_deck(dir.path())
        .args(["generate", "cat", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("insufficient credits"));

    assert!(!dir.path().join("ESL_Exercise.pptx").exists());
}

#[test]
fn test_skip_failed_drops_the_word() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(decoy_completion())
        .create();
    server
        .mock("POST", "/v2beta/stable-image/generate/ultra")
        .match_body(mockito::Matcher::Regex("cat".to_string()))
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(PNG_1X1)
        .create();
    server
        .mock("POST", "/v2beta/stable-image/generate/ultra")
        .match_body(mockito::Matcher::Regex("dog".to_string()))
        .with_status(500)
        .with_body("boom")
        .create();

    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &server);

    esl_deck(dir.path())
        .args(["generate", "cat", "dog", "--skip-failed", "-o", "out/deck.pptx", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stderr(predicate::str::contains("Skipped word 2/2 'dog'"));

    let summaries = PptxReader::new()
        .read(File::open(dir.path().join("out/deck.pptx")).unwrap())
        .unwrap();
    assert_eq!(summaries.len(), 1);
    assert!(summaries[0].labels.iter().any(|l| l.ends_with("cat")));
}
