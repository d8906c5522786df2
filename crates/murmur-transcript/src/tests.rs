//! Tests for `TranscriptFile` against a temporary directory.

use murmur_core::turn::{Role, Transcript, Turn};
use tempfile::TempDir;

use crate::{Error, TranscriptFile};

fn file(dir: &TempDir) -> TranscriptFile {
  TranscriptFile::new(dir.path().join("transcript.json"), None)
}

#[tokio::test]
async fn missing_file_loads_empty() {
  let dir = TempDir::new().unwrap();
  let t = file(&dir).load().await.unwrap();
  assert!(t.is_empty());
}

#[tokio::test]
async fn save_then_load_preserves_order() {
  let dir = TempDir::new().unwrap();
  let store = file(&dir);

  let mut t = Transcript::new();
  for i in 0..5 {
    t.push(Turn::system(format!("context {i}")));
    t.push(Turn::user(format!("question {i}")));
    t.push(Turn::assistant(format!("answer {i}")));
  }
  store.save(&t).await.unwrap();

  let loaded = store.load().await.unwrap();
  assert_eq!(loaded.turns(), t.turns());
  assert_eq!(loaded.turns()[1].role, Role::User);
  assert_eq!(loaded.last().unwrap().content, "answer 4");
}

#[tokio::test]
async fn save_overwrites_previous_contents() {
  let dir = TempDir::new().unwrap();
  let store = file(&dir);

  let mut long = Transcript::new();
  for i in 0..10 {
    long.push(Turn::user(i.to_string()));
  }
  store.save(&long).await.unwrap();

  let mut short = Transcript::new();
  short.push(Turn::assistant("only"));
  store.save(&short).await.unwrap();

  let loaded = store.load().await.unwrap();
  assert_eq!(loaded.turns(), [Turn::assistant("only")]);
  assert!(!dir.path().join("transcript.json.tmp").exists());
}

#[tokio::test]
async fn save_creates_parent_directories() {
  let dir = TempDir::new().unwrap();
  let store = TranscriptFile::new(dir.path().join("logs/nested/transcript.json"), None);

  let mut t = Transcript::new();
  t.push(Turn::user("hello"));
  store.save(&t).await.unwrap();

  assert_eq!(store.load().await.unwrap().len(), 1);
}

#[tokio::test]
async fn load_applies_window() {
  let dir = TempDir::new().unwrap();
  let path = dir.path().join("transcript.json");

  let mut t = Transcript::new();
  for i in 0..6 {
    t.push(Turn::user(i.to_string()));
  }
  TranscriptFile::new(&path, None).save(&t).await.unwrap();

  let loaded = TranscriptFile::new(&path, Some(2)).load().await.unwrap();
  let contents: Vec<_> = loaded.turns().iter().map(|t| t.content.as_str()).collect();
  assert_eq!(contents, ["4", "5"]);
  assert_eq!(loaded.max_turns(), Some(2));
}

#[tokio::test]
async fn corrupt_file_is_a_decode_error() {
  let dir = TempDir::new().unwrap();
  let store = file(&dir);
  tokio::fs::write(store.path(), b"\x80\x04\x95 not json").await.unwrap();

  let err = store.load().await.unwrap_err();
  assert!(matches!(err, Error::Decode { .. }), "{err}");
}

#[tokio::test]
async fn unknown_role_is_a_decode_error() {
  let dir = TempDir::new().unwrap();
  let store = file(&dir);
  tokio::fs::write(store.path(), br#"[{"role":"tool","content":"x"}]"#).await.unwrap();

  assert!(matches!(store.load().await, Err(Error::Decode { .. })));
}
