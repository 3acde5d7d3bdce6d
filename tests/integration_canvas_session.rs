//! Canvas session integration tests
//!
//! Drives a full session through the public API: restore, edit, save, run
//! against a stand-in image tool, and shut down.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use magick_canvas::Canvas;
use magick_canvas::collab::{MemoryConsole, MemoryDisplay};
use magick_canvas::config::Config;
use magick_canvas::document::{FilePersistence, MemorySettingsStore, Settings};
use magick_canvas::script::ScriptDialect;
use tempfile::TempDir;

/// Stand-in for the image tool: prints its arguments and the directory it
/// ran in, then writes the last argument as the output image.
const FAKE_TOOL: &str = r#"for last; do :; done
echo "args: $*"
echo "cwd: $(pwd)"
printf 'PNG' > "$last"
"#;

fn install_tool(dir: &Path, body: &str) -> String {
    let tool = dir.join("fake-magick");
    fs::write(&tool, body).unwrap();
    format!("sh {}", tool.display())
}

fn config(tool_path: String) -> Config {
    Config {
        tool_path,
        dialect: Some(ScriptDialect::Posix),
        ..Config::default()
    }
}

fn leftover_artifacts(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("MagickCanvas."))
        .collect()
}

/// Integration test: write then read returns identical multi-line unicode text
#[test]
fn test_file_round_trip() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("round.mkc");
    let text = "# Größe ändern 🖼\nrose:\r\n-resize 50%\n";

    FilePersistence::write(&path, text).unwrap();
    assert_eq!(FilePersistence::read(&path).unwrap(), text);
}

/// Integration test: session remembers its document across restarts
#[test]
fn test_restart_restores_document() {
    let temp = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let store = MemorySettingsStore::new();
    let doc = work.path().join("art.mkc");

    {
        let mut canvas = Canvas::start_in(config("magick".into()), Box::new(store.clone()), temp.path());
        canvas.document_mut().set_text("logo:\n-swirl 180");
        assert!(canvas.document().is_dirty());
        canvas.document_mut().save_as(&doc).unwrap();
        canvas.shutdown();
    }

    let canvas = Canvas::start_in(config("magick".into()), Box::new(store.clone()), temp.path());
    assert_eq!(canvas.document().text(), "logo:\n-swirl 180");
    assert_eq!(canvas.document().path(), Some(doc.as_path()));
    assert!(!canvas.document().is_dirty());
}

/// Integration test: New on a dirty document forgets everything
#[test]
fn test_new_clears_dirty_document() {
    let temp = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let doc = work.path().join("art.mkc");
    fs::write(&doc, "rose:").unwrap();
    let store = MemorySettingsStore::with(Settings {
        working_directory: work.path().to_string_lossy().into_owned(),
        working_file: doc.to_string_lossy().into_owned(),
    });

    let mut canvas = Canvas::start_in(config("magick".into()), Box::new(store.clone()), temp.path());
    canvas.document_mut().set_text("rose:\n-flop");
    assert!(canvas.document().is_dirty());

    canvas.document_mut().new_document();

    assert!(!canvas.document().is_dirty());
    assert!(canvas.document().path().is_none());
    assert_eq!(store.current(), Settings::default());
    assert_eq!(fs::read_to_string(&doc).unwrap(), "rose:");
}

#[cfg(unix)]
mod execution {
    use super::*;
    use std::time::Duration;

    /// Integration test: a full run produces console output and an image, then cleans up
    #[tokio::test]
    async fn test_run_document_end_to_end() {
        let temp = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        let tool = install_tool(work.path(), FAKE_TOOL);
        let doc = work.path().join("art.mkc");
        fs::write(&doc, "# start from the built-in rose\nrose:\n\n  -resize 50%  \n").unwrap();

        let mut canvas = Canvas::start_in(config(tool), Box::new(MemorySettingsStore::new()), temp.path());
        canvas.document_mut().open(&doc).unwrap();

        let console = Arc::new(MemoryConsole::new());
        let display = Arc::new(MemoryDisplay::new());
        let result = canvas
            .spawn_run(console.clone(), display.clone())
            .await
            .unwrap()
            .expect("run should not be rejected");

        assert!(result.succeeded());
        assert!(result.stdout.contains("args: rose: -resize 50% "));
        let cwd = work.path().canonicalize().unwrap();
        assert!(result.stdout.contains(&format!("cwd: {}", cwd.display())));
        assert_eq!(console.blocks(), vec![result.stdout.clone()]);
        assert_eq!(display.last().unwrap().1, b"PNG");

        assert!(!canvas.is_executing());
        assert!(leftover_artifacts(temp.path()).is_empty());
        canvas.shutdown();
    }

    /// Integration test: a second run while the first is in flight is dropped
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_second_run_while_busy_is_dropped() {
        let temp = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        let tool = install_tool(work.path(), &format!("sleep 1\n{}", FAKE_TOOL));

        let mut canvas = Canvas::start_in(config(tool), Box::new(MemorySettingsStore::new()), temp.path());
        canvas.document_mut().set_text("rose:");

        let display = Arc::new(MemoryDisplay::new());
        let first = canvas.spawn_run(Arc::new(MemoryConsole::new()), display.clone());

        let mut waited = Duration::ZERO;
        while !canvas.is_executing() {
            assert!(waited < Duration::from_secs(5), "first run never started");
            tokio::time::sleep(Duration::from_millis(5)).await;
            waited += Duration::from_millis(5);
        }

        let console = Arc::new(MemoryConsole::new());
        let second = canvas.spawn_run(console.clone(), Arc::new(MemoryDisplay::new())).await.unwrap();
        assert!(second.is_none());
        assert!(console.blocks().is_empty());
        assert!(canvas.is_executing());

        let first = first.await.unwrap().unwrap();
        assert!(first.succeeded());
        assert!(display.last().is_some());
        assert!(!canvas.is_executing());
        assert!(leftover_artifacts(temp.path()).is_empty());
    }

    /// Integration test: a tool that fails leaves no image and no temp files
    #[test]
    fn test_failed_tool_run_cleans_up() {
        let temp = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        let tool = install_tool(work.path(), "echo 'magick: no decode delegate' >&2\nexit 1\n");

        let mut canvas = Canvas::start_in(config(tool), Box::new(MemorySettingsStore::new()), temp.path());
        canvas.document_mut().set_text("broken.xyz");

        let console = MemoryConsole::new();
        let display = MemoryDisplay::new();
        let result = canvas.run(&console, &display).unwrap();

        assert!(!result.succeeded());
        assert!(console.text().contains("no decode delegate"));
        assert!(display.last().is_none());
        assert!(!canvas.is_executing());
        assert!(leftover_artifacts(temp.path()).is_empty());
    }

    /// Integration test: show-script echoes the generated script first
    #[test]
    fn test_show_script_echo() {
        let temp = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        let tool = install_tool(work.path(), FAKE_TOOL);
        let verbose = Config {
            show_script: true,
            ..config(tool)
        };

        let mut canvas = Canvas::start_in(verbose, Box::new(MemorySettingsStore::new()), temp.path());
        canvas.document_mut().set_text("wizard:");

        let console = MemoryConsole::new();
        canvas.run(&console, &MemoryDisplay::new()).unwrap();

        let blocks = console.blocks();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].contains("wizard:"));
        assert!(blocks[0].contains(&canvas.image_path().display().to_string()));
    }
}
