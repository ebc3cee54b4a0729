use clap::Parser;
use snippets_index::log::init_tracing;
use snippets_index::{ActionHost, SearchResult, SnippetManager, SnippetsConfig};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Interactive snippet search over a watched directory. Every input line is a
/// query; `!<n> <action>` runs an action on the n-th result of the last query.
#[derive(Debug, Parser)]
#[command(name = "snippets_watch")]
struct Args {
    /// Snippet directory, defaults to `<config dir>/snippets`.
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Write logs to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[arg(long, default_value = "info")]
    log_level: String,

    /// Launcher trigger stripped from the start of each query.
    #[arg(long, default_value = "snip ")]
    trigger: String,

    #[arg(long, default_value_t = 20)]
    max_results: usize,
}

/// Terminal stand-in for the launcher: no clipboard, so copies go to stdout.
struct TerminalHost {
    trash_dir: PathBuf,
    answers: Arc<Mutex<mpsc::Receiver<String>>>,
}

impl ActionHost for TerminalHost {
    fn have_paste_support(&self) -> bool {
        false
    }

    fn set_clipboard_text(&self, text: &str) {
        println!("----- copied -----\n{text}\n------------------");
    }

    fn set_clipboard_text_and_paste(&self, text: &str) {
        self.set_clipboard_text(text);
    }

    fn open(&self, path: &Path) -> io::Result<()> {
        let status = match std::env::var("EDITOR") {
            Ok(editor) if !editor.is_empty() => Command::new(editor).arg(path).status()?,
            _ => Command::new("xdg-open").arg(path).status()?,
        };
        if status.success() {
            Ok(())
        } else {
            Err(io::Error::new(io::ErrorKind::Other, format!("editor exited with {status}")))
        }
    }

    fn question(&self, text: &str) -> bool {
        print!("{text} [y/N] ");
        let _ = io::stdout().flush();
        let Ok(answers) = self.answers.lock() else {
            return false;
        };
        answers
            .recv()
            .map(|answer| matches!(answer.trim(), "y" | "Y" | "yes"))
            .unwrap_or(false)
    }

    fn move_to_trash(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(&self.trash_dir)?;
        let file_name = path
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no file name"))?;
        std::fs::rename(path, self.trash_dir.join(file_name))
    }

    fn warning(&self, text: &str) {
        eprintln!("warning: {text}");
    }
}

fn print_results(result: &SearchResult) {
    for (idx, (item, score)) in result.iter().enumerate() {
        println!(
            "{:>3}  {:<24} {:>6}  {}",
            idx,
            item.text(),
            score.total,
            item.subtext()
        );
    }
    println!(
        "-- {} shown, {} matched, {} snippets",
        result.len(),
        result.total_matched,
        result.total_snippets
    );
}

fn run_action(
    manager: &SnippetManager,
    host: &TerminalHost,
    last: &SearchResult,
    command: &str,
) {
    let mut parts = command.split_whitespace();
    let Some(Ok(idx)) = parts.next().map(str::parse::<usize>) else {
        eprintln!("usage: !<result number> <action id>");
        return;
    };
    let Some(item) = last.items.get(idx) else {
        eprintln!("no result {idx}");
        return;
    };

    let actions = manager.actions(item, host);
    let Some(action_id) = parts.next() else {
        for action in &actions {
            println!("  {:<4} {}", action.id, action.label);
        }
        return;
    };

    match actions.iter().find(|action| action.id == action_id) {
        Some(action) => manager.invoke(action, host),
        None => eprintln!("unknown action '{action_id}'"),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.log_file.as_deref(), &args.log_level)?;

    let mut config = SnippetsConfig::default()
        .with_trigger(args.trigger)
        .with_max_results(args.max_results);
    if let Some(dir) = args.dir {
        config = config.with_directory(dir);
    }
    let trash_dir = config.directory.join(".trash");

    let running = Arc::new(AtomicBool::new(true));
    ctrlc::set_handler({
        let running = Arc::clone(&running);
        move || {
            running.store(false, Ordering::SeqCst);
        }
    })?;

    let manager = SnippetManager::new(config)?;
    println!(
        "Watching {} ({}). Type a query, '!<n> <action>' to act, Ctrl-C to quit.",
        manager.config().directory.display(),
        manager.synopsis("")
    );

    let (line_tx, line_rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    // Answers to confirmation questions come from the same stdin stream.
    let lines = Arc::new(Mutex::new(line_rx));
    let host = TerminalHost {
        trash_dir,
        answers: Arc::clone(&lines),
    };

    let mut last = SearchResult::default();
    while running.load(Ordering::SeqCst) {
        let next = match lines.lock() {
            Ok(rx) => rx.recv_timeout(Duration::from_millis(200)),
            Err(_) => break,
        };

        let line = match next {
            Ok(line) => line,
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if let Some(command) = line.strip_prefix('!') {
            run_action(&manager, &host, &last, command);
            continue;
        }

        if manager.is_scan_active() {
            println!("(indexing in progress, results may be stale)");
        }
        last = manager.handle_trigger_query(&line);
        let text = line.strip_prefix(manager.config().trigger.as_str()).unwrap_or(&line);
        println!("{}", manager.synopsis(text));
        print_results(&last);
    }

    println!("Shutting down");
    Ok(())
}
