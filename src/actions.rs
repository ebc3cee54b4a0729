use crate::error::Error;
use crate::store::SnippetStore;
use crate::types::SearchItem;
use std::path::Path;
use tracing::warn;

/// Side effects the front end provides: clipboard, editor, trash and
/// user-visible messages.
pub trait ActionHost {
    fn have_paste_support(&self) -> bool;

    fn set_clipboard_text(&self, text: &str);

    fn set_clipboard_text_and_paste(&self, text: &str);

    fn open(&self, path: &Path) -> std::io::Result<()>;

    /// Yes/no question to the user.
    fn question(&self, text: &str) -> bool;

    fn move_to_trash(&self, path: &Path) -> std::io::Result<()>;

    fn warning(&self, text: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionCommand {
    CopyAndPaste { id: String },
    Copy { id: String },
    Edit { id: String },
    Remove { id: String },
    Create { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub id: &'static str,
    pub label: &'static str,
    pub command: ActionCommand,
}

impl Action {
    fn new(id: &'static str, label: &'static str, command: ActionCommand) -> Self {
        Self { id, label, command }
    }

    /// Runs the action against the live directory. Failures are reported to
    /// the host, never returned.
    pub fn invoke(&self, store: &SnippetStore, host: &dyn ActionHost) {
        match &self.command {
            ActionCommand::CopyAndPaste { id } => {
                if let Some(text) = read_for_action(store, id, host) {
                    host.set_clipboard_text_and_paste(&text);
                }
            }
            ActionCommand::Copy { id } => {
                if let Some(text) = read_for_action(store, id, host) {
                    host.set_clipboard_text(&text);
                }
            }
            ActionCommand::Edit { id } => open_for_action(&store.path_for(id), host),
            ActionCommand::Remove { id } => remove_snippet(store, &store.file_name_for(id), host),
            ActionCommand::Create { name } => create_snippet(store, name, "", host),
        }
    }
}

/// Actions of a result, in display order. Resolved per render so paste
/// support reflects the current environment.
pub fn actions_for(item: &SearchItem, host: &dyn ActionHost) -> Vec<Action> {
    match item {
        SearchItem::Snippet(record) => {
            let id = record.id().to_string();
            let mut actions = Vec::with_capacity(4);

            if host.have_paste_support() {
                actions.push(Action::new(
                    "cp",
                    "Copy and paste",
                    ActionCommand::CopyAndPaste { id: id.clone() },
                ));
            }
            actions.push(Action::new("c", "Copy", ActionCommand::Copy { id: id.clone() }));
            actions.push(Action::new("o", "Edit", ActionCommand::Edit { id: id.clone() }));
            actions.push(Action::new("r", "Remove", ActionCommand::Remove { id }));

            actions
        }
        SearchItem::Create(request) => vec![Action::new(
            "add",
            "Create",
            ActionCommand::Create {
                name: request.name.clone(),
            },
        )],
    }
}

fn read_for_action(store: &SnippetStore, id: &str, host: &dyn ActionHost) -> Option<String> {
    match store.read(id) {
        Ok(text) => Some(text),
        Err(e) => {
            let msg = format!(
                "Failed to read snippet file '{}'. Error: {}",
                store.path_for(id).display(),
                e
            );
            warn!("{}", msg);
            host.warning(&msg);
            None
        }
    }
}

fn open_for_action(path: &Path, host: &dyn ActionHost) {
    if !path.exists() {
        let msg = format!("Snippet file '{}' does not exist.", path.display());
        warn!("{}", msg);
        host.warning(&msg);
        return;
    }

    if let Err(e) = host.open(path) {
        let msg = format!("Failed to open '{}'. Error: {}", path.display(), e);
        warn!("{}", msg);
        host.warning(&msg);
    }
}

/// Asks before moving `file_name` to the trash.
pub fn remove_snippet(store: &SnippetStore, file_name: &str, host: &dyn ActionHost) {
    let Some(path) = store.existing_file(file_name) else {
        warn!(
            "Path to remove does not exist: {}",
            store.directory().join(file_name).display()
        );
        host.warning(&format!("Snippet file '{}' does not exist.", file_name));
        return;
    };

    if host.question(&format!("Move snippet '{}' to trash?", file_name)) {
        if let Err(e) = host.move_to_trash(&path) {
            warn!("Failed to move {} to trash: {}", path.display(), e);
            host.warning("Failed to move snippet file to trash.");
        }
    }
}

/// Creates a snippet holding `text`. Without text the new file is opened for
/// editing instead.
pub fn create_snippet(store: &SnippetStore, name: &str, text: &str, host: &dyn ActionHost) {
    match store.create(name, text) {
        Ok(path) if text.is_empty() => open_for_action(&path, host),
        Ok(_) => {}
        Err(Error::Io { path, source }) => {
            warn!("Failed creating {}: {}", path.display(), source);
            host.warning(&format!(
                "Failed creating the snippet file '{}'.",
                path.display()
            ));
        }
        Err(e) => host.warning(&e.to_string()),
    }
}
