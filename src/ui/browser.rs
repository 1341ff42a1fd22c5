use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserEntry {
    pub name: String,
    pub size: u64,
    pub is_dir: bool,
}

impl BrowserEntry {
    pub fn format_size(&self) -> String {
        if self.is_dir {
            return "<DIR>".to_string();
        }
        humansize::format_size(self.size, humansize::BINARY)
    }
}

/// What a key press did to the browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserAction {
    Stay,
    Chosen(PathBuf),
    Cancelled,
}

/// Local file picker. Enter on a directory descends, Enter on a file chooses
/// it, Backspace goes up, Esc cancels the selection.
pub struct FileBrowser {
    pub dir: PathBuf,
    pub entries: Vec<BrowserEntry>,
    pub state: ListState,
    pub error: Option<String>,
    show_hidden: bool,
}

impl FileBrowser {
    pub fn new(dir: PathBuf, show_hidden: bool) -> Self {
        let mut browser = Self {
            dir,
            entries: Vec::new(),
            state: ListState::default(),
            error: None,
            show_hidden,
        };
        browser.refresh();
        browser
    }

    pub fn refresh(&mut self) {
        match list_dir(&self.dir, self.show_hidden) {
            Ok(entries) => {
                self.entries = entries;
                self.error = None;
            }
            Err(e) => {
                tracing::warn!(dir = %self.dir.display(), error = %e, "cannot list directory");
                self.error = Some(format!("{:#}", e));
                self.entries.clear();
            }
        }
        self.state
            .select(if self.entries.is_empty() { None } else { Some(0) });
    }

    pub fn select_next(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.entries.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => self.entries.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn selected_entry(&self) -> Option<&BrowserEntry> {
        self.state.selected().and_then(|i| self.entries.get(i))
    }

    /// Descend into the selected directory, or return the selected file
    pub fn enter(&mut self) -> Option<PathBuf> {
        let entry = self.selected_entry()?.clone();
        let path = self.dir.join(&entry.name);
        if entry.is_dir {
            self.dir = path;
            self.refresh();
            None
        } else {
            Some(path)
        }
    }

    pub fn up(&mut self) {
        let Some(parent) = self.dir.parent() else {
            return;
        };
        let previous = self
            .dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string());
        self.dir = parent.to_path_buf();
        self.refresh();

        // Keep the cursor on the directory we just left
        if let Some(name) = previous {
            if let Some(i) = self.entries.iter().position(|e| e.name == name) {
                self.state.select(Some(i));
            }
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> BrowserAction {
        match code {
            KeyCode::Esc => BrowserAction::Cancelled,
            KeyCode::Up => {
                self.select_previous();
                BrowserAction::Stay
            }
            KeyCode::Down => {
                self.select_next();
                BrowserAction::Stay
            }
            KeyCode::Backspace | KeyCode::Left => {
                self.up();
                BrowserAction::Stay
            }
            KeyCode::Enter | KeyCode::Right => match self.enter() {
                Some(path) => BrowserAction::Chosen(path),
                None => BrowserAction::Stay,
            },
            _ => BrowserAction::Stay,
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, title: &str) {
        let inner_width = area.width.saturating_sub(2) as usize;
        let icon_width = 3;
        let size_width = 10;
        let name_width = inner_width.saturating_sub(icon_width + size_width + 1);

        let items: Vec<ListItem> = match &self.error {
            Some(err) => vec![ListItem::new(Line::from(Span::styled(
                err.clone(),
                Style::default().fg(Color::Red),
            )))],
            None => self
                .entries
                .iter()
                .map(|entry| {
                    let icon = if entry.is_dir { "📁" } else { "📄" };
                    let name = super::components::truncate_end(&entry.name, name_width);
                    ListItem::new(Line::from(vec![
                        Span::raw(format!("{} ", icon)),
                        Span::raw(format!("{:<width$}", name, width = name_width)),
                        Span::styled(
                            format!("{:>10}", entry.format_size()),
                            Style::default().fg(Color::DarkGray),
                        ),
                    ]))
                })
                .collect(),
        };

        let dir = self.dir.display().to_string();
        let title = format!(
            " {} ─ {} ",
            title,
            super::components::truncate_path(&dir, inner_width.saturating_sub(title.len() + 6))
        );

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            );

        f.render_stateful_widget(list, area, &mut self.state);
    }
}

/// List a directory: directories first, then files, each sorted by name
pub fn list_dir(path: &Path, show_hidden: bool) -> Result<Vec<BrowserEntry>> {
    let mut entries = Vec::new();

    let read_dir = fs::read_dir(path)
        .with_context(|| format!("Failed to read directory: {}", path.display()))?;

    for entry in read_dir {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if !show_hidden && name.starts_with('.') {
            continue;
        }
        // Follows symlinks; dangling links are skipped
        let Ok(metadata) = fs::metadata(entry.path()) else {
            continue;
        };
        entries.push(BrowserEntry {
            name,
            size: metadata.len(),
            is_dir: metadata.is_dir(),
        });
    }

    entries.sort_by(|a, b| match (a.is_dir, b.is_dir) {
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    });

    Ok(entries)
}
