//! Keyboard shortcuts of the sequence editor.
//!
//! Single source of truth for the help overlay and the footer hints. Key
//! handling itself lives in [`crate::ui::editor`].

use crossterm::event::KeyCode;

#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: KeyCode,
    /// Alternative key (arrow key, Delete, ...)
    pub alt_key: Option<KeyCode>,
    /// Requires Ctrl
    pub ctrl: bool,
    pub description: &'static str,
    pub category: ShortcutCategory,
    pub context: ShortcutContext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutCategory {
    General,
    Navigation,
    Steps,
    Editing,
}

/// Where a shortcut is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutContext {
    /// Step list has focus
    Canvas,
    /// Field list of the selected step has focus
    Inspector,
    /// A text field is being edited
    Input,
    /// Choosing senders, templates, merge tags or CC entries
    Picker,
}

impl ShortcutCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            ShortcutCategory::General => "General",
            ShortcutCategory::Navigation => "Navigation",
            ShortcutCategory::Steps => "Steps",
            ShortcutCategory::Editing => "Editing",
        }
    }

    pub fn all() -> &'static [ShortcutCategory] {
        &[
            ShortcutCategory::General,
            ShortcutCategory::Navigation,
            ShortcutCategory::Steps,
            ShortcutCategory::Editing,
        ]
    }
}

impl ShortcutContext {
    pub fn display_name(&self) -> &'static str {
        match self {
            ShortcutContext::Canvas => "Canvas",
            ShortcutContext::Inspector => "Inspector",
            ShortcutContext::Input => "Text input",
            ShortcutContext::Picker => "Picker",
        }
    }

    pub fn all() -> &'static [ShortcutContext] {
        &[
            ShortcutContext::Canvas,
            ShortcutContext::Inspector,
            ShortcutContext::Input,
            ShortcutContext::Picker,
        ]
    }
}

impl Shortcut {
    /// e.g. "q", "j/↓", "Ctrl+s"
    pub fn key_display(&self) -> String {
        let primary = if self.ctrl {
            format!("Ctrl+{}", format_keycode(&self.key))
        } else {
            format_keycode(&self.key)
        };
        match &self.alt_key {
            Some(alt) => format!("{}/{}", primary, format_keycode(alt)),
            None => primary,
        }
    }

    /// Left-padded to 8 columns for the help overlay
    pub fn key_display_padded(&self) -> String {
        format!("{:<8}", self.key_display())
    }
}

fn format_keycode(key: &KeyCode) -> String {
    match key {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Delete => "Del".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        _ => format!("{:?}", key),
    }
}

macro_rules! shortcut {
    ($ctx:ident, $cat:ident, $key:expr, $alt:expr, $ctrl:expr, $desc:expr) => {
        Shortcut {
            key: $key,
            alt_key: $alt,
            ctrl: $ctrl,
            description: $desc,
            category: ShortcutCategory::$cat,
            context: ShortcutContext::$ctx,
        }
    };
}

pub static SHORTCUTS: &[Shortcut] = &[
    // Canvas
    shortcut!(Canvas, General, KeyCode::Char('q'), None, false, "Quit (twice with unsaved changes)"),
    shortcut!(Canvas, General, KeyCode::Char('?'), None, false, "Toggle help"),
    shortcut!(Canvas, General, KeyCode::Char('s'), None, true, "Save sequence"),
    shortcut!(Canvas, General, KeyCode::Char('A'), None, false, "Toggle auto-save"),
    shortcut!(Canvas, General, KeyCode::Char('n'), None, false, "Rename new sequence"),
    shortcut!(Canvas, Navigation, KeyCode::Char('j'), Some(KeyCode::Down), false, "Next step"),
    shortcut!(Canvas, Navigation, KeyCode::Char('k'), Some(KeyCode::Up), false, "Previous step"),
    shortcut!(Canvas, Navigation, KeyCode::Enter, Some(KeyCode::Tab), false, "Edit selected step"),
    shortcut!(Canvas, Navigation, KeyCode::Char('+'), None, false, "Zoom in"),
    shortcut!(Canvas, Navigation, KeyCode::Char('-'), None, false, "Zoom out"),
    shortcut!(Canvas, Navigation, KeyCode::Char('0'), None, false, "Reset zoom"),
    shortcut!(Canvas, Steps, KeyCode::Char('e'), None, false, "Add email after selection"),
    shortcut!(Canvas, Steps, KeyCode::Char('w'), None, false, "Add wait after selection"),
    shortcut!(Canvas, Steps, KeyCode::Char('m'), None, false, "Add manual task after selection"),
    shortcut!(Canvas, Steps, KeyCode::Char('c'), None, false, "Add condition after selection"),
    shortcut!(Canvas, Steps, KeyCode::Char('J'), None, false, "Move step down"),
    shortcut!(Canvas, Steps, KeyCode::Char('K'), None, false, "Move step up"),
    shortcut!(Canvas, Steps, KeyCode::Char('d'), Some(KeyCode::Delete), false, "Delete step"),
    // Inspector
    shortcut!(Inspector, Navigation, KeyCode::Char('j'), Some(KeyCode::Down), false, "Next field"),
    shortcut!(Inspector, Navigation, KeyCode::Char('k'), Some(KeyCode::Up), false, "Previous field"),
    shortcut!(Inspector, Navigation, KeyCode::Esc, Some(KeyCode::Tab), false, "Back to canvas"),
    shortcut!(Inspector, Editing, KeyCode::Enter, Some(KeyCode::Char(' ')), false, "Edit or toggle field"),
    shortcut!(Inspector, General, KeyCode::Char('s'), None, true, "Save sequence"),
    // Input
    shortcut!(Input, Editing, KeyCode::Enter, None, false, "Apply (single-line fields)"),
    shortcut!(Input, Editing, KeyCode::Char('s'), None, true, "Apply"),
    shortcut!(Input, Editing, KeyCode::Esc, None, false, "Discard"),
    // Picker
    shortcut!(Picker, Navigation, KeyCode::Char('j'), Some(KeyCode::Down), false, "Next option"),
    shortcut!(Picker, Navigation, KeyCode::Char('k'), Some(KeyCode::Up), false, "Previous option"),
    shortcut!(Picker, Editing, KeyCode::Enter, Some(KeyCode::Char(' ')), false, "Choose option"),
    shortcut!(Picker, Navigation, KeyCode::Esc, None, false, "Close"),
];

pub fn shortcuts_for_context(context: ShortcutContext) -> impl Iterator<Item = &'static Shortcut> {
    SHORTCUTS.iter().filter(move |s| s.context == context)
}

pub type GroupedByCategory = Vec<(ShortcutCategory, Vec<&'static Shortcut>)>;

pub fn shortcuts_by_category_for_context(context: ShortcutContext) -> GroupedByCategory {
    let mut result = Vec::new();
    for category in ShortcutCategory::all() {
        let shortcuts: Vec<&Shortcut> = shortcuts_for_context(context)
            .filter(|s| s.category == *category)
            .collect();
        if !shortcuts.is_empty() {
            result.push((*category, shortcuts));
        }
    }
    result
}

/// One-line hint for the footer, e.g. `q Quit  ? Help`
pub fn footer_hint(context: ShortcutContext, limit: usize) -> String {
    shortcuts_for_context(context)
        .take(limit)
        .map(|s| format!("{} {}", s.key_display(), s.description))
        .collect::<Vec<_>>()
        .join("  ")
}
