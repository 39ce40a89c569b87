use colored::Colorize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

static COLOR_OUTPUT: AtomicBool = AtomicBool::new(true);

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Section,
}

/// Globally enables or disables colored output (set from the loaded
/// preferences before the shell starts).
pub fn set_color_output(enabled: bool) {
    COLOR_OUTPUT.store(enabled, Ordering::Relaxed);
}

fn color_enabled() -> bool {
    COLOR_OUTPUT.load(Ordering::Relaxed)
}

fn apply_style(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    let base = match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()),
        MessageKind::Info => text,
        MessageKind::Success => format!("[+] {}", text),
        MessageKind::Warning => format!("[!] {}", text),
        MessageKind::Error => format!("[x] {}", text),
    };

    if !color_enabled() {
        return base;
    }

    match kind {
        MessageKind::Success => base.bright_green().to_string(),
        MessageKind::Warning => base.bright_yellow().to_string(),
        MessageKind::Error => base.bright_red().to_string(),
        MessageKind::Section => base.bold().to_string(),
        MessageKind::Info => base,
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = apply_style(kind, message);
    match kind {
        MessageKind::Section => println!("\n{}", formatted),
        _ => println!("{}", formatted),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}
