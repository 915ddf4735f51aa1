use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn banner(title: &str, subtitle: &str) {
    println!();
    println!("  {}", title);
    println!("  {}", subtitle.style(theme().dim.clone()));
    println!();
}

pub fn header(text: &str) {
    println!("{} {}", Icons::ROCKET, text.style(theme().header.clone()));
}

pub fn status(icon: &str, label: &str, value: &str) {
    println!("{} {}: {}", icon, label.style(theme().dim.clone()), value);
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

/// One line per file that produced an error document
pub fn file_failed(path: &str, reason: &str) {
    println!(
        "{} {} {}",
        Icons::CROSS.style(theme().error.clone()),
        path,
        reason.style(theme().muted.clone())
    );
}
