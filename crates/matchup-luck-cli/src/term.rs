// Colored status lines on stdout.

use crossterm::style::Stylize;

pub fn info(msg: &str) {
    println!("{}", format!("[i] {msg}").blue());
}

pub fn success(msg: &str) {
    println!("{}", format!("[✓] {msg}").green());
}
