//! Terminal color selection
//!
//! `--color always|never` wins outright. In `auto` mode the usual
//! environment conventions apply, in this order:
//!
//! - `NO_COLOR` set to anything disables colors (<https://no-color.org/>)
//! - `CLICOLOR_FORCE` set to a non-zero value forces colors
//! - `CLICOLOR=0` disables colors
//! - otherwise colors follow whether stdout is a terminal

use colored::control;
use std::io::IsTerminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// Decide whether to colorize given an environment lookup and TTY status
pub fn should_colorize<F>(mode: ColorMode, var: F, is_tty: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match mode {
        ColorMode::Always => return true,
        ColorMode::Never => return false,
        ColorMode::Auto => {}
    }

    if var("NO_COLOR").is_some() {
        return false;
    }
    if var("CLICOLOR_FORCE").is_some_and(|v| v != "0") {
        return true;
    }
    if var("CLICOLOR").is_some_and(|v| v == "0") {
        return false;
    }

    is_tty
}

/// Configure `colored` for the whole process
pub fn init_colors(mode: ColorMode) {
    let enabled = should_colorize(
        mode,
        |key| std::env::var(key).ok(),
        std::io::stdout().is_terminal(),
    );
    control::set_override(enabled);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_explicit_mode_wins() {
        assert!(should_colorize(ColorMode::Always, env(&[("NO_COLOR", "1")]), false));
        assert!(!should_colorize(ColorMode::Never, env(&[("CLICOLOR_FORCE", "1")]), true));
    }

    #[test]
    fn test_no_color_beats_force() {
        let vars = env(&[("NO_COLOR", ""), ("CLICOLOR_FORCE", "1")]);
        assert!(!should_colorize(ColorMode::Auto, vars, true));
    }

    #[test]
    fn test_clicolor_conventions() {
        assert!(should_colorize(ColorMode::Auto, env(&[("CLICOLOR_FORCE", "1")]), false));
        assert!(!should_colorize(ColorMode::Auto, env(&[("CLICOLOR_FORCE", "0")]), false));
        assert!(!should_colorize(ColorMode::Auto, env(&[("CLICOLOR", "0")]), true));
    }

    #[test]
    fn test_auto_follows_tty() {
        assert!(should_colorize(ColorMode::Auto, env(&[]), true));
        assert!(!should_colorize(ColorMode::Auto, env(&[]), false));
    }
}
