// cvar.rs — named configuration variables
//
// Values are kept both as the raw string and as a parsed float. A config
// file is a list of `set`/`seta` lines; `seta` marks the variable archived
// so `write_variables` saves it back out.

use log::{debug, warn};

use std::collections::HashMap;

pub const CVAR_ZERO: i32 = 0;
/// Saved by `write_variables`.
pub const CVAR_ARCHIVE: i32 = 1;
/// Only `force_set` can change it.
pub const CVAR_NOSET: i32 = 8;

/// A configuration variable.
#[derive(Clone, Debug)]
pub struct Cvar {
    pub name: String,
    pub string: String,
    pub flags: i32,
    pub modified: bool,
    pub value: f32,
}

fn parse_value(s: &str) -> f32 {
    s.trim().parse::<f32>().unwrap_or(0.0)
}

#[derive(Default)]
pub struct CvarContext {
    pub cvar_vars: Vec<Cvar>,
    cvar_index: HashMap<String, usize>,
}

impl CvarContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_var_index(&self, name: &str) -> Option<usize> {
        self.cvar_index.get(name).copied()
    }

    pub fn find_var(&self, name: &str) -> Option<&Cvar> {
        self.cvar_index.get(name).map(|&idx| &self.cvar_vars[idx])
    }

    /// Float value of a cvar, 0 if unknown.
    pub fn variable_value(&self, name: &str) -> f32 {
        self.find_var(name).map_or(0.0, |var| var.value)
    }

    /// String value of a cvar, "" if unknown.
    pub fn variable_string(&self, name: &str) -> &str {
        self.find_var(name).map_or("", |var| &var.string)
    }

    /// Get or create a cvar. An existing cvar keeps its value but gains
    /// the extra flags.
    pub fn get(&mut self, name: &str, value: Option<&str>, flags: i32) -> Option<usize> {
        if let Some(&idx) = self.cvar_index.get(name) {
            self.cvar_vars[idx].flags |= flags;
            return Some(idx);
        }

        let value = value?;
        let idx = self.cvar_vars.len();
        self.cvar_vars.push(Cvar {
            name: name.to_string(),
            string: value.to_string(),
            flags,
            modified: true,
            value: parse_value(value),
        });
        self.cvar_index.insert(name.to_string(), idx);
        Some(idx)
    }

    fn set2(&mut self, name: &str, value: &str, force: bool) -> Option<usize> {
        let idx = match self.find_var_index(name) {
            Some(idx) => idx,
            None => return self.get(name, Some(value), 0),
        };

        let var = &mut self.cvar_vars[idx];
        if !force && var.flags & CVAR_NOSET != 0 {
            warn!("{} is write protected", name);
            return Some(idx);
        }

        if value == var.string {
            return Some(idx);
        }

        debug!("cvar {} = \"{}\"", name, value);
        var.modified = true;
        var.string = value.to_string();
        var.value = parse_value(value);
        Some(idx)
    }

    /// Set a cvar value, refusing write-protected ones.
    pub fn set(&mut self, name: &str, value: &str) -> Option<usize> {
        self.set2(name, value, false)
    }

    /// Set a cvar value even when write-protected.
    pub fn force_set(&mut self, name: &str, value: &str) -> Option<usize> {
        self.set2(name, value, true)
    }

    pub fn set_value(&mut self, name: &str, value: f32) {
        let val_str = if value == (value as i32) as f32 {
            format!("{}", value as i32)
        } else {
            format!("{}", value)
        };
        self.set(name, &val_str);
    }

    /// Return and clear the modified flag.
    pub fn take_modified(&mut self, name: &str) -> bool {
        match self.find_var_index(name) {
            Some(idx) => std::mem::replace(&mut self.cvar_vars[idx].modified, false),
            None => false,
        }
    }

    /// Apply `set name value` and `seta name value` lines. Blank lines and
    /// `//` comments are skipped; anything else is logged and ignored.
    pub fn exec_config(&mut self, text: &str) {
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }

            let mut parts = line.splitn(3, char::is_whitespace);
            let cmd = parts.next().unwrap_or("");
            let name = parts.next().unwrap_or("");
            let value = parts.next().map(|v| v.trim().trim_matches('"'));

            let archive = match cmd {
                "set" => false,
                "seta" => true,
                _ => {
                    warn!("config line {}: unknown command \"{}\"", lineno + 1, cmd);
                    continue;
                }
            };
            let Some(value) = value.filter(|_| !name.is_empty()) else {
                warn!("config line {}: usage: {} <name> <value>", lineno + 1, cmd);
                continue;
            };

            self.set(name, value);
            if archive {
                self.get(name, None, CVAR_ARCHIVE);
            }
        }
    }

    /// Write all archived cvars as `set` lines.
    pub fn write_variables(&self, writer: &mut dyn std::io::Write) -> std::io::Result<()> {
        for var in &self.cvar_vars {
            if var.flags & CVAR_ARCHIVE != 0 {
                writeln!(writer, "set {} \"{}\"", var.name, var.string)?;
            }
        }
        Ok(())
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cvar_get_and_find() {
        let mut ctx = CvarContext::new();
        ctx.get("test_var", Some("42"), 0);
        assert_eq!(ctx.variable_value("test_var"), 42.0);
        assert_eq!(ctx.variable_string("test_var"), "42");
    }

    #[test]
    fn test_cvar_set() {
        let mut ctx = CvarContext::new();
        ctx.get("test_var", Some("10"), 0);
        ctx.set("test_var", "20");
        assert_eq!(ctx.variable_value("test_var"), 20.0);
    }

    #[test]
    fn test_cvar_noset() {
        let mut ctx = CvarContext::new();
        ctx.get("test_var", Some("10"), CVAR_NOSET);
        ctx.set("test_var", "20");
        assert_eq!(ctx.variable_value("test_var"), 10.0);
        ctx.force_set("test_var", "20");
        assert_eq!(ctx.variable_value("test_var"), 20.0);
    }

    #[test]
    fn test_cvar_set_value_formats_integers() {
        let mut ctx = CvarContext::new();
        ctx.set_value("r_fov", 90.0);
        assert_eq!(ctx.variable_string("r_fov"), "90");
        ctx.set_value("ui_text_scale", 1.5);
        assert_eq!(ctx.variable_string("ui_text_scale"), "1.5");
    }

    #[test]
    fn test_cvar_get_creates_once() {
        let mut ctx = CvarContext::new();
        ctx.get("test", Some("1"), 0);
        ctx.get("test", Some("2"), CVAR_ARCHIVE);
        assert_eq!(ctx.variable_string("test"), "1");
        assert_eq!(ctx.find_var("test").map(|v| v.flags), Some(CVAR_ARCHIVE));
    }

    #[test]
    fn test_cvar_not_found() {
        let mut ctx = CvarContext::new();
        assert_eq!(ctx.variable_value("nonexistent"), 0.0);
        assert_eq!(ctx.variable_string("nonexistent"), "");
        assert!(!ctx.take_modified("nonexistent"));
    }

    #[test]
    fn test_cvar_take_modified() {
        let mut ctx = CvarContext::new();
        ctx.get("r_fov", Some("80"), 0);
        assert!(ctx.take_modified("r_fov"));
        assert!(!ctx.take_modified("r_fov"));
        ctx.set("r_fov", "80");
        assert!(!ctx.take_modified("r_fov"));
        ctx.set("r_fov", "65");
        assert!(ctx.take_modified("r_fov"));
    }

    #[test]
    fn test_exec_config_lines() {
        let mut ctx = CvarContext::new();
        ctx.exec_config(
            "// comment\n\nset r_fov 65\nseta r_draw_distance \"30\"\nbind x y\nset lonely\n",
        );
        assert_eq!(ctx.variable_value("r_fov"), 65.0);
        assert_eq!(ctx.variable_value("r_draw_distance"), 30.0);
        assert_eq!(ctx.find_var("r_fov").map(|v| v.flags), Some(CVAR_ZERO));
        assert_eq!(ctx.find_var("r_draw_distance").map(|v| v.flags), Some(CVAR_ARCHIVE));
        assert!(ctx.find_var("lonely").is_none());
        assert!(ctx.find_var("x").is_none());
    }

    #[test]
    fn test_write_variables_only_archived() {
        let mut ctx = CvarContext::new();
        ctx.get("r_round_shadow", Some("1"), CVAR_ARCHIVE);
        ctx.get("scratch", Some("5"), 0);
        let mut out = Vec::new();
        ctx.write_variables(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "set r_round_shadow \"1\"\n");
    }
}
