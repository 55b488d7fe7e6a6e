//! Gated command catalogue
//!
//! Default required priority and aliases of every command that the
//! restriction table guards. Aliases share overrides with the canonical name.

use modbot_core::entities::normalize_command;

/// A command guarded by the restriction table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub default_priority: i32,
    pub aliases: &'static [&'static str],
}

impl CommandSpec {
    const fn new(name: &'static str, default_priority: i32) -> Self {
        Self {
            name,
            default_priority,
            aliases: &[],
        }
    }

    const fn with_aliases(
        name: &'static str,
        default_priority: i32,
        aliases: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            default_priority,
            aliases,
        }
    }

    /// Whether `name` (already normalized) is this command or one of its aliases
    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.aliases.contains(&name)
    }
}

pub const CATALOGUE: &[CommandSpec] = &[
    CommandSpec::new("mods", 0),
    CommandSpec::new("restrict", 0),
    CommandSpec::with_aliases("ban", 1, &["бан", "banan"]),
    CommandSpec::with_aliases("mute", 1, &["мут"]),
    CommandSpec::new("mediamute", 1),
    CommandSpec::with_aliases("kick", 1, &["кик"]),
    CommandSpec::with_aliases("warn", 1, &["варн"]),
    CommandSpec::new("unban", 1),
    CommandSpec::new("unmute", 1),
    CommandSpec::new("unmediamute", 1),
    CommandSpec::with_aliases("unwarn", 1, &["delwarn"]),
    CommandSpec::new("warnlist", 1),
    CommandSpec::new("banlist", 1),
    CommandSpec::new("mutelist", 1),
    CommandSpec::new("modlevel", 1),
    CommandSpec::new("award", 2),
    CommandSpec::new("delreward", 3),
    CommandSpec::new("rankinfo", 3),
    CommandSpec::new("modlevellist", 3),
    CommandSpec::new("lostmembers", 3),
    CommandSpec::new("cleanbanlist", 5),
    CommandSpec::new("cleanmutelist", 5),
    CommandSpec::new("cleanwarnlist", 5),
    CommandSpec::new("restrictcommand", 5),
    CommandSpec::new("addmodrank", 5),
    CommandSpec::new("delmodrank", 5),
    CommandSpec::new("modedit", 5),
];

/// Find the gated command for a raw name (`/Бан@bot` works)
pub fn lookup(raw: &str) -> Option<&'static CommandSpec> {
    let name = normalize_command(raw);
    CATALOGUE.iter().find(|spec| spec.matches(&name))
}

/// Canonical name for a raw command or alias; unknown names are normalized only
pub fn canonical(raw: &str) -> String {
    lookup(raw).map_or_else(|| normalize_command(raw), |spec| spec.name.to_string())
}
