//! Staff commands
//!
//! Rank catalogue maintenance (`/addmodrank`, `/delmodrank`, `/modedit`,
//! `/rankinfo`), level assignment (`/modlevel`, `/modlevellist`), command
//! restrictions (`/restrictcommand`) and the member listings `/mods` and
//! `/restrict`.

use std::collections::{BTreeMap, HashMap, HashSet};

use modbot_core::entities::ModeratorRank;
use modbot_core::value_objects::{ChatId, UserId};
use modbot_core::DomainError;
use tracing::{info, instrument, warn};
use validator::Validate;

use super::args::ArgParser;
use super::commands;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::format::{display_label, escape_html, user_link};
use super::invocation::Invocation;
use super::level::LevelResolver;
use super::permission::PermissionChecker;
use super::rank::{sort_ranks, RankRegistry};
use super::restriction::CommandRestrictionTable;
use crate::dto::{AddRankRequest, RenameRankRequest};

const MAX_LISTED_LEVEL: i32 = 5;

/// `mention=on|off` among the arguments. `None` when the value is not a
/// boolean; `default` when the argument is absent.
pub fn parse_mention_flag<'t>(args: impl IntoIterator<Item = &'t str>, default: bool) -> Option<bool> {
    for arg in args {
        let Some((key, value)) = arg.split_once('=') else {
            continue;
        };
        if !key.eq_ignore_ascii_case("mention") {
            continue;
        }
        return match value.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        };
    }
    Some(default)
}

/// `<name words...> <priority>`: the last token is the priority
pub fn split_rank_args(args: &str) -> Option<(String, i32)> {
    let (name, priority) = args.trim().rsplit_once(char::is_whitespace)?;
    let priority = priority.parse().ok()?;
    Some((name.trim().to_string(), priority))
}

/// `/mods` group heading: `Mod Level N` for an untouched default rank,
/// else the rank name with its level
fn group_title(rank: &ModeratorRank) -> String {
    if rank.name == ModeratorRank::default_name(rank.level) {
        format!("Mod Level {}", rank.level)
    } else {
        format!("{} (level {})", escape_html(&rank.name), rank.level)
    }
}

/// One listed member
#[derive(Debug, Clone, PartialEq, Eq)]
struct StaffEntry {
    level: i32,
    label: String,
    is_admin: bool,
}

impl StaffEntry {
    fn render(&self, user_id: UserId, mention: bool) -> String {
        let display = if mention {
            user_link(user_id, &self.label)
        } else {
            escape_html(&self.label)
        };
        if self.is_admin {
            format!("🛡 {display}")
        } else {
            display
        }
    }
}

pub struct StaffService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> StaffService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    async fn gate(&self, inv: &Invocation, command: &str) -> ServiceResult<()> {
        inv.require_group()?;
        PermissionChecker::new(self.ctx)
            .require_command(inv.chat_id, inv.actor_id, command)
            .await?;
        Ok(())
    }

    fn usage(&self, inv: &Invocation, key: &str, default: &str) -> ServiceError {
        ServiceError::validation(self.ctx.tr(key, inv.lang(), default, &[]))
    }

    // =========================================================================
    // Levels
    // =========================================================================

    /// `/modlevel <rank_id> [@user|id]`, or as a reply
    #[instrument(skip(self, inv, args), fields(chat_id = %inv.chat_id, user_id = %inv.actor_id))]
    pub async fn modlevel(&self, inv: &Invocation, args: &str, reply_to: Option<UserId>) -> ServiceResult<String> {
        self.gate(inv, "modlevel").await?;

        let tokens: Vec<&str> = args.split_whitespace().collect();
        let Some(first) = tokens.first() else {
            return Err(self.usage(
                inv,
                "moderation.level.usage",
                "Usage: /modlevel <rank_id> [@user|id] (rank 0 removes moderation access)",
            ));
        };
        let Ok(rank_id) = first.parse::<i64>() else {
            return Err(self.usage(inv, "moderation.level.invalid", "❌ The rank id must be a number."));
        };
        if rank_id < 0 {
            return Err(self.usage(inv, "moderation.level.invalid", "❌ The rank id must be a number."));
        }

        let target = match reply_to {
            Some(user_id) => user_id,
            None => match ArgParser::new(self.ctx).find_target(&tokens[1..]).await {
                Some((_, user_id)) => user_id,
                None if tokens.len() > 1 => {
                    return Err(self.usage(
                        inv,
                        "moderation.level.user_not_found",
                        "❌ Could not find that user. Reply to a message or provide a valid username/ID.",
                    ));
                }
                None => {
                    return Err(self.usage(
                        inv,
                        "moderation.level.reply_required",
                        "❌ Reply to a user's message or specify a username/ID to set their level.",
                    ));
                }
            },
        };

        let registry = RankRegistry::new(self.ctx);
        let rank = registry
            .get_rank_by_id(inv.chat_id, rank_id)
            .await?
            .ok_or(DomainError::RankNotFound(rank_id))?;

        let checker = PermissionChecker::new(self.ctx);
        let actor = checker.priority(inv.chat_id, inv.actor_id).await?;
        if target != inv.actor_id && checker.priority(inv.chat_id, target).await? >= actor {
            return Err(self.usage(
                inv,
                "moderation.level.insufficient",
                "❌ You cannot change the level of someone with equal or higher rank.",
            ));
        }
        if rank.priority > actor {
            return Err(self.usage(
                inv,
                "moderation.level.too_high",
                "❌ You cannot assign a rank higher than your own.",
            ));
        }

        registry.ensure_defaults(inv.chat_id).await?;
        LevelResolver::new(self.ctx)
            .set_level(inv.chat_id, target, rank.level)
            .await?;
        info!(chat_id = %inv.chat_id, target = %target, level = rank.level, "Moderation level assigned");

        let name = display_label(self.ctx, Some(inv.chat_id), target, None).await;
        Ok(self.ctx.tr(
            "moderation.level.set",
            inv.lang(),
            "✅ Moderation level for {name} set to {rank} (level {level}).",
            &[
                ("name", escape_html(&name)),
                ("rank", escape_html(&rank.name)),
                ("level", rank.level.to_string()),
            ],
        ))
    }

    /// `/modlevellist`: every stored override of the chat
    #[instrument(skip(self, inv), fields(chat_id = %inv.chat_id))]
    pub async fn modlevellist(&self, inv: &Invocation) -> ServiceResult<String> {
        self.gate(inv, "modlevellist").await?;

        let mut overrides = self.ctx.level_repo().find_by_chat(inv.chat_id).await?;
        if overrides.is_empty() {
            return Ok(self.ctx.tr(
                "moderation.levels.empty",
                inv.lang(),
                "No moderation levels are stored for this chat.",
                &[],
            ));
        }
        overrides.sort_by_key(|o| (std::cmp::Reverse(o.level), o.user_id));

        let registry = RankRegistry::new(self.ctx);
        let mut ranks: HashMap<i32, ModeratorRank> = HashMap::new();
        let mut lines = vec![self.ctx.tr(
            "moderation.levels.header",
            inv.lang(),
            "<b>Moderation levels:</b>",
            &[],
        )];
        for entry in overrides {
            if !ranks.contains_key(&entry.level) {
                let rank = registry.ensure_rank_for_level(inv.chat_id, entry.level).await?;
                ranks.insert(entry.level, rank);
            }
            let (rank_name, priority) = ranks
                .get(&entry.level)
                .map(|r| (r.name.clone(), r.priority))
                .unwrap_or_default();
            let label = display_label(self.ctx, Some(inv.chat_id), entry.user_id, None).await;
            lines.push(format!(
                "• {} - {} (level {}, priority {priority})",
                user_link(entry.user_id, &label),
                escape_html(&rank_name),
                entry.level,
            ));
        }
        Ok(lines.join("\n"))
    }

    // =========================================================================
    // Rank catalogue
    // =========================================================================

    /// `/addmodrank <name> <priority>`
    #[instrument(skip(self, inv), fields(chat_id = %inv.chat_id))]
    pub async fn add_rank(&self, inv: &Invocation, args: &str) -> ServiceResult<String> {
        self.gate(inv, "addmodrank").await?;

        let Some((name, priority)) = split_rank_args(args) else {
            return Err(self.usage(inv, "moderation.rank.add_usage", "Usage: /addmodrank <name> <priority>"));
        };
        let request = AddRankRequest { name, priority };
        request.validate()?;

        let rank = RankRegistry::new(self.ctx)
            .add_rank(inv.chat_id, &request.name, request.priority)
            .await?;
        Ok(self.ctx.tr(
            "moderation.rank.added",
            inv.lang(),
            "✅ Rank #{id} \"{name}\" created at level {level} with priority {priority}.",
            &[
                ("id", rank.id.to_string()),
                ("name", escape_html(&rank.name)),
                ("level", rank.level.to_string()),
                ("priority", rank.priority.to_string()),
            ],
        ))
    }

    /// `/delmodrank <id>`
    #[instrument(skip(self, inv), fields(chat_id = %inv.chat_id))]
    pub async fn delete_rank(&self, inv: &Invocation, args: &str) -> ServiceResult<String> {
        self.gate(inv, "delmodrank").await?;

        let Some(id) = args.split_whitespace().next().and_then(|a| a.parse::<i64>().ok()) else {
            return Err(self.usage(inv, "moderation.rank.delete_usage", "Usage: /delmodrank <id>"));
        };
        let rank = RankRegistry::new(self.ctx).delete_rank(inv.chat_id, id).await?;
        Ok(self.ctx.tr(
            "moderation.rank.deleted",
            inv.lang(),
            "🗑 Rank #{id} \"{name}\" deleted.",
            &[("id", rank.id.to_string()), ("name", escape_html(&rank.name))],
        ))
    }

    /// `/modedit <id> <name>`
    #[instrument(skip(self, inv), fields(chat_id = %inv.chat_id))]
    pub async fn rename_rank(&self, inv: &Invocation, args: &str) -> ServiceResult<String> {
        self.gate(inv, "modedit").await?;

        let parsed = args
            .trim()
            .split_once(char::is_whitespace)
            .and_then(|(id, name)| Some((id.parse::<i64>().ok()?, name.trim().to_string())));
        let Some((id, name)) = parsed else {
            return Err(self.usage(inv, "moderation.rank.edit_usage", "Usage: /modedit <id> <name>"));
        };
        let request = RenameRankRequest { id, name };
        request.validate()?;

        let rank = RankRegistry::new(self.ctx)
            .rename_rank(inv.chat_id, request.id, &request.name)
            .await?;
        Ok(self.ctx.tr(
            "moderation.rank.renamed",
            inv.lang(),
            "✅ Rank #{id} is now called \"{name}\".",
            &[("id", rank.id.to_string()), ("name", escape_html(&rank.name))],
        ))
    }

    /// `/rankinfo <id>`: the rank and the members holding it
    #[instrument(skip(self, inv), fields(chat_id = %inv.chat_id))]
    pub async fn rank_info(&self, inv: &Invocation, args: &str) -> ServiceResult<String> {
        self.gate(inv, "rankinfo").await?;

        let Some(id) = args.split_whitespace().next().and_then(|a| a.parse::<i64>().ok()) else {
            let ranks = RankRegistry::new(self.ctx).ordered_ranks(inv.chat_id).await?;
            let mut lines = vec![self.ctx.tr(
                "moderation.rank.list_header",
                inv.lang(),
                "<b>Ranks</b> (use /rankinfo <id> for details):",
                &[],
            )];
            lines.extend(ranks.iter().map(|r| {
                format!(
                    "#{} {} - level {}, priority {}",
                    r.id,
                    escape_html(&r.name),
                    r.level,
                    r.priority
                )
            }));
            return Ok(lines.join("\n"));
        };

        let rank = RankRegistry::new(self.ctx)
            .get_rank_by_id(inv.chat_id, id)
            .await?
            .ok_or(DomainError::RankNotFound(id))?;
        let holders: Vec<UserId> = self
            .ctx
            .level_repo()
            .find_by_chat(inv.chat_id)
            .await?
            .into_iter()
            .filter(|o| o.level == rank.level)
            .map(|o| o.user_id)
            .collect();

        let mut lines = vec![
            format!("<b>Rank #{}: {}</b>", rank.id, escape_html(&rank.name)),
            format!("Level: {}", rank.level),
            format!("Priority: {}", rank.priority),
        ];
        if rank.is_default() {
            lines.push(self.ctx.tr("moderation.rank.default_note", inv.lang(), "<i>Default rank</i>", &[]));
        }
        if holders.is_empty() {
            lines.push(self.ctx.tr(
                "moderation.rank.no_members",
                inv.lang(),
                "Nobody holds this rank explicitly.",
                &[],
            ));
        } else {
            lines.push(format!("Members ({}):", holders.len()));
            for user_id in holders {
                let label = display_label(self.ctx, Some(inv.chat_id), user_id, None).await;
                lines.push(format!("• {}", user_link(user_id, &label)));
            }
        }
        Ok(lines.join("\n"))
    }

    // =========================================================================
    // Command restrictions
    // =========================================================================

    /// `/restrictcommand <priority|0> <command>`
    #[instrument(skip(self, inv), fields(chat_id = %inv.chat_id))]
    pub async fn restrict_command(&self, inv: &Invocation, args: &str) -> ServiceResult<String> {
        self.gate(inv, "restrictcommand").await?;

        let tokens: Vec<&str> = args.split_whitespace().collect();
        let [priority, command, ..] = tokens.as_slice() else {
            return Err(self.usage(
                inv,
                "moderation.command_restrict.usage",
                "Usage: /restrictcommand <priority> <command> (use 0 to remove)",
            ));
        };
        let Some(priority) = priority.parse::<i32>().ok().filter(|p| *p >= 0) else {
            return Err(self.usage(
                inv,
                "moderation.command_restrict.level_range",
                "❌ Priority must be zero or a positive number.",
            ));
        };

        let table = CommandRestrictionTable::new(self.ctx);
        if priority == 0 {
            let name = commands::canonical(command);
            if name.is_empty() {
                return Err(self.usage(
                    inv,
                    "moderation.command_restrict.invalid_command",
                    "❌ Please provide a command to restrict.",
                ));
            }
            table.clear_priority(inv.chat_id, command).await?;
            return Ok(self.ctx.tr(
                "moderation.command_restrict.cleared",
                inv.lang(),
                "🧹 Restriction removed for /{command}. It uses its default level again.",
                &[("command", name)],
            ));
        }

        let name = table.set_priority(inv.chat_id, command, priority).await?;
        Ok(self.ctx.tr(
            "moderation.command_restrict.set",
            inv.lang(),
            "✅ Command /{command} now requires level {level}.",
            &[("command", name), ("level", priority.to_string())],
        ))
    }

    // =========================================================================
    // Listings
    // =========================================================================

    /// Stored overrides plus platform administrators, keyed by user
    async fn collect_staff(&self, chat_id: ChatId, include_zero: bool) -> ServiceResult<BTreeMap<UserId, StaffEntry>> {
        let stored: HashMap<UserId, i32> = self
            .ctx
            .level_repo()
            .find_by_chat(chat_id)
            .await?
            .into_iter()
            .map(|o| (o.user_id, o.level))
            .collect();

        let admins = match self.ctx.gateway().get_chat_administrators(chat_id).await {
            Ok(admins) => admins,
            Err(e) => {
                warn!(chat_id = %chat_id, error = %e, "Failed to fetch administrators");
                Vec::new()
            }
        };
        let admin_ids: HashSet<UserId> = admins.iter().map(|a| a.user_id).collect();

        let mut entries = BTreeMap::new();
        for (&user_id, &level) in &stored {
            if level <= 0 && !include_zero {
                continue;
            }
            let label = display_label(self.ctx, Some(chat_id), user_id, None).await;
            entries.insert(
                user_id,
                StaffEntry {
                    level,
                    label,
                    is_admin: admin_ids.contains(&user_id),
                },
            );
        }
        for admin in admins {
            let level = stored
                .get(&admin.user_id)
                .copied()
                .unwrap_or_else(|| admin.status.default_level());
            if level <= 0 && !include_zero {
                continue;
            }
            let label =
                display_label(self.ctx, Some(chat_id), admin.user_id, Some(admin.display_name.as_str())).await;
            entries.insert(
                admin.user_id,
                StaffEntry {
                    level,
                    label,
                    is_admin: true,
                },
            );
        }
        Ok(entries)
    }

    fn mention_flag(&self, inv: &Invocation, args: &[&str]) -> ServiceResult<bool> {
        parse_mention_flag(args.iter().copied(), self.ctx.settings().mention_default).ok_or_else(|| {
            self.usage(
                inv,
                "moderation.common.mention_invalid",
                "❌ The mention argument accepts 'on' or 'off'.",
            )
        })
    }

    /// `/mods [mention=on|off]`: moderators grouped by level, highest first
    #[instrument(skip(self, inv), fields(chat_id = %inv.chat_id))]
    pub async fn list_mods(&self, inv: &Invocation, args: &str) -> ServiceResult<String> {
        self.gate(inv, "mods").await?;
        let tokens: Vec<&str> = args.split_whitespace().collect();
        let mention = self.mention_flag(inv, &tokens)?;

        let staff = self.collect_staff(inv.chat_id, false).await?;
        if staff.is_empty() {
            return Ok(self.ctx.tr(
                "moderation.mods.empty",
                inv.lang(),
                "No moderators have been assigned yet.",
                &[],
            ));
        }

        let mut by_level: BTreeMap<i32, Vec<(String, String)>> = BTreeMap::new();
        for (user_id, entry) in &staff {
            by_level
                .entry(entry.level)
                .or_default()
                .push((entry.label.to_lowercase(), entry.render(*user_id, mention)));
        }

        let registry = RankRegistry::new(self.ctx);
        let mut ranks: Vec<ModeratorRank> = registry
            .ordered_ranks(inv.chat_id)
            .await?
            .into_iter()
            .filter(|r| by_level.contains_key(&r.level))
            .collect();
        for &level in by_level.keys() {
            if !ranks.iter().any(|r| r.level == level) {
                ranks.push(registry.ensure_rank_for_level(inv.chat_id, level).await?);
            }
        }
        sort_ranks(&mut ranks);

        let mut lines = Vec::new();
        for rank in ranks {
            let Some(mut members) = by_level.remove(&rank.level) else {
                continue;
            };
            members.sort();
            let stars = "⭐️".repeat(rank.priority.clamp(1, MAX_LISTED_LEVEL) as usize);
            lines.push(self.ctx.tr(
                "moderation.mods.header",
                inv.lang(),
                "{stars} {rank}:",
                &[("stars", stars), ("rank", group_title(&rank))],
            ));
            lines.extend(members.into_iter().map(|(_, display)| display));
        }
        Ok(lines.join("\n"))
    }

    /// `/restrict <0-5> [mention=on|off]`: members with exactly that level
    #[instrument(skip(self, inv), fields(chat_id = %inv.chat_id))]
    pub async fn list_level(&self, inv: &Invocation, args: &str) -> ServiceResult<String> {
        self.gate(inv, "restrict").await?;
        let tokens: Vec<&str> = args.split_whitespace().collect();
        let Some(first) = tokens.first() else {
            return Err(self.usage(
                inv,
                "moderation.restrict.usage",
                "Usage: /restrict <0-5> [mention=on|off] shows members with that exact level.",
            ));
        };
        let Some(level) = first
            .parse::<i32>()
            .ok()
            .filter(|l| (0..=MAX_LISTED_LEVEL).contains(l))
        else {
            return Err(self.usage(inv, "moderation.restrict.range", "❌ Level must be a number between 0 and 5."));
        };
        let mention = self.mention_flag(inv, &tokens[1..])?;

        let staff = self.collect_staff(inv.chat_id, level == 0).await?;
        let mut matches: Vec<(String, String)> = staff
            .iter()
            .filter(|(_, entry)| entry.level == level)
            .map(|(user_id, entry)| (entry.label.to_lowercase(), entry.render(*user_id, mention)))
            .collect();
        if matches.is_empty() {
            return Ok(self.ctx.tr(
                "moderation.restrict.empty",
                inv.lang(),
                "❌ Nobody currently has level {level}.",
                &[("level", level.to_string())],
            ));
        }
        matches.sort();

        let mut lines = vec![self.ctx.tr(
            "moderation.restrict.header",
            inv.lang(),
            "⭐️ Level {level} members:",
            &[("level", level.to_string())],
        )];
        lines.extend(matches.into_iter().map(|(_, display)| display));
        Ok(lines.join("\n"))
    }
}
