//! Ports - repository traits and external collaborator interfaces

mod collaborators;
mod repositories;

pub use collaborators::{
    ButtonAction, ChatMember, GatewayResult, InlineButton, InlineKeyboard, Localizer, MessageRef,
    MessagingGateway, OutgoingMessage, UserDirectory,
};
pub use repositories::{
    ActionRepository, AppealRepository, AwardRepository, CommandRestrictionRepository,
    LevelRepository, RankRepository, RepoResult, ReportRepository, WarningRepository,
};
