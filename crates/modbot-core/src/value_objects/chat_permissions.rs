//! Chat permission flags applied when restricting a member

use bitflags::bitflags;
use serde_json::{Map, Value};

bitflags! {
    /// Send permissions granted to a restricted member
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChatPermissions: u32 {
        const SEND_MESSAGES          = 1 << 0;
        const SEND_AUDIOS            = 1 << 1;
        const SEND_DOCUMENTS         = 1 << 2;
        const SEND_PHOTOS            = 1 << 3;
        const SEND_VIDEOS            = 1 << 4;
        const SEND_VIDEO_NOTES       = 1 << 5;
        const SEND_VOICE_NOTES       = 1 << 6;
        const SEND_POLLS             = 1 << 7;
        const SEND_OTHER_MESSAGES    = 1 << 8;
        const ADD_WEB_PAGE_PREVIEWS  = 1 << 9;

        /// Media-mute: plain text only
        const TEXT_ONLY = Self::SEND_MESSAGES.bits();

        /// Everything a regular member may send
        const ALL_MESSAGES = Self::SEND_MESSAGES.bits()
            | Self::SEND_AUDIOS.bits()
            | Self::SEND_DOCUMENTS.bits()
            | Self::SEND_PHOTOS.bits()
            | Self::SEND_VIDEOS.bits()
            | Self::SEND_VIDEO_NOTES.bits()
            | Self::SEND_VOICE_NOTES.bits()
            | Self::SEND_POLLS.bits()
            | Self::SEND_OTHER_MESSAGES.bits()
            | Self::ADD_WEB_PAGE_PREVIEWS.bits();
    }
}

const FIELD_NAMES: [(ChatPermissions, &str); 10] = [
    (ChatPermissions::SEND_MESSAGES, "can_send_messages"),
    (ChatPermissions::SEND_AUDIOS, "can_send_audios"),
    (ChatPermissions::SEND_DOCUMENTS, "can_send_documents"),
    (ChatPermissions::SEND_PHOTOS, "can_send_photos"),
    (ChatPermissions::SEND_VIDEOS, "can_send_videos"),
    (ChatPermissions::SEND_VIDEO_NOTES, "can_send_video_notes"),
    (ChatPermissions::SEND_VOICE_NOTES, "can_send_voice_notes"),
    (ChatPermissions::SEND_POLLS, "can_send_polls"),
    (ChatPermissions::SEND_OTHER_MESSAGES, "can_send_other_messages"),
    (ChatPermissions::ADD_WEB_PAGE_PREVIEWS, "can_add_web_page_previews"),
];

impl ChatPermissions {
    /// Muted members may send nothing
    pub const MUTED: Self = Self::empty();

    /// Render as the Bot API `ChatPermissions` object (every field explicit)
    pub fn to_api_object(self) -> Value {
        let mut map = Map::new();
        for (flag, name) in FIELD_NAMES {
            map.insert(name.to_string(), Value::Bool(self.contains(flag)));
        }
        Value::Object(map)
    }
}
