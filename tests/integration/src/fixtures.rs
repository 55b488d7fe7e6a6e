//! Test fixtures and update builders
//!
//! Updates are built as Bot API JSON and deserialized, so every scenario
//! exercises the same wire shapes the webhook receives.

use std::sync::atomic::{AtomicI64, Ordering};

use modbot_core::traits::MessageRef;
use modbot_core::value_objects::{ChatId, UserId};
use modbot_gateway::update::Update;
use serde_json::{json, Value};

/// Counter for unique update and message ids
static COUNTER: AtomicI64 = AtomicI64::new(1);

pub fn next_id() -> i64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// The group every scenario moderates
pub const GROUP: ChatId = ChatId::new(-1_001_500);
pub const GROUP_TITLE: &str = "Rustaceans";

/// A user appearing in updates
#[derive(Debug, Clone, Copy)]
pub struct Person {
    pub id: i64,
    pub first_name: &'static str,
    pub last_name: Option<&'static str>,
    pub username: &'static str,
}

impl Person {
    pub const fn user_id(&self) -> UserId {
        UserId::new(self.id)
    }

    /// Private chat with the bot
    pub const fn dm(&self) -> ChatId {
        ChatId::new(self.id)
    }

    pub fn full_name(&self) -> String {
        match self.last_name {
            Some(last) => format!("{} {last}", self.first_name),
            None => self.first_name.to_string(),
        }
    }

    pub fn json(&self) -> Value {
        let mut user = json!({
            "id": self.id,
            "is_bot": false,
            "first_name": self.first_name,
            "username": self.username,
            "language_code": "en",
        });
        if let Some(last) = self.last_name {
            user["last_name"] = json!(last);
        }
        user
    }
}

/// Group creator
pub const OWNER: Person = Person {
    id: 10,
    first_name: "Olga",
    last_name: None,
    username: "olga",
};

/// Platform administrator
pub const ADMIN: Person = Person {
    id: 20,
    first_name: "Max",
    last_name: Some("Mod"),
    username: "maxmod",
};

/// Second platform administrator
pub const CO_ADMIN: Person = Person {
    id: 21,
    first_name: "Ida",
    last_name: None,
    username: "ida",
};

pub const SPAMMER: Person = Person {
    id: 30,
    first_name: "Spam",
    last_name: Some("Bot"),
    username: "spammer",
};

pub const MEMBER: Person = Person {
    id: 40,
    first_name: "Lee",
    last_name: None,
    username: "lee",
};

fn group_chat() -> Value {
    json!({"id": GROUP.into_inner(), "type": "supergroup", "title": GROUP_TITLE, "username": "rustchat"})
}

fn chat_json(chat_id: ChatId) -> Value {
    if chat_id == GROUP {
        return group_chat();
    }
    let kind = if chat_id.is_private() { "private" } else { "group" };
    json!({"id": chat_id.into_inner(), "type": kind})
}

fn update(value: Value) -> Update {
    serde_json::from_value(value).expect("fixture update must deserialize")
}

fn message_json(from: &Person, chat_id: ChatId, text: &str) -> Value {
    json!({
        "message_id": next_id(),
        "from": from.json(),
        "chat": chat_json(chat_id),
        "date": 1_700_000_000,
        "text": text,
    })
}

/// A text message (or command) in the group
pub fn group_message(from: &Person, text: &str) -> Update {
    update(json!({"update_id": next_id(), "message": message_json(from, GROUP, text)}))
}

/// A group message replying to something `author` wrote
pub fn group_reply(from: &Person, text: &str, author: &Person, replied_text: &str) -> Update {
    let mut message = message_json(from, GROUP, text);
    message["reply_to_message"] = message_json(author, GROUP, replied_text);
    update(json!({"update_id": next_id(), "message": message}))
}

/// `/report` in reply to a bot's message
pub fn report_of_bot_message(from: &Person) -> Update {
    let mut message = message_json(from, GROUP, "/report");
    message["reply_to_message"] = json!({
        "message_id": next_id(),
        "from": {"id": 999, "is_bot": true, "first_name": "Helper", "username": "helperbot"},
        "chat": group_chat(),
        "date": 1_700_000_000,
        "text": "I am a bot",
    });
    update(json!({"update_id": next_id(), "message": message}))
}

/// A message in the sender's private chat with the bot
pub fn private_message(from: &Person, text: &str) -> Update {
    update(json!({"update_id": next_id(), "message": message_json(from, from.dm(), text)}))
}

/// A button press on a message the bot sent
pub fn callback(from: &Person, origin: MessageRef, data: &str) -> Update {
    update(json!({
        "update_id": next_id(),
        "callback_query": {
            "id": format!("cb-{}", next_id()),
            "from": from.json(),
            "message": {
                "message_id": origin.message_id,
                "chat": chat_json(origin.chat_id),
                "date": 1_700_000_000,
            },
            "data": data,
        },
    }))
}

/// Raw JSON of a group command, as posted to the webhook
pub fn group_message_json(from: &Person, text: &str) -> Value {
    json!({"update_id": next_id(), "message": message_json(from, GROUP, text)})
}
