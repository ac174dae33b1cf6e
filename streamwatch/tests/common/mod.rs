//! Shared test doubles for the engine integration tests.
#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use helix_api::{Identity, StreamStatus};
use tempfile::TempDir;

use streamwatch::discord::{
    Channel, DiscordApi, DiscordError, ForumThread, Member, Message, MessagePayload,
    ScheduledEvent, ScheduledEventPayload,
};
use streamwatch::domain::{ChannelKind, PresentationMode, TrackedStreamer};
use streamwatch::presence::{Engine, EngineConfig, StatusCheck, StatusSource};
use streamwatch::store::{GuildStore, TrackedMap};

pub const GUILD: &str = "555";
pub const STATUS_CHANNEL: &str = "777";
pub const ROLE: &str = "900";

/// Recorded side-effecting calls, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    RenameChannel { channel_id: String, name: String },
    CreateMessage { channel_id: String, pinged: bool },
    EditMessage { channel_id: String, message_id: String },
    DeleteMessage { channel_id: String, message_id: String },
    CreateThread { channel_id: String, pinged: bool },
    LockThread { thread_id: String },
    DeleteChannel { channel_id: String },
    CreateEvent { guild_id: String },
    ModifyEvent { guild_id: String, event_id: String },
    DeleteEvent { guild_id: String, event_id: String },
}

/// In-memory Discord double with scriptable failure modes.
#[derive(Default)]
pub struct FakeDiscord {
    calls: Mutex<Vec<ApiCall>>,
    /// Channel ids reported as forum channels.
    pub forum_channels: Mutex<HashSet<String>>,
    /// Resource ids that answer with NotFound.
    missing: Mutex<HashSet<String>>,
    /// Channel ids where message writes are Forbidden.
    deny_channels: Mutex<HashSet<String>>,
    /// Member roles, keyed by user id.
    member_roles: Mutex<std::collections::HashMap<String, HashSet<String>>>,
    /// When set, scheduled event calls fail with a transient API error.
    pub fail_events: AtomicBool,
    next_id: AtomicU64,
}

impl FakeDiscord {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(100),
            ..Default::default()
        }
    }

    fn next_id(&self) -> String {
        self.next_id.fetch_add(1, Ordering::SeqCst).to_string()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn count(&self, pred: impl Fn(&ApiCall) -> bool) -> usize {
        self.calls().iter().filter(|call| pred(call)).count()
    }

    /// Announcements that actually carried a role mention.
    pub fn pings(&self) -> usize {
        self.count(|call| {
            matches!(
                call,
                ApiCall::CreateMessage { pinged: true, .. }
                    | ApiCall::CreateThread { pinged: true, .. }
            )
        })
    }

    pub fn mark_missing(&self, id: &str) {
        self.missing.lock().unwrap().insert(id.to_string());
    }

    pub fn mark_forum(&self, channel_id: &str) {
        self.forum_channels
            .lock()
            .unwrap()
            .insert(channel_id.to_string());
    }

    pub fn deny_channel(&self, channel_id: &str) {
        self.deny_channels
            .lock()
            .unwrap()
            .insert(channel_id.to_string());
    }

    fn is_missing(&self, id: &str) -> bool {
        self.missing.lock().unwrap().contains(id)
    }

    fn is_denied(&self, channel_id: &str) -> bool {
        self.deny_channels.lock().unwrap().contains(channel_id)
    }

    fn events_failing(&self) -> Result<(), DiscordError> {
        if self.fail_events.load(Ordering::SeqCst) {
            return Err(DiscordError::Api {
                status: 500,
                message: "scheduled events are down".to_string(),
            });
        }
        Ok(())
    }
}

fn carries_ping(payload: &MessagePayload) -> bool {
    payload
        .content
        .as_deref()
        .is_some_and(|content| content.contains("<@&"))
}

#[async_trait]
impl DiscordApi for FakeDiscord {
    async fn get_channel(&self, channel_id: &str) -> Result<Channel, DiscordError> {
        if self.is_missing(channel_id) {
            return Err(DiscordError::NotFound);
        }
        let kind = if self.forum_channels.lock().unwrap().contains(channel_id) {
            15
        } else {
            0
        };
        Ok(Channel {
            id: channel_id.to_string(),
            kind,
            name: None,
        })
    }

    async fn rename_channel(&self, channel_id: &str, name: &str) -> Result<(), DiscordError> {
        if self.is_missing(channel_id) {
            return Err(DiscordError::NotFound);
        }
        self.record(ApiCall::RenameChannel {
            channel_id: channel_id.to_string(),
            name: name.to_string(),
        });
        Ok(())
    }

    async fn delete_channel(&self, channel_id: &str) -> Result<(), DiscordError> {
        if self.is_missing(channel_id) {
            return Err(DiscordError::NotFound);
        }
        self.record(ApiCall::DeleteChannel {
            channel_id: channel_id.to_string(),
        });
        Ok(())
    }

    async fn get_message(
        &self,
        channel_id: &str,
        message_id: &str,
    ) -> Result<Message, DiscordError> {
        if self.is_missing(message_id) {
            return Err(DiscordError::NotFound);
        }
        Ok(Message {
            id: message_id.to_string(),
            channel_id: channel_id.to_string(),
        })
    }

    async fn create_message(
        &self,
        channel_id: &str,
        payload: &MessagePayload,
    ) -> Result<Message, DiscordError> {
        if self.is_denied(channel_id) {
            return Err(DiscordError::Forbidden);
        }
        let id = self.next_id();
        self.record(ApiCall::CreateMessage {
            channel_id: channel_id.to_string(),
            pinged: carries_ping(payload),
        });
        Ok(Message {
            id,
            channel_id: channel_id.to_string(),
        })
    }

    async fn edit_message(
        &self,
        channel_id: &str,
        message_id: &str,
        _payload: &MessagePayload,
    ) -> Result<Message, DiscordError> {
        if self.is_denied(channel_id) {
            return Err(DiscordError::Forbidden);
        }
        if self.is_missing(message_id) {
            return Err(DiscordError::NotFound);
        }
        self.record(ApiCall::EditMessage {
            channel_id: channel_id.to_string(),
            message_id: message_id.to_string(),
        });
        Ok(Message {
            id: message_id.to_string(),
            channel_id: channel_id.to_string(),
        })
    }

    async fn delete_message(
        &self,
        channel_id: &str,
        message_id: &str,
    ) -> Result<(), DiscordError> {
        if self.is_missing(message_id) {
            return Err(DiscordError::NotFound);
        }
        self.record(ApiCall::DeleteMessage {
            channel_id: channel_id.to_string(),
            message_id: message_id.to_string(),
        });
        Ok(())
    }

    async fn create_forum_thread(
        &self,
        channel_id: &str,
        _name: &str,
        payload: &MessagePayload,
    ) -> Result<ForumThread, DiscordError> {
        if self.is_denied(channel_id) {
            return Err(DiscordError::Forbidden);
        }
        let id = self.next_id();
        self.record(ApiCall::CreateThread {
            channel_id: channel_id.to_string(),
            pinged: carries_ping(payload),
        });
        Ok(ForumThread {
            id: id.clone(),
            message: Some(Message {
                id: id.clone(),
                channel_id: id,
            }),
        })
    }

    async fn lock_thread(&self, thread_id: &str) -> Result<(), DiscordError> {
        self.record(ApiCall::LockThread {
            thread_id: thread_id.to_string(),
        });
        Ok(())
    }

    async fn get_member(&self, _guild_id: &str, user_id: &str) -> Result<Member, DiscordError> {
        let roles = self
            .member_roles
            .lock()
            .unwrap()
            .get(user_id)
            .map(|roles| roles.iter().cloned().collect())
            .unwrap_or_default();
        Ok(Member { roles })
    }

    async fn add_member_role(
        &self,
        _guild_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), DiscordError> {
        self.member_roles
            .lock()
            .unwrap()
            .entry(user_id.to_string())
            .or_default()
            .insert(role_id.to_string());
        Ok(())
    }

    async fn remove_member_role(
        &self,
        _guild_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), DiscordError> {
        if let Some(roles) = self.member_roles.lock().unwrap().get_mut(user_id) {
            roles.remove(role_id);
        }
        Ok(())
    }

    async fn get_scheduled_event(
        &self,
        _guild_id: &str,
        event_id: &str,
    ) -> Result<ScheduledEvent, DiscordError> {
        if self.is_missing(event_id) {
            return Err(DiscordError::NotFound);
        }
        Ok(ScheduledEvent {
            id: event_id.to_string(),
            name: None,
        })
    }

    async fn create_scheduled_event(
        &self,
        guild_id: &str,
        _payload: &ScheduledEventPayload,
    ) -> Result<ScheduledEvent, DiscordError> {
        self.events_failing()?;
        let id = self.next_id();
        self.record(ApiCall::CreateEvent {
            guild_id: guild_id.to_string(),
        });
        Ok(ScheduledEvent { id, name: None })
    }

    async fn modify_scheduled_event(
        &self,
        guild_id: &str,
        event_id: &str,
        _payload: &ScheduledEventPayload,
    ) -> Result<ScheduledEvent, DiscordError> {
        self.events_failing()?;
        if self.is_missing(event_id) {
            return Err(DiscordError::NotFound);
        }
        self.record(ApiCall::ModifyEvent {
            guild_id: guild_id.to_string(),
            event_id: event_id.to_string(),
        });
        Ok(ScheduledEvent {
            id: event_id.to_string(),
            name: None,
        })
    }

    async fn delete_scheduled_event(
        &self,
        guild_id: &str,
        event_id: &str,
    ) -> Result<(), DiscordError> {
        self.events_failing()?;
        if self.is_missing(event_id) {
            return Err(DiscordError::NotFound);
        }
        self.record(ApiCall::DeleteEvent {
            guild_id: guild_id.to_string(),
            event_id: event_id.to_string(),
        });
        Ok(())
    }
}

/// One scripted upstream answer.
#[derive(Debug, Clone)]
pub enum Scripted {
    Live { title: String, viewers: u64 },
    Offline,
    NotFound,
    TransientError,
    AuthError,
}

/// Scriptable status source; answers default to Offline when the queue runs
/// dry.
#[derive(Default)]
pub struct FakeSource {
    queue: Mutex<VecDeque<Scripted>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, scripted: Scripted) {
        self.queue.lock().unwrap().push_back(scripted);
    }

    pub fn push_live(&self, title: &str, viewers: u64) {
        self.push(Scripted::Live {
            title: title.to_string(),
            viewers,
        });
    }

    pub fn push_offline(&self) {
        self.push(Scripted::Offline);
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap().len()
    }
}

fn identity_for(login: &str, display_name: &str, user_id: &str) -> Identity {
    Identity {
        user_id: user_id.to_string(),
        login: login.to_string(),
        display_name: display_name.to_string(),
        profile_image_url: None,
    }
}

#[async_trait]
impl StatusSource for FakeSource {
    async fn resolve(&self, login: &str) -> streamwatch::Result<Option<Identity>> {
        if login == "ghost" {
            return Ok(None);
        }
        Ok(Some(identity_for(&login.to_lowercase(), login, "42")))
    }

    async fn check(&self, record: &TrackedStreamer) -> streamwatch::Result<StatusCheck> {
        let scripted = self
            .queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Scripted::Offline);
        let identity = identity_for(&record.handle, &record.display_name, &record.user_id);

        let status = match scripted {
            Scripted::Live { title, viewers } => StreamStatus::Live {
                title,
                category: Some("Celeste".to_string()),
                viewer_count: viewers,
                thumbnail_url: None,
                started_at: None,
            },
            Scripted::Offline => StreamStatus::Offline {
                last_category: Some("Celeste".to_string()),
                last_broadcast_at: None,
            },
            Scripted::NotFound => return Ok(StatusCheck::NotFound),
            Scripted::TransientError => {
                return Err(helix_api::HelixError::Api {
                    status: 500,
                    message: "upstream hiccup".to_string(),
                }
                .into());
            }
            Scripted::AuthError => {
                return Err(
                    helix_api::HelixError::Auth("token exchange failed".to_string()).into(),
                );
            }
        };

        Ok(StatusCheck::Found { identity, status })
    }
}

/// Engine wired to the fakes, backed by a temp-dir store.
pub struct Harness {
    pub engine: Engine,
    pub api: Arc<FakeDiscord>,
    pub source: Arc<FakeSource>,
    pub store: Arc<GuildStore>,
    _dir: TempDir,
}

pub fn harness(refresh_secs: i64) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(GuildStore::new(dir.path()));
    let api = Arc::new(FakeDiscord::new());
    let source = Arc::new(FakeSource::new());
    let engine = Engine::new(
        store.clone(),
        source.clone(),
        api.clone(),
        EngineConfig {
            refresh_interval: chrono::Duration::seconds(refresh_secs),
            pacing_delay: Duration::ZERO,
        },
    );
    Harness {
        engine,
        api,
        source,
        store,
        _dir: dir,
    }
}

/// Store a freshly configured streamer for `GUILD`.
pub async fn seed_streamer(store: &GuildStore, handle: &str, mode: PresentationMode, kind: ChannelKind) {
    let mut record = TrackedStreamer::new(handle, handle, "42");
    record.status_channel_id = Some(STATUS_CHANNEL.to_string());
    record.channel_kind = kind;
    record.notification_role_id = Some(ROLE.to_string());
    record.presentation_mode = mode;

    let mut tracked = store.load_tracked(GUILD).await.unwrap();
    tracked.insert(record.handle.clone(), record);
    store.save_tracked(GUILD, &tracked).await.unwrap();
}

pub async fn load_streamer(store: &GuildStore, handle: &str) -> TrackedStreamer {
    let tracked: TrackedMap = store.load_tracked(GUILD).await.unwrap();
    tracked[handle].clone()
}

/// Mutate a stored record in place.
pub async fn update_streamer(
    store: &GuildStore,
    handle: &str,
    mutate: impl FnOnce(&mut TrackedStreamer),
) {
    let mut tracked = store.load_tracked(GUILD).await.unwrap();
    let record = tracked.get_mut(handle).unwrap();
    mutate(record);
    store.save_tracked(GUILD, &tracked).await.unwrap();
}
