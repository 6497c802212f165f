//! Fakes and a ready-wired handler for bot integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use yomiage_core::{
    ChannelId, GatewayError, GatewayPort, GuildId, IncomingMessage, JoinStatus, LeaveStatus,
    NoopWorkerEmitter, OpusFrames, PreferenceRepository, RepositoryError, SpeechError,
    SpeechRequest, SpeechSynthesizer, UserId,
};
use yomiage_bot::{Handler, HandlerConfig};
use yomiage_db::{SqlitePreferenceRepository, setup_test_database};
use yomiage_worker::{WorkerConfig, WorkerRegistry};

pub const GUILD: &str = "G1";
pub const BOT: &str = "bot";
pub const TEXT: &str = "text-1";
pub const VOICE: &str = "voice-1";

/// In-memory stand-in for the chat session.
#[derive(Default)]
pub struct FakeGateway {
    voice_states: Mutex<HashMap<UserId, ChannelId>>,
    connections: Mutex<HashSet<GuildId>>,
    alone: Mutex<HashSet<GuildId>>,
    sent: Mutex<Vec<(ChannelId, String)>>,
    joins: Mutex<Vec<(GuildId, ChannelId)>>,
    leaves: Mutex<Vec<GuildId>>,
    plays: Mutex<Vec<(GuildId, OpusFrames)>>,
    played: Notify,
    playback_gate: Mutex<Option<Arc<Notify>>>,
    playback_entered: Notify,
    panic_on_send: AtomicBool,
}

impl FakeGateway {
    pub fn put_in_voice(&self, user: &str, channel: &str) {
        self.voice_states
            .lock()
            .unwrap()
            .insert(UserId::new(user), ChannelId::new(channel));
    }

    /// Simulate the voice connection vanishing under a live worker.
    pub fn drop_connection(&self, guild: &str) {
        self.connections.lock().unwrap().remove(&GuildId::new(guild));
    }

    pub fn set_alone(&self, guild: &str) {
        self.alone.lock().unwrap().insert(GuildId::new(guild));
    }

    /// Make every playback block until the returned gate is notified.
    pub fn hold_playback(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.playback_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// Wait until a playback is blocked on the gate.
    pub async fn wait_until_playing(&self) {
        tokio::time::timeout(Duration::from_secs(5), self.playback_entered.notified())
            .await
            .expect("timed out waiting for playback to start");
    }

    pub fn panic_on_send(&self) {
        self.panic_on_send.store(true, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn last_sent(&self) -> Option<String> {
        self.sent().pop()
    }

    pub fn joins(&self) -> Vec<(GuildId, ChannelId)> {
        self.joins.lock().unwrap().clone()
    }

    pub fn leaves(&self) -> Vec<GuildId> {
        self.leaves.lock().unwrap().clone()
    }

    pub fn plays(&self) -> Vec<(GuildId, OpusFrames)> {
        self.plays.lock().unwrap().clone()
    }

    /// Wait until at least `n` playbacks happened.
    pub async fn wait_for_plays(&self, n: usize) -> Vec<(GuildId, OpusFrames)> {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let plays = self.plays();
                if plays.len() >= n {
                    return plays;
                }
                self.played.notified().await;
            }
        })
        .await
        .expect("timed out waiting for playback")
    }
}

#[async_trait]
impl GatewayPort for FakeGateway {
    fn bot_user_id(&self) -> UserId {
        UserId::new(BOT)
    }

    async fn send_message(&self, channel: &ChannelId, text: &str) -> Result<(), GatewayError> {
        assert!(
            !self.panic_on_send.load(Ordering::SeqCst),
            "gateway state corrupted"
        );
        self.sent
            .lock()
            .unwrap()
            .push((channel.clone(), text.to_string()));
        Ok(())
    }

    async fn voice_state_of(
        &self,
        user: &UserId,
        _guild: &GuildId,
    ) -> Result<Option<ChannelId>, GatewayError> {
        Ok(self.voice_states.lock().unwrap().get(user).cloned())
    }

    async fn join_voice(
        &self,
        guild: &GuildId,
        channel: &ChannelId,
    ) -> Result<JoinStatus, GatewayError> {
        self.joins
            .lock()
            .unwrap()
            .push((guild.clone(), channel.clone()));
        if self.connections.lock().unwrap().insert(guild.clone()) {
            Ok(JoinStatus::Joined)
        } else {
            Ok(JoinStatus::AlreadyInChannel)
        }
    }

    async fn leave_voice(&self, guild: &GuildId) -> Result<LeaveStatus, GatewayError> {
        self.leaves.lock().unwrap().push(guild.clone());
        if self.connections.lock().unwrap().remove(guild) {
            Ok(LeaveStatus::Left)
        } else {
            Ok(LeaveStatus::NotConnected)
        }
    }

    async fn is_alone_in_voice(&self, guild: &GuildId) -> Result<bool, GatewayError> {
        Ok(self.alone.lock().unwrap().contains(guild))
    }

    async fn has_voice_connection(&self, guild: &GuildId) -> bool {
        self.connections.lock().unwrap().contains(guild)
    }

    async fn play(&self, guild: &GuildId, frames: OpusFrames) -> Result<(), GatewayError> {
        let gate = self.playback_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            self.playback_entered.notify_one();
            gate.notified().await;
        }
        self.plays.lock().unwrap().push((guild.clone(), frames));
        self.played.notify_one();
        Ok(())
    }

    async fn display_name(&self, _guild: &GuildId, user: &UserId) -> Result<String, GatewayError> {
        Ok(format!("name-{user}"))
    }

    async fn channel_name(
        &self,
        _guild: &GuildId,
        channel: &ChannelId,
    ) -> Result<String, GatewayError> {
        Ok(format!("#{channel}"))
    }

    async fn resolve_mentions(&self, message: &IncomingMessage) -> String {
        message.content.replace("<@42>", "@alice")
    }
}

/// Speech backend that "synthesizes" the text bytes as a single frame.
#[derive(Default)]
pub struct FakeSpeech {
    requests: Mutex<Vec<SpeechRequest>>,
    fail: AtomicBool,
}

impl FakeSpeech {
    pub fn fail(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<SpeechRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeSpeech {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<OpusFrames, SpeechError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(SpeechError::Backend("quota exceeded".to_string()));
        }
        Ok(vec![request.text.as_bytes().to_vec()])
    }
}

/// Preference store kept in memory, for tests that run on a paused clock.
#[derive(Default)]
pub struct FakePreferences {
    languages: Mutex<HashMap<UserId, String>>,
    voices: Mutex<HashMap<UserId, String>>,
}

#[async_trait]
impl PreferenceRepository for FakePreferences {
    async fn language(&self, user: &UserId) -> Result<Option<String>, RepositoryError> {
        Ok(self.languages.lock().unwrap().get(user).cloned())
    }

    async fn voice_identity(&self, user: &UserId) -> Result<Option<String>, RepositoryError> {
        Ok(self.voices.lock().unwrap().get(user).cloned())
    }

    async fn set_language(&self, user: &UserId, language: &str) -> Result<(), RepositoryError> {
        self.languages
            .lock()
            .unwrap()
            .insert(user.clone(), language.to_string());
        Ok(())
    }

    async fn set_voice_identity(
        &self,
        user: &UserId,
        identity: &str,
    ) -> Result<(), RepositoryError> {
        self.voices
            .lock()
            .unwrap()
            .insert(user.clone(), identity.to_string());
        Ok(())
    }
}

pub struct Harness {
    pub gateway: Arc<FakeGateway>,
    pub speech: Arc<FakeSpeech>,
    pub preferences: Arc<SqlitePreferenceRepository>,
    pub registry: Arc<WorkerRegistry>,
    pub handler: Handler,
}

pub async fn harness() -> Harness {
    let gateway = Arc::new(FakeGateway::default());
    let speech = Arc::new(FakeSpeech::default());
    let preferences = Arc::new(SqlitePreferenceRepository::new(
        setup_test_database().await.unwrap(),
    ));
    let registry = Arc::new(WorkerRegistry::new(
        WorkerConfig {
            queue_capacity: 32,
            task_pause: Duration::ZERO,
        },
        Arc::new(NoopWorkerEmitter::new()),
    ));
    let handler = Handler::new(
        gateway.clone(),
        Arc::clone(&registry),
        preferences.clone(),
        speech.clone(),
        HandlerConfig {
            default_language: "en-US".to_string(),
            max_tts_chars: 50,
            join_delay: Duration::ZERO,
        },
    );

    Harness {
        gateway,
        speech,
        preferences,
        registry,
        handler,
    }
}

/// A message in guild `G1`.
pub fn message(channel: &str, author: &str, content: &str) -> IncomingMessage {
    IncomingMessage::new(GUILD, channel, author, content)
}

impl Harness {
    /// Run `!hi` from `user` sitting in the default voice channel.
    pub async fn start_session(&self, user: &str) {
        self.gateway.put_in_voice(user, VOICE);
        self.handler
            .handle_message(message(TEXT, user, "!hi"))
            .await;
        assert!(self.registry.is_active(&GuildId::new(GUILD)).await);
    }
}

/// Poll until the registry has executed at least `n` tasks.
pub async fn wait_for_executed(registry: &WorkerRegistry, n: u64) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while registry.stats().executed < n {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("timed out waiting for task execution");
}
