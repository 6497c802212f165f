//! Shared fixtures for worker integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mockall::mock;

use yomiage_core::{
    ChannelBinding, ChannelId, GatewayError, GatewayPort, GuildId, IncomingMessage, JoinStatus,
    LeaveStatus, OpusFrames, UserId, WorkerEvent, WorkerEventEmitter,
};
use yomiage_worker::{WorkerConfig, WorkerRegistry};

mock! {
    pub Gateway {}

    #[async_trait]
    impl GatewayPort for Gateway {
        fn bot_user_id(&self) -> UserId;
        async fn send_message(&self, channel: &ChannelId, text: &str) -> Result<(), GatewayError>;
        async fn voice_state_of(
            &self,
            user: &UserId,
            guild: &GuildId,
        ) -> Result<Option<ChannelId>, GatewayError>;
        async fn join_voice(
            &self,
            guild: &GuildId,
            channel: &ChannelId,
        ) -> Result<JoinStatus, GatewayError>;
        async fn leave_voice(&self, guild: &GuildId) -> Result<LeaveStatus, GatewayError>;
        async fn is_alone_in_voice(&self, guild: &GuildId) -> Result<bool, GatewayError>;
        async fn has_voice_connection(&self, guild: &GuildId) -> bool;
        async fn play(&self, guild: &GuildId, frames: OpusFrames) -> Result<(), GatewayError>;
        async fn display_name(&self, guild: &GuildId, user: &UserId) -> Result<String, GatewayError>;
        async fn channel_name(
            &self,
            guild: &GuildId,
            channel: &ChannelId,
        ) -> Result<String, GatewayError>;
        async fn resolve_mentions(&self, message: &IncomingMessage) -> String;
    }
}

/// Collects every emitted event.
#[derive(Default)]
pub struct RecordingEmitter {
    events: Mutex<Vec<WorkerEvent>>,
}

impl RecordingEmitter {
    pub fn events(&self) -> Vec<WorkerEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&WorkerEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }
}

impl WorkerEventEmitter for RecordingEmitter {
    fn emit(&self, event: WorkerEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn binding(guild: &str) -> ChannelBinding {
    ChannelBinding::new(guild, format!("{guild}-voice"), format!("{guild}-text"))
}

/// Registry with a 32-slot queue, no post-task pause and a recording emitter.
pub fn registry() -> (Arc<WorkerRegistry>, Arc<RecordingEmitter>) {
    let emitter = Arc::new(RecordingEmitter::default());
    let registry = WorkerRegistry::new(
        WorkerConfig {
            queue_capacity: 32,
            task_pause: Duration::ZERO,
        },
        emitter.clone(),
    );
    (Arc::new(registry), emitter)
}

/// How [`ScriptedGateway`] answers `is_alone_in_voice` for a guild.
#[derive(Debug, Clone, Copy)]
pub enum Answer {
    Alone,
    Occupied,
    Fail,
    Panic,
}

/// Hand-written gateway for cases a mock cannot express, such as a check
/// that panics. Guilds without a scripted answer report occupied.
#[derive(Default)]
pub struct ScriptedGateway {
    answers: HashMap<String, Answer>,
    leaves: Mutex<Vec<GuildId>>,
}

impl ScriptedGateway {
    pub fn answer(mut self, guild: &str, answer: Answer) -> Self {
        self.answers.insert(guild.to_string(), answer);
        self
    }

    pub fn leaves(&self) -> Vec<GuildId> {
        self.leaves.lock().unwrap().clone()
    }
}

#[async_trait]
impl GatewayPort for ScriptedGateway {
    fn bot_user_id(&self) -> UserId {
        UserId::new("bot")
    }

    async fn send_message(&self, _channel: &ChannelId, _text: &str) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn voice_state_of(
        &self,
        _user: &UserId,
        _guild: &GuildId,
    ) -> Result<Option<ChannelId>, GatewayError> {
        Ok(None)
    }

    async fn join_voice(
        &self,
        _guild: &GuildId,
        _channel: &ChannelId,
    ) -> Result<JoinStatus, GatewayError> {
        Ok(JoinStatus::Joined)
    }

    async fn leave_voice(&self, guild: &GuildId) -> Result<LeaveStatus, GatewayError> {
        self.leaves.lock().unwrap().push(guild.clone());
        Ok(LeaveStatus::Left)
    }

    async fn is_alone_in_voice(&self, guild: &GuildId) -> Result<bool, GatewayError> {
        match self.answers.get(guild.as_str()).copied() {
            Some(Answer::Alone) => Ok(true),
            Some(Answer::Occupied) | None => Ok(false),
            Some(Answer::Fail) => Err(GatewayError::Request("scripted failure".into())),
            Some(Answer::Panic) => panic!("scripted panic for {guild}"),
        }
    }

    async fn has_voice_connection(&self, _guild: &GuildId) -> bool {
        true
    }

    async fn play(&self, _guild: &GuildId, _frames: OpusFrames) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn display_name(&self, _guild: &GuildId, user: &UserId) -> Result<String, GatewayError> {
        Ok(user.to_string())
    }

    async fn channel_name(
        &self,
        _guild: &GuildId,
        channel: &ChannelId,
    ) -> Result<String, GatewayError> {
        Ok(channel.to_string())
    }

    async fn resolve_mentions(&self, message: &IncomingMessage) -> String {
        message.content.clone()
    }
}
