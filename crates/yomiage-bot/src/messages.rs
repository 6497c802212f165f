//! Chat replies.
//!
//! The bot speaks Japanese to its users; every user-visible string lives
//! here so handlers stay free of literals.

use yomiage_core::{JoinStatus, LeaveStatus};

pub const USAGE: &str = "使い方: https://github.com/tubo28/yomiage/blob/main/README.md";

pub const JOIN_VOICE_FIRST: &str = "ボイスチャンネルに参加せずに呼び出すことはできません。";

pub const NOT_READING: &str = "現在このサーバーでは読み上げていません。";

/// Phrase read in the user's new voice after `rand`.
pub const VOICE_SAMPLE: &str = "サンプル: イカよろしく～";

pub fn already_reading(voice_channel: &str) -> String {
    format!("すでにこのサーバーのボイスチャンネル {voice_channel} を読み上げ中です。")
}

pub fn wrong_text_channel(this_channel: &str, bound_channel: &str) -> String {
    format!("このテキストチャンネル {this_channel} は読み上げていません。{bound_channel} を読み上げ中です。")
}

pub fn join_bound_voice_first(voice_channel: &str) -> String {
    format!("読み上げ中のボイスチャンネル {voice_channel} に参加せずに読み上げを止めることはできません。")
}

pub fn current_language(name: &str, language: &str) -> String {
    format!("{name} の読み上げ言語は {language} です。")
}

pub fn language_changed(name: &str, language: &str) -> String {
    format!("{name} の読み上げ言語を {language} に変更しました。")
}

pub fn voice_changed(name: &str) -> String {
    format!("{name} の声を変更しました。")
}

pub const fn join_status(status: JoinStatus) -> &'static str {
    match status {
        JoinStatus::Joined => "読み上げます。",
        JoinStatus::AlreadyInChannel => "すでにボイスチャンネルにいます。何かがおかしいです。",
        JoinStatus::InOtherChannel => "すでに他のボイスチャンネルにいます。何かがおかしいです。",
    }
}

pub const fn leave_status(status: LeaveStatus) -> &'static str {
    match status {
        LeaveStatus::Left => "さようなら",
        LeaveStatus::NotConnected => {
            "このサーバーにbotが参加しているボイスチャンネルがありません。何かがおかしいです。"
        }
    }
}
