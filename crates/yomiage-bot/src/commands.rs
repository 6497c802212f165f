//! Classification of inbound chat messages.

/// What a message asks the bot to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `!hi`: join the author's voice channel and start reading.
    Summon,
    /// `!bye`: stop reading and leave.
    Dismiss,
    /// Bare mention or `@bot help`.
    Help,
    /// `@bot lang` reads the language, `@bot lang <tag>` sets it.
    Language(Option<String>),
    /// `@bot rand`: pick a new random voice.
    RandomizeVoice,
    /// Plain chat to be read aloud.
    Speak,
    /// Unknown mention command or `!`-prefixed text for other bots.
    Ignore,
}

impl Command {
    /// Whether this is an explicit command (the bot ignores its own).
    pub const fn is_command(&self) -> bool {
        !matches!(self, Self::Speak | Self::Ignore)
    }
}

/// Classify a message's raw content.
pub fn classify(content: &str, bot_user_id: &str) -> Command {
    if content.starts_with("!hi") {
        return Command::Summon;
    }
    if content.starts_with("!bye") {
        return Command::Dismiss;
    }

    if let Some(rest) = strip_mention(content, bot_user_id) {
        let mut words = rest.split_whitespace();
        return match words.next() {
            None | Some("help") => Command::Help,
            Some("lang") => Command::Language(words.next().map(str::to_string)),
            Some("rand") => Command::RandomizeVoice,
            Some(_) => Command::Ignore,
        };
    }

    if content.starts_with('!') {
        Command::Ignore
    } else {
        Command::Speak
    }
}

/// Content after a leading `<@id>` or `<@!id>` mention of the bot.
fn strip_mention<'a>(content: &'a str, bot_user_id: &str) -> Option<&'a str> {
    let rest = content.trim_start().strip_prefix("<@")?;
    let rest = rest.strip_prefix('!').unwrap_or(rest);
    rest.strip_prefix(bot_user_id)?.strip_prefix('>')
}
