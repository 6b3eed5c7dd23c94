//! Asking for a single statistic until the answer is well formed.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::conversation::{Conversation, TransportError};
use common::messages::Catalog;

static KDA_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+)\s*/\s*(\d+)\s*/\s*(\d+)\s*$").expect("KDA pattern is valid")
});

static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s*$").expect("number pattern is valid"));

/// Outcome of one prompt. `Expired` is not a value: the user never answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompted<T> {
    Answered(T),
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kda {
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
}

/// What to ask, how to check the answer and which messages to use.
pub struct StatPrompt<T> {
    pattern: &'static Regex,
    prompt_key: &'static str,
    invalid_key: &'static str,
    parse: fn(&Captures<'_>) -> Option<T>,
}

/// Stats are stored as signed 32 bit columns, anything above `i32::MAX` is malformed.
fn capture_number(captures: &Captures<'_>, index: usize) -> Option<u32> {
    let value: i32 = captures.get(index)?.as_str().parse().ok()?;
    u32::try_from(value).ok()
}

impl StatPrompt<Kda> {
    pub fn kda() -> Self {
        Self {
            pattern: &KDA_PATTERN,
            prompt_key: "match.prompt.kda",
            invalid_key: "match.invalid.kda",
            parse: |c| {
                Some(Kda {
                    kills: capture_number(c, 1)?,
                    deaths: capture_number(c, 2)?,
                    assists: capture_number(c, 3)?,
                })
            },
        }
    }
}

impl StatPrompt<u32> {
    pub fn creep_score() -> Self {
        Self::number("match.prompt.cs")
    }

    pub fn gold() -> Self {
        Self::number("match.prompt.gold")
    }

    fn number(prompt_key: &'static str) -> Self {
        Self {
            pattern: &NUMBER_PATTERN,
            prompt_key,
            invalid_key: "match.invalid.number",
            parse: |c| capture_number(c, 1),
        }
    }
}

impl<T> StatPrompt<T> {
    pub fn prompt_key(&self) -> &'static str {
        self.prompt_key
    }

    pub fn invalid_key(&self) -> &'static str {
        self.invalid_key
    }

    /// `None` if the input does not match or a number does not fit.
    pub fn parse(&self, input: &str) -> Option<T> {
        self.pattern
            .captures(input)
            .and_then(|captures| (self.parse)(&captures))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionSettings {
    pub reply_timeout: std::time::Duration,
    pub notice_lifetime: std::time::Duration,
}

/// Prompts until a reply parses or the reply window closes.
///
/// Each reply is removed from the channel before it is checked. A malformed
/// reply gets a short lived notice and the same prompt again; there is no limit
/// on the number of attempts, every attempt gets a fresh window.
pub async fn collect_stat<T, C>(
    conversation: &C,
    catalog: &Catalog,
    prompt: &StatPrompt<T>,
    replacements: &[(&str, &str)],
    settings: &CollectionSettings,
) -> Result<Prompted<T>, TransportError>
where
    C: Conversation + ?Sized,
{
    let prompt_text = catalog.format(prompt.prompt_key, replacements);

    loop {
        conversation.show(&prompt_text).await?;

        let reply = match conversation.next_reply(settings.reply_timeout).await? {
            Some(r) => r,
            None => {
                tracing::debug!(key = prompt.prompt_key, "Prompt expired");
                return Ok(Prompted::Expired);
            }
        };
        conversation.discard(&reply).await;

        let input = reply.content.trim();
        if let Some(value) = prompt.parse(input) {
            return Ok(Prompted::Answered(value));
        }

        tracing::debug!(key = prompt.prompt_key, %input, "Malformed reply");

        let mut notice_replacements = replacements.to_vec();
        notice_replacements.push(("input", input));
        conversation
            .notify(
                &catalog.format(prompt.invalid_key, &notice_replacements),
                settings.notice_lifetime,
            )
            .await?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_kda() {
        let prompt = StatPrompt::kda();
        assert_eq!(
            Some(Kda {
                kills: 10,
                deaths: 2,
                assists: 7
            }),
            prompt.parse("10/2/7")
        );
        assert_eq!(
            Some(Kda {
                kills: 0,
                deaths: 0,
                assists: 0
            }),
            prompt.parse(" 0 / 0 / 0 ")
        );
    }

    #[test]
    fn rejects_malformed_kda() {
        let prompt = StatPrompt::kda();
        for input in ["abc", "10/2", "10/2/7/1", "-1/2/3", "1.5/2/3", "10 2 7", ""] {
            assert_eq!(None, prompt.parse(input), "input {:?}", input);
        }
    }

    #[test]
    fn parses_numbers() {
        assert_eq!(Some(184), StatPrompt::creep_score().parse("184"));
        assert_eq!(Some(12_500), StatPrompt::gold().parse("12500"));
        assert_eq!(None, StatPrompt::gold().parse("12.5k"));
        assert_eq!(None, StatPrompt::creep_score().parse("-3"));
    }

    #[test]
    fn overflowing_numbers_are_malformed() {
        assert_eq!(None, StatPrompt::gold().parse("99999999999"));
        assert_eq!(None, StatPrompt::kda().parse("1/99999999999/1"));
    }

    #[test]
    fn numbers_must_fit_a_stored_column() {
        assert_eq!(None, StatPrompt::gold().parse("3000000000"));
        assert_eq!(None, StatPrompt::creep_score().parse("2147483648"));
        assert_eq!(None, StatPrompt::kda().parse("2147483648/0/0"));
        assert_eq!(Some(2_147_483_647), StatPrompt::gold().parse("2147483647"));
    }

    #[test]
    fn prompt_keys() {
        assert_eq!("match.prompt.kda", StatPrompt::kda().prompt_key());
        assert_eq!("match.invalid.kda", StatPrompt::kda().invalid_key());
        assert_eq!("match.prompt.gold", StatPrompt::gold().prompt_key());
        assert_eq!("match.invalid.number", StatPrompt::creep_score().invalid_key());
    }
}
