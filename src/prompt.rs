use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};

use crate::errors::SetupError;

/// Source of validated operator answers.
///
/// The wizard only sees this contract; the terminal implementation below is
/// the interactive path and `ScriptedAnswers` drives tests and automation.
#[async_trait]
pub trait AnswerSource: Send {
    /// Asks until a non-empty answer is given. Fails with `Cancelled` on
    /// interrupt.
    async fn ask_required(&mut self, prompt: &str) -> Result<String, SetupError>;

    /// Asks the operator to pick one of the listed options.
    async fn ask_select(&mut self, prompt: &str, options: &[String]) -> Result<String, SetupError>;

    /// Like `ask_required`, but the answer must not be logged or echoed back.
    async fn ask_secret(&mut self, prompt: &str) -> Result<String, SetupError>;

    /// Asks once; an empty answer falls back to `default`.
    async fn ask_with_default(&mut self, prompt: &str, default: &str) -> Result<String, SetupError>;

    /// Rendezvous with the operator: resolves once they acknowledge having
    /// completed an out-of-band step. Cancellable, optionally time-limited.
    async fn wait_for_ack(&mut self, prompt: &str) -> Result<(), SetupError>;
}

/// Interactive answer source reading from stdin. Ctrl-C during any wait maps
/// to `SetupError::Cancelled` so an interrupt aborts the run cleanly.
pub struct TerminalAnswers {
    reader: BufReader<Stdin>,
    ack_timeout: Option<Duration>,
}

impl TerminalAnswers {
    pub fn new(ack_timeout: Option<Duration>) -> Self {
        Self {
            reader: BufReader::new(tokio::io::stdin()),
            ack_timeout,
        }
    }

    async fn read_line(&mut self) -> Result<String, SetupError> {
        let mut line = String::new();
        tokio::select! {
            read = self.reader.read_line(&mut line) => match read {
                // Closed stdin means nobody is there to answer.
                Ok(0) => Err(SetupError::Cancelled),
                Ok(_) => Ok(line.trim().to_string()),
                Err(e) => Err(SetupError::InputValidation(format!("failed to read answer: {e}"))),
            },
            _ = tokio::signal::ctrl_c() => Err(SetupError::Cancelled),
        }
    }
}

#[async_trait]
impl AnswerSource for TerminalAnswers {
    async fn ask_required(&mut self, prompt: &str) -> Result<String, SetupError> {
        loop {
            println!("{prompt}");
            let answer = self.read_line().await?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            println!("An answer is required.");
        }
    }

    async fn ask_select(&mut self, prompt: &str, options: &[String]) -> Result<String, SetupError> {
        if options.is_empty() {
            return Err(SetupError::InputValidation(format!(
                "no options available for '{prompt}'"
            )));
        }
        loop {
            println!("{prompt}");
            for (i, option) in options.iter().enumerate() {
                println!("  {}) {}", i + 1, option);
            }
            let answer = self.read_line().await?;
            if let Ok(n) = answer.parse::<usize>() {
                if (1..=options.len()).contains(&n) {
                    return Ok(options[n - 1].clone());
                }
            }
            if let Some(hit) = options.iter().find(|option| **option == answer) {
                return Ok(hit.clone());
            }
            println!("Pick one of the listed options, by number or name.");
        }
    }

    async fn ask_secret(&mut self, prompt: &str) -> Result<String, SetupError> {
        loop {
            println!("{prompt}");
            let answer = self.read_line().await?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            println!("An answer is required.");
        }
    }

    async fn ask_with_default(&mut self, prompt: &str, default: &str) -> Result<String, SetupError> {
        println!("{prompt} [{default}]");
        let answer = self.read_line().await?;
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer
        })
    }

    async fn wait_for_ack(&mut self, prompt: &str) -> Result<(), SetupError> {
        println!("{prompt}");
        match self.ack_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.read_line()).await {
                Ok(read) => read.map(|_| ()),
                Err(_) => {
                    println!("⏰ Timed out after {}s waiting for acknowledgement.", limit.as_secs());
                    Err(SetupError::Cancelled)
                }
            },
            None => self.read_line().await.map(|_| ()),
        }
    }
}

/// Replays a fixed queue of answers. Used by the wizard tests and usable for
/// non-interactive runs where every answer is known up front.
#[derive(Debug, Default)]
pub struct ScriptedAnswers {
    answers: VecDeque<String>,
    cancel_at_ack: bool,
}

impl ScriptedAnswers {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            cancel_at_ack: false,
        }
    }

    /// Simulates an operator interrupt at the acknowledgement rendezvous.
    pub fn cancelling_at_ack(mut self) -> Self {
        self.cancel_at_ack = true;
        self
    }

    fn next_answer(&mut self, prompt: &str) -> Result<String, SetupError> {
        self.answers.pop_front().ok_or_else(|| {
            SetupError::InputValidation(format!("no scripted answer left for prompt '{prompt}'"))
        })
    }
}

#[async_trait]
impl AnswerSource for ScriptedAnswers {
    async fn ask_required(&mut self, prompt: &str) -> Result<String, SetupError> {
        let answer = self.next_answer(prompt)?;
        if answer.is_empty() {
            return Err(SetupError::InputValidation(format!(
                "scripted answer for '{prompt}' is empty"
            )));
        }
        Ok(answer)
    }

    async fn ask_select(&mut self, prompt: &str, options: &[String]) -> Result<String, SetupError> {
        let answer = self.next_answer(prompt)?;
        if !options.contains(&answer) {
            return Err(SetupError::InputValidation(format!(
                "scripted answer '{answer}' is not among the options for '{prompt}'"
            )));
        }
        Ok(answer)
    }

    async fn ask_secret(&mut self, prompt: &str) -> Result<String, SetupError> {
        self.ask_required(prompt).await
    }

    async fn ask_with_default(&mut self, prompt: &str, default: &str) -> Result<String, SetupError> {
        let answer = self.next_answer(prompt)?;
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer
        })
    }

    async fn wait_for_ack(&mut self, _prompt: &str) -> Result<(), SetupError> {
        if self.cancel_at_ack {
            Err(SetupError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_answers_replay_in_order() {
        let mut answers = ScriptedAnswers::new(["first", "second"]);
        assert_eq!(answers.ask_required("a").await.unwrap(), "first");
        assert_eq!(answers.ask_required("b").await.unwrap(), "second");
        assert!(matches!(
            answers.ask_required("c").await,
            Err(SetupError::InputValidation(_))
        ));
    }

    #[tokio::test]
    async fn scripted_select_rejects_unknown_option() {
        let mut answers = ScriptedAnswers::new(["nope"]);
        let options = vec!["acme".to_string()];
        assert!(matches!(
            answers.ask_select("org", &options).await,
            Err(SetupError::InputValidation(_))
        ));
    }

    #[tokio::test]
    async fn scripted_default_fills_empty_answer() {
        let mut answers = ScriptedAnswers::new([""]);
        assert_eq!(
            answers.ask_with_default("group", "Default").await.unwrap(),
            "Default"
        );
    }

    #[tokio::test]
    async fn scripted_ack_can_simulate_cancellation() {
        let mut answers = ScriptedAnswers::new(Vec::<String>::new()).cancelling_at_ack();
        assert!(matches!(
            answers.wait_for_ack("continue?").await,
            Err(SetupError::Cancelled)
        ));
    }
}
