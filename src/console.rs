use std::pin::Pin;

use futures::stream::{self, Stream, StreamExt};
use rust_decimal::Decimal;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::domain::traits::LineSource;
use crate::domain::{Error, Money};

pub const INVALID_INTEGER: &str = "Invalid input. Please enter a valid integer.";
pub const INVALID_NUMBER: &str = "Invalid input. Please enter a valid number.";

/// Turns any buffered async reader (stdin in production) into a line stream.
pub struct ConsoleReader<R: AsyncBufRead> {
    reader: Option<R>,
}

impl<R: AsyncBufRead> ConsoleReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
        }
    }
}

impl<R: AsyncBufRead + Unpin + Send + 'static> LineSource for ConsoleReader<R> {
    type Lines = Pin<Box<dyn Stream<Item = Result<String, Error>> + Send>>;

    fn lines(&mut self) -> Self::Lines {
        let reader = match self.reader.take() {
            Some(r) => r,
            // Already handed out; nothing left to read.
            None => return Box::pin(stream::empty()),
        };

        Box::pin(stream::unfold(reader.lines(), |mut lines| async move {
            match lines.next_line().await {
                Ok(Some(line)) => Some((Ok(line), lines)),
                Ok(None) => None,
                Err(e) => Some((Err(Error::from(e)), lines)),
            }
        }))
    }
}

/// Prompt/response pair over a line stream and an output sink.
pub struct Console<S, W> {
    lines: S,
    out: W,
}

impl<S, W> Console<S, W>
where
    S: Stream<Item = Result<String, Error>> + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(lines: S, out: W) -> Self {
        Self { lines, out }
    }

    pub async fn say(&mut self, message: impl AsRef<str>) -> Result<(), Error> {
        self.out.write_all(message.as_ref().as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await?;
        Ok(())
    }

    /// Next raw line. A closed input surfaces as `Error::InputClosed`.
    pub async fn read_line(&mut self) -> Result<String, Error> {
        match self.lines.next().await {
            Some(line) => line,
            None => Err(Error::InputClosed),
        }
    }

    pub async fn ask(&mut self, prompt: &str) -> Result<String, Error> {
        self.say(prompt).await?;
        self.read_line().await
    }

    /// Reads until a line parses as an integer.
    pub async fn read_choice(&mut self) -> Result<i64, Error> {
        loop {
            let line = self.read_line().await?;
            match line.trim().parse::<i64>() {
                Ok(choice) => return Ok(choice),
                Err(_) => self.say(INVALID_INTEGER).await?,
            }
        }
    }

    /// Reads until a line parses as a non-negative amount.
    pub async fn read_amount(&mut self) -> Result<Decimal, Error> {
        loop {
            let line = self.read_line().await?;
            match line.parse::<Money>() {
                Ok(money) => return Ok(money.as_decimal()),
                Err(Error::InvalidInput(reason)) => {
                    tracing::debug!(%reason, "Rejected amount");
                    self.say(INVALID_NUMBER).await?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn console(input: &'static [u8]) -> Console<<ConsoleReader<&'static [u8]> as LineSource>::Lines, Vec<u8>> {
        Console::new(ConsoleReader::new(input).lines(), Vec::new())
    }

    fn output<S>(console: Console<S, Vec<u8>>) -> String
    where
        S: Stream<Item = Result<String, Error>> + Unpin,
    {
        String::from_utf8(console.into_output()).unwrap()
    }

    #[tokio::test]
    async fn choice_reprompts_until_integer() {
        let mut c = console(b"abc\n\n 3 \n");
        assert_eq!(c.read_choice().await.unwrap(), 3);
        let out = output(c);
        assert_eq!(out.matches(INVALID_INTEGER).count(), 2);
    }

    #[tokio::test]
    async fn amount_reprompts_on_garbage_and_negatives() {
        let mut c = console(b"ten\n-4\n12.50\r\n");
        assert_eq!(c.read_amount().await.unwrap(), "12.50".parse().unwrap());
        let out = output(c);
        assert_eq!(out.matches(INVALID_NUMBER).count(), 2);
    }

    #[tokio::test]
    async fn closed_input_is_reported() {
        let mut c = console(b"oops\n");
        assert!(matches!(c.read_choice().await, Err(Error::InputClosed)));
    }

    #[tokio::test]
    async fn ask_prints_prompt_then_reads() {
        let mut c = console(b"Ada Lovelace\n");
        assert_eq!(c.ask("Enter your full name:").await.unwrap(), "Ada Lovelace");
        assert_eq!(output(c), "Enter your full name:\n");
    }

    #[tokio::test]
    async fn reader_hands_out_lines_once() {
        let mut reader = ConsoleReader::new(&b"a\nb\n"[..]);
        let first: Vec<_> = reader.lines().collect().await;
        assert_eq!(first.len(), 2);
        let second: Vec<_> = reader.lines().collect().await;
        assert!(second.is_empty());
    }
}
