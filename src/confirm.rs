use crate::models::{Product, SeoPair};
use async_trait::async_trait;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};
use tracing::warn;

/// Decides whether a generated pair may be written to the store.
#[async_trait]
pub trait Confirmer: Send {
    async fn approve(&mut self, product: &Product, pair: &SeoPair) -> bool;
}

/// Approves every candidate; used when interactive review is off.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoApprove;

#[async_trait]
impl Confirmer for AutoApprove {
    async fn approve(&mut self, _product: &Product, _pair: &SeoPair) -> bool {
        true
    }
}

/// Shows each pair and asks for `y` or `n`, repeating on any other answer.
/// End of input counts as `n`.
pub struct PromptConfirmer<R, W> {
    input: R,
    output: W,
}

impl PromptConfirmer<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> PromptConfirmer<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    async fn say(&mut self, line: &str) -> io::Result<()> {
        self.output.write_all(line.as_bytes()).await?;
        self.output.write_all(b"\n").await
    }

    async fn ask(&mut self, product: &Product, pair: &SeoPair) -> io::Result<bool> {
        self.say(&format!("Product {}: {}", product.id, product.name))
            .await?;
        self.say(&format!("Meta Title: {}", pair.title)).await?;
        self.say(&format!("Meta Description: {}", pair.description))
            .await?;
        loop {
            self.say("Do you approve these values? (y/n): ").await?;
            self.output.flush().await?;
            let mut line = String::new();
            if self.input.read_line(&mut line).await? == 0 {
                return Ok(false);
            }
            match line.trim() {
                "y" => return Ok(true),
                "n" => {
                    self.say("Skipping this product...").await?;
                    return Ok(false);
                }
                _ => self.say("Invalid input. Please enter 'y' or 'n'.").await?,
            }
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}

#[async_trait]
impl<R, W> Confirmer for PromptConfirmer<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn approve(&mut self, product: &Product, pair: &SeoPair) -> bool {
        match self.ask(product, pair).await {
            Ok(approved) => approved,
            Err(err) => {
                warn!(target: "wooh.seo", product_id = product.id, error = %err, "confirmation prompt failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::woo::testing::product;
    use std::io::Cursor;

    fn pair() -> SeoPair {
        SeoPair {
            title: "Oak Plank".into(),
            description: "Durable oak.".into(),
        }
    }

    async fn run(input: &str) -> (bool, String) {
        let mut confirmer =
            PromptConfirmer::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        let approved = confirmer.approve(&product(1), &pair()).await;
        (approved, String::from_utf8(confirmer.into_output()).unwrap())
    }

    #[tokio::test]
    async fn yes_approves() {
        let (approved, output) = run("y\n").await;
        assert!(approved);
        assert!(output.contains("Meta Title: Oak Plank"));
        assert!(output.contains("Meta Description: Durable oak."));
    }

    #[tokio::test]
    async fn no_rejects() {
        let (approved, output) = run("n\n").await;
        assert!(!approved);
        assert!(output.contains("Skipping this product..."));
    }

    #[tokio::test]
    async fn other_input_repeats_the_prompt() {
        let (approved, output) = run("maybe\nYES\n  y  \n").await;
        assert!(approved);
        assert_eq!(output.matches("Invalid input").count(), 2);
        assert_eq!(output.matches("Do you approve these values?").count(), 3);
    }

    #[tokio::test]
    async fn end_of_input_rejects() {
        let (approved, _) = run("").await;
        assert!(!approved);
    }

    #[tokio::test]
    async fn auto_approve_always_approves() {
        assert!(AutoApprove.approve(&product(1), &pair()).await);
    }
}
