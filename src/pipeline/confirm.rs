//! Confirmation gate asked before a bulk download

use std::future::Future;

/// What the operator is asked to approve
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmRequest {
    pub urls: Vec<String>,
}

impl ConfirmRequest {
    pub fn new(urls: Vec<String>) -> ConfirmRequest {
        ConfirmRequest { urls }
    }

    pub fn count(&self) -> usize {
        self.urls.len()
    }

    pub fn message(&self) -> String {
        format!("Download {} resources?", self.count())
    }
}

/// A yes/no decision channel; it may take as long as the operator needs
pub trait Confirm {
    fn confirm(&self, request: &ConfirmRequest) -> impl Future<Output = bool> + Send;
}

/// Always approves
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    async fn confirm(&self, _request: &ConfirmRequest) -> bool {
        true
    }
}

/// Always declines
#[derive(Clone, Copy, Debug, Default)]
pub struct Decline;

impl Confirm for Decline {
    async fn confirm(&self, _request: &ConfirmRequest) -> bool {
        false
    }
}

/// Adapts a plain closure into a confirmation channel
pub struct FnConfirm<F>(pub F);

impl<F> Confirm for FnConfirm<F>
where
    F: Fn(&ConfirmRequest) -> bool + Send + Sync,
{
    async fn confirm(&self, request: &ConfirmRequest) -> bool {
        (self.0)(request)
    }
}

/// Asks on the terminal; declines when stdin is not a terminal
#[cfg(feature = "cli")]
#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalConfirm;

#[cfg(feature = "cli")]
impl Confirm for TerminalConfirm {
    async fn confirm(&self, request: &ConfirmRequest) -> bool {
        if !atty::is(atty::Stream::Stdin) {
            tracing::warn!("no terminal to confirm on, declining (pass --yes to skip the prompt)");
            return false;
        }

        for url in &request.urls {
            eprintln!("  {}", url);
        }

        let message = request.message();
        let answer = tokio::task::spawn_blocking(move || {
            inquire::Confirm::new(&message)
                .with_default(false)
                .with_help_message("y to download, n to cancel")
                .prompt()
        })
        .await;

        match answer {
            Ok(Ok(confirmed)) => confirmed,
            Ok(Err(e)) => {
                tracing::debug!("confirmation prompt closed: {}", e);
                false
            }
            Err(e) => {
                tracing::warn!("confirmation prompt failed: {}", e);
                false
            }
        }
    }
}
