//! Guarded step actions.
//!
//! Each action is enabled only when the ledger sits exactly on its
//! prerequisite stage, and advances the ledger — persisting first —
//! only after its page interaction succeeded. A failed action leaves
//! the stage untouched, so the same step stays armed for retry.

use chrono::Utc;
use tracing::info;

use context_bridge::AgentNotice;
use element_locator::{detect_challenge, detect_signup_form, locate, RoleHint, Strategy};
use interaction_primitives::{click, type_text};
use pagepilot_core_types::StepStage;
use step_state::AdvanceOutcome;

use crate::agent::PageAgent;
use crate::errors::{HaltReason, StepError};
use crate::watch::{wait_for_visible, wait_until};

fn sign_in_chain() -> Vec<Strategy> {
    vec![
        Strategy::css("a[href*=\"auth\"]"),
        Strategy::css("a[href*=\"login\"]"),
        Strategy::css("a[href*=\"signin\"]"),
        Strategy::css(".sign-in"),
        Strategy::css(".login-btn"),
        Strategy::text("sign in"),
        Strategy::text("log in"),
    ]
}

fn sign_up_chain() -> Vec<Strategy> {
    vec![
        Strategy::css("a[href*=\"sign-up\"]"),
        Strategy::css("a[href*=\"signup\"]"),
        Strategy::css(".sign-up"),
        Strategy::css(".signup-btn"),
        Strategy::text("sign up"),
        Strategy::text("create account"),
    ]
}

fn first_name_chain() -> Vec<Strategy> {
    vec![
        Strategy::css("input[name=\"first_name\"]"),
        Strategy::css("input[name=\"firstName\"]"),
        Strategy::css("input[name=\"fname\"]"),
        Strategy::css("input[placeholder*=\"first name\" i]"),
        Strategy::css("input[data-testid*=\"first\" i]"),
        Strategy::css("input[id*=\"first\" i]"),
    ]
}

fn last_name_chain() -> Vec<Strategy> {
    vec![
        Strategy::css("input[name=\"last_name\"]"),
        Strategy::css("input[name=\"lastName\"]"),
        Strategy::css("input[name=\"lname\"]"),
        Strategy::css("input[placeholder*=\"last name\" i]"),
        Strategy::css("input[data-testid*=\"last\" i]"),
        Strategy::css("input[id*=\"last\" i]"),
    ]
}

fn email_chain() -> Vec<Strategy> {
    vec![
        Strategy::css("input[name=\"email\"]"),
        Strategy::css("input[type=\"email\"]"),
        Strategy::css("input[placeholder*=\"email\" i]"),
        Strategy::css("input[data-testid*=\"email\" i]"),
        Strategy::css("input[id*=\"email\" i]"),
    ]
}

fn continue_chain() -> Vec<Strategy> {
    vec![
        Strategy::css("button[name=\"intent\"][value=\"sign-up\"]"),
        Strategy::css("button[type=\"submit\"]"),
        Strategy::text("continue"),
    ]
}

const PASSWORD_SELECTORS: &[&str] = &[
    "input[name=\"password\"]",
    "input[type=\"password\"]",
    "input[placeholder*=\"password\" i]",
    "[data-testid*=\"password\"]",
];

impl PageAgent {
    async fn guard(&self, target: StepStage) -> Result<(), StepError> {
        if let Some(reason) = self.halt_reason() {
            return Err(StepError::Halted(reason));
        }
        if !self.is_connected() {
            return Err(StepError::Disconnected);
        }
        let ledger = self.ledger().await;
        if ledger.stage() >= target {
            return Err(StepError::AlreadyCompleted);
        }
        match target.prerequisite() {
            Some(required) if required == ledger.stage() => Ok(()),
            Some(required) => Err(StepError::OutOfOrder { required }),
            None => Err(StepError::AlreadyCompleted),
        }
    }

    async fn advance(&self, target: StepStage) -> Result<(), StepError> {
        match self.ledger().await.advance(target, Utc::now()).await? {
            AdvanceOutcome::Advanced => Ok(()),
            AdvanceOutcome::AlreadyCompleted => Err(StepError::AlreadyCompleted),
            AdvanceOutcome::OutOfOrder { required } => Err(StepError::OutOfOrder { required }),
        }
    }

    async fn challenge_gate(&self) -> Result<(), StepError> {
        if let Some(indicator) = detect_challenge(self.page()).await? {
            let reason = HaltReason::ChallengeDetected { indicator };
            self.halt(reason.clone());
            return Err(StepError::Halted(reason));
        }
        Ok(())
    }

    /// Step 1: click the sign-in affordance on the main page.
    pub async fn execute_sign_in(&self) -> Result<(), StepError> {
        self.guard(StepStage::SignInClicked).await?;

        let located = locate(self.page(), &sign_in_chain(), RoleHint::Clickable).await?;
        info!(element = %located.info.describe(), "sign-in target located");

        // The click is about to open or repurpose a tab; arm the
        // background watcher before it happens.
        self.notify(AgentNotice::SigninClicked { tab: self.tab() });

        click(self.page(), &located.handle, self.pacing()).await?;
        self.advance(StepStage::SignInClicked).await
    }

    /// Step 2: click the sign-up affordance on the authenticator page,
    /// then wait (bounded) for the signup page to materialize.
    pub async fn execute_sign_up(&self) -> Result<(), StepError> {
        self.guard(StepStage::SignUpClicked).await?;

        let located = locate(self.page(), &sign_up_chain(), RoleHint::Clickable).await?;
        info!(element = %located.info.describe(), "sign-up target located");
        click(self.page(), &located.handle, self.pacing()).await?;

        let config = self.config();
        let page = self.page();
        let arrived = wait_until(
            config.transition_window,
            config.transition_poll,
            || async move {
                let url = page.current_url().await?;
                if url.contains("/sign-up") || url.contains("/signup") {
                    return Ok(Some(()));
                }
                if detect_signup_form(page).await? {
                    return Ok(Some(()));
                }
                Ok(None)
            },
        )
        .await?;

        if arrived.is_none() {
            let reason = HaltReason::NavigationTimeout {
                context: "signup page after sign-up click".to_string(),
            };
            self.halt(reason.clone());
            return Err(StepError::Halted(reason));
        }

        self.advance(StepStage::SignUpClicked).await
    }

    /// Step 3: fill and submit the signup form with the generated
    /// profile, including the deferred password phase.
    pub async fn execute_fill_form(&self) -> Result<(), StepError> {
        self.guard(StepStage::FormSubmitted).await?;
        self.challenge_gate().await?;

        let profile = self.profile().await?;

        let first = locate(self.page(), &first_name_chain(), RoleHint::Input).await?;
        type_text(self.page(), &first.handle, &profile.first_name, self.pacing()).await?;

        let last = locate(self.page(), &last_name_chain(), RoleHint::Input).await?;
        type_text(self.page(), &last.handle, &profile.last_name, self.pacing()).await?;

        let email = locate(self.page(), &email_chain(), RoleHint::Input).await?;
        type_text(self.page(), &email.handle, &profile.email, self.pacing()).await?;

        let cont = locate(self.page(), &continue_chain(), RoleHint::Button).await?;
        click(self.page(), &cont.handle, self.pacing()).await?;

        // Pages love to park a challenge between the identity and the
        // password phase.
        self.challenge_gate().await?;

        let config = self.config();
        let password_field = wait_for_visible(
            self.page(),
            PASSWORD_SELECTORS,
            config.password_window,
            config.password_poll,
        )
        .await?;
        let Some(password_field) = password_field else {
            let reason = HaltReason::NavigationTimeout {
                context: "password field after first continue".to_string(),
            };
            self.halt(reason.clone());
            return Err(StepError::Halted(reason));
        };

        let password = profile.password.as_deref().ok_or(StepError::MissingProfile)?;
        type_text(self.page(), &password_field.handle, password, self.pacing()).await?;

        let finish = locate(self.page(), &continue_chain(), RoleHint::Button).await?;
        click(self.page(), &finish.handle, self.pacing()).await?;

        self.advance(StepStage::FormSubmitted).await
    }
}
