//! Session lifecycle: an explicit state machine around login/logout.
//!
//! ## State diagram
//!
//! ```text
//! ┌──────────────┐
//! │  Anonymous   │ (initial)
//! └──────┬───────┘
//!        │ LoginAttempt
//!        ▼
//! ┌──────────────┐  LoginFailed   ┌──────────────┐
//! │  LoggingIn   │ ─────────────► │  Anonymous   │
//! └──────┬───────┘                └──────────────┘
//!        │ LoginSuccess
//!        ▼
//! ┌──────────────┐  LogoutRequested  ┌──────────────┐
//! │ Authenticated│ ────────────────► │  LoggingOut  │
//! └──────────────┘                   └──────┬───────┘
//!        ▲        LogoutFailed              │ LogoutComplete
//!        └──────────────────────────────────┤
//!                                           ▼
//!                                      Anonymous
//! ```

use crate::client::ServicesClient;
use crate::error::{ClientError, ClientResult};
use drupal_entity_model::{coerce, kind, Entity};
use rust_fsm::*;
use serde::{Deserialize, Serialize};

// Declarative FSM; generates a `session_machine` module with State, Input,
// and a StateMachine type alias.
state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub session_machine(Anonymous)

    Anonymous => {
        LoginAttempt => LoggingIn
    },
    LoggingIn => {
        LoginSuccess => Authenticated,
        LoginFailed => Anonymous
    },
    Authenticated => {
        LogoutRequested => LoggingOut
    },
    LoggingOut => {
        LogoutComplete => Anonymous,
        LogoutFailed => Authenticated
    }
}

pub use session_machine::Input as SessionMachineInput;
pub use session_machine::State as SessionMachineState;
pub use session_machine::StateMachine as SessionMachine;

/// Simplified session state for external consumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No authenticated session.
    Anonymous,
    /// Login exchange in progress.
    LoggingIn,
    /// Server-confirmed identity held.
    Authenticated,
    /// Logout exchange in progress.
    LoggingOut,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated)
    }
}

impl From<&SessionMachineState> for SessionState {
    fn from(state: &SessionMachineState) -> Self {
        match state {
            SessionMachineState::Anonymous => SessionState::Anonymous,
            SessionMachineState::LoggingIn => SessionState::LoggingIn,
            SessionMachineState::Authenticated => SessionState::Authenticated,
            SessionMachineState::LoggingOut => SessionState::LoggingOut,
        }
    }
}

/// Uid the server reports for the anonymous session.
const ANONYMOUS_UID: i64 = 0;

/// Authentication session over a [`ServicesClient`].
///
/// Created once per application run and only ever reset, never destroyed.
/// The cached user entity survives logout; only the authenticated flag and
/// the token cache are cleared.
pub struct Session {
    machine: SessionMachine,
    user: Option<Entity>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            machine: SessionMachine::new(),
            user: None,
        }
    }

    /// Adopt an already-established server session without re-verifying it.
    ///
    /// The local flag is trusted; callers that need certainty should go
    /// through [`Session::login`], whose `/system/connect` probe asks the
    /// server.
    pub fn resume(user: Entity) -> Self {
        Self {
            machine: SessionMachine::from_state(SessionMachineState::Authenticated),
            user: Some(user),
        }
    }

    pub fn state(&self) -> SessionState {
        SessionState::from(self.machine.state())
    }

    /// Pure read of the authenticated flag.
    pub fn logged_in(&self) -> bool {
        self.state().is_authenticated()
    }

    /// The identity from the last successful authentication, if any.
    pub fn current_user(&self) -> Option<&Entity> {
        self.user.as_ref()
    }

    /// Authenticate against the server.
    ///
    /// Already-authenticated sessions short-circuit with the cached user and
    /// issue zero network calls. Otherwise `/system/connect` is probed first:
    /// when the cookie session is already live the returned user is adopted
    /// without exchanging credentials; otherwise the credentials go to
    /// `/user/login` and the issued token is stored. Failures propagate
    /// unretried and return the session to anonymous.
    pub async fn login(
        &mut self,
        client: &ServicesClient,
        username: &str,
        password: &str,
    ) -> ClientResult<&Entity> {
        if self.logged_in() {
            return self
                .user
                .as_ref()
                .ok_or_else(|| ClientError::State("authenticated session lost its user".to_string()));
        }

        self.consume(&SessionMachineInput::LoginAttempt)?;
        match Self::login_exchange(client, username, password).await {
            Ok(user) => {
                self.consume(&SessionMachineInput::LoginSuccess)?;
                tracing::info!(uid = ?user.id(), "Session authenticated");
                Ok(self.user.insert(user))
            }
            Err(e) => {
                let _ = self.consume(&SessionMachineInput::LoginFailed);
                Err(e)
            }
        }
    }

    async fn login_exchange(
        client: &ServicesClient,
        username: &str,
        password: &str,
    ) -> ClientResult<Entity> {
        let connect = client.system_connect().await?;
        let uid = connect
            .user
            .get("uid")
            .map(coerce::coerce_integer)
            .unwrap_or(ANONYMOUS_UID);

        if uid != ANONYMOUS_UID {
            // Cookie session already live server-side; no credentials needed
            tracing::debug!(uid, "Connect probe returned an authenticated user");
            if let Some(token) = connect.token {
                client.tokens().set(token).await;
            }
            return Ok(Entity::from_wire_with_mode(
                &kind::USER,
                connect.user,
                client.config().coercion,
            )?);
        }

        let login = client.user_login(username, password).await?;
        client.tokens().set(login.token).await;
        Ok(Entity::from_wire_with_mode(
            &kind::USER,
            login.user,
            client.config().coercion,
        )?)
    }

    /// End the session.
    ///
    /// On success the token cache is reset and the session returns to
    /// anonymous. The cached user attributes are kept.
    pub async fn logout(&mut self, client: &ServicesClient) -> ClientResult<()> {
        if !self.logged_in() {
            return Ok(());
        }

        self.consume(&SessionMachineInput::LogoutRequested)?;
        match client.user_logout().await {
            Ok(()) => {
                client.tokens().reset().await;
                self.consume(&SessionMachineInput::LogoutComplete)?;
                tracing::info!("Session ended");
                Ok(())
            }
            Err(e) => {
                let _ = self.consume(&SessionMachineInput::LogoutFailed);
                Err(e)
            }
        }
    }

    fn consume(&mut self, input: &SessionMachineInput) -> ClientResult<()> {
        let from = format!("{:?}", self.machine.state());
        self.machine
            .consume(input)
            .map(|_| ())
            .map_err(|_| ClientError::State(format!("invalid session transition from {from}")))
    }
}
