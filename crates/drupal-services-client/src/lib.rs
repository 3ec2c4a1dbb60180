//! Network layer for a Drupal-Services-style REST entity API.
//!
//! This crate provides:
//! - [`ServicesClient`]: one HTTP client with credentialed transport and a
//!   token-injecting request interceptor for every entity operation
//! - [`TokenStore`]: single-flight cache for the anti-forgery token
//! - [`Session`]: explicit FSM-based login/logout lifecycle
//! - Entity and collection fetch/save operations over the models in
//!   `drupal-entity-model`

mod client;
mod config;
mod error;
mod session;
mod token;

pub use client::{ConnectResponse, FetchOptions, LoginResponse, ServicesClient, CSRF_HEADER};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use session::{Session, SessionMachine, SessionMachineInput, SessionMachineState, SessionState};
pub use token::{TokenSource, TokenStore};

pub use drupal_entity_model::{kind, CoercionMode, Entity, EntityCollection, EntityKind};
