//! colloq - a streaming chat client with persistent conversation threads.
//!
//! The backend answers each question with a `text/event-stream` of text
//! fragments followed by the full, final answer. This crate consumes that
//! stream under cancellation and keeps a persisted collection of threads
//! consistent through partial delivery, explicit stops and transport
//! failures.
//!
//! # Layers
//!
//! - [`sse`] - wire codec and Stream Reader
//! - [`conductor`] - [`ChatClient`](conductor::ChatClient), one streaming POST per exchange
//! - [`session`] - [`SessionController`](session::SessionController), the exchange state machine
//! - [`store`] - [`ThreadStore`](store::ThreadStore), durable threads with save-on-mutate
//!
//! # Example
//!
//! ```ignore
//! use colloq::config::ChatConfig;
//! use colloq::session::SessionController;
//!
//! let controller = SessionController::from_config(&ChatConfig::from_env());
//! let outcome = controller.ask(Some("hello")).await?;
//! ```

pub mod adapters;
pub mod cli;
pub mod conductor;
pub mod config;
pub mod error;
pub mod models;
pub mod prompts;
pub mod session;
pub mod sse;
pub mod store;
pub mod traits;
