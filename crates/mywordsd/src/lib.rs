// # mywordsd
//
// HTTP service in front of the text oracle and the identity provider.
//
// ## Routes
//
// - `GET /api/word?word=<token>`: dictionary entry for one word
// - `POST /api/generate-story`: story plus translation for 10-20 words
// - `GET /auth/callback?code=<token>`: email confirmation landing
// - anything else: the static frontend, when `MYWORDS_STATIC_DIR` is set
//
// Every request passes the route gate first. This crate is a thin layer:
// prompts, parsing and gating rules live in `mywords-core`.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;

pub use config::Config;
pub use server::{AppState, SharedState, router, run};
