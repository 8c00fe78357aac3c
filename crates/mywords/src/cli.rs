//! Command-line definition

use clap::{Parser, Subcommand};
use mywords_core::WordStatus;

#[derive(Parser, Debug)]
#[command(name = "mywords")]
#[command(about = "MyWords - build an English vocabulary list, as a guest or signed in", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); logs go to stderr
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Continue without an account; words stay on this device
    Guest,

    /// Sign in; guest words on this device move into the account
    Login {
        #[arg(long)]
        email: String,
        /// Read from MYWORDS_PASSWORD or stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Create an account
    Signup {
        #[arg(long)]
        email: String,
        /// Read from MYWORDS_PASSWORD or stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign out of this device
    Logout,

    /// Show who you are and how many words you have
    Status,

    /// Look up a word and add it to your list
    Lookup {
        word: String,
        /// Only show the entry, do not save it
        #[arg(long)]
        no_save: bool,
    },

    /// List saved words, newest first
    List {
        /// Only words with this status (learned, unlearned)
        #[arg(long)]
        status: Option<WordStatus>,
    },

    /// Remove a word by id
    Remove { id: String },

    /// Flip a word between learned and unlearned
    Toggle { id: String },

    /// Mark a word as learned
    Learned { id: String },

    /// Mark a word as not yet learned
    Unlearned { id: String },

    /// Write a story using 10-20 of your words (all words when no ids are given)
    Story { ids: Vec<String> },
}

impl Commands {
    /// Word commands need the identity mode; account commands only touch the stored session
    pub fn acts_on_words(&self) -> bool {
        !matches!(
            self,
            Commands::Guest | Commands::Login { .. } | Commands::Signup { .. } | Commands::Logout
        )
    }
}
