//! Command implementations
//!
//! Word commands resolve the identity mode first, which also runs the
//! load-time guest-word migration for a signed-in user. Account commands
//! only touch the stored session, so they keep working while the identity
//! provider is unreachable.

use anyhow::{Context, Result};
use mywords_core::identity::CookieJar;
use mywords_core::story::{Segment, StoryWord, highlight, validate_word_count};
use mywords_core::{
    Authenticator, MigrationEngine, MigrationReport, Mode, ProviderRegistry, RemoteWords,
    SignUpOutcome, LocalWordStore, Word, WordList, WordStatus,
};
use std::io::{BufRead, IsTerminal, Write};

use crate::api::ApiClient;
use crate::cli::Commands;
use crate::config::CliConfig;

/// Everything a command needs, wired from configuration
pub struct App {
    auth: Authenticator,
    local: LocalWordStore,
    remote: RemoteWords,
    api: ApiClient,
}

impl App {
    pub async fn new(config: &CliConfig) -> Result<Self> {
        let core = config.core()?;

        let registry = ProviderRegistry::with_builtin_storage();
        mywords_provider_supabase::register(&registry);

        let storage = registry
            .create_device_storage(&core.device)
            .await
            .context("Failed to open device storage")?;
        let identity = registry.create_identity_provider(&core.backend)?;
        let store = registry.create_word_store(&core.backend)?;

        let local = LocalWordStore::new(storage.clone());
        let remote = RemoteWords::new(store);
        let migration = MigrationEngine::new(local.clone(), remote.clone());

        let mut auth = Authenticator::new(identity, storage.clone(), migration);
        if let Some(redirect) = &core.client.email_redirect_to {
            auth = auth.with_email_redirect(redirect.clone());
        }

        let api = ApiClient::new(&core.client.api_url, CookieJar::new(storage))?;

        Ok(Self {
            auth,
            local,
            remote,
            api,
        })
    }

    pub async fn run(&self, command: Commands) -> Result<()> {
        if !command.acts_on_words() {
            return self.run_account_command(command).await;
        }

        let mode = self.auth.resolve_mode().await?;
        tracing::debug!(mode = mode.label(), "Resolved identity mode");
        self.run_word_command(mode, command).await
    }

    async fn run_account_command(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Guest => self.guest().await,
            Commands::Login { email, password } => {
                let password = read_password(password)?;
                let (session, report) = self.auth.sign_in(&email, &password).await?;
                println!("Signed in as {}", session.user.email.as_deref().unwrap_or(&email));
                print_migration(&report);
                Ok(())
            }
            Commands::Signup { email, password } => {
                let password = read_password(password)?;
                match self.auth.sign_up(&email, &password).await? {
                    SignUpOutcome::Confirmed(_) => println!("Account created, you are signed in"),
                    SignUpOutcome::ConfirmationPending { email } => println!(
                        "Check {} for a confirmation link; your guest words will move over once you sign in",
                        email
                    ),
                }
                Ok(())
            }
            Commands::Logout => {
                self.auth.sign_out().await?;
                println!("Signed out");
                Ok(())
            }
            _ => anyhow::bail!("Word commands need a resolved identity mode"),
        }
    }

    async fn run_word_command(&self, mode: Mode, command: Commands) -> Result<()> {
        match command {
            Commands::Status => self.status(mode).await,
            Commands::Lookup { word, no_save } => self.lookup(mode, &word, no_save).await,
            Commands::List { status } => self.list(mode, status).await,
            Commands::Remove { id } => {
                self.words(mode)?.remove(&id).await?;
                println!("Removed {}", id);
                Ok(())
            }
            Commands::Toggle { id } => match self.words(mode)?.toggle_status(&id).await? {
                Some(status) => {
                    println!("{} is now {}", id, status);
                    Ok(())
                }
                None => anyhow::bail!("No word with id {}", id),
            },
            Commands::Learned { id } => self.set_status(mode, &id, WordStatus::Learned).await,
            Commands::Unlearned { id } => self.set_status(mode, &id, WordStatus::Unlearned).await,
            Commands::Story { ids } => self.story(mode, &ids).await,
            _ => anyhow::bail!("Account commands do not act on words"),
        }
    }

    /// Word operations for an identified caller
    fn words(&self, mode: Mode) -> Result<WordList> {
        if matches!(mode, Mode::None) {
            anyhow::bail!("Sign in with `mywords login` or run `mywords guest` first");
        }
        Ok(WordList::new(mode, self.local.clone(), self.remote.clone()))
    }

    async fn guest(&self) -> Result<()> {
        if self.auth.has_stored_session().await? {
            println!("Already signed in; words are saved to your account");
            return Ok(());
        }
        let id = self.auth.guest_mode().enable().await?;
        println!("Guest mode on ({}); words are kept on this device only", id);
        Ok(())
    }

    async fn status(&self, mode: Mode) -> Result<()> {
        match &mode {
            Mode::Authenticated(session) => println!(
                "Signed in as {}",
                session.user.email.as_deref().unwrap_or(session.user_id().as_str())
            ),
            Mode::Guest(id) => println!("Guest ({})", id),
            Mode::None => {
                println!("Not signed in. Run `mywords login` or `mywords guest`.");
                return Ok(());
            }
        }

        let words = self.words(mode)?.list().await?;
        let learned = words.iter().filter(|w| w.status == WordStatus::Learned).count();
        println!("{} words, {} learned", words.len(), learned);
        Ok(())
    }

    async fn lookup(&self, mode: Mode, word: &str, no_save: bool) -> Result<()> {
        let words = self.words(mode)?;
        let entry = self.api.lookup(word).await?;

        println!("{}  {}", entry.word, entry.phonetic);
        println!("  {}", entry.meaning);
        println!("  e.g. {}", entry.example);
        if let Some(info) = &entry.detailed_info {
            if let Some(pos) = &info.part_of_speech {
                println!("  part of speech: {}", pos);
            }
            if let Some(synonyms) = info.synonyms.as_ref().filter(|s| !s.is_empty()) {
                println!("  synonyms: {}", synonyms.join(", "));
            }
        }

        if no_save {
            return Ok(());
        }
        if words.save(&entry.into_word()).await? {
            println!("Saved");
        } else {
            println!("Already in your list");
        }
        Ok(())
    }

    async fn list(&self, mode: Mode, status: Option<WordStatus>) -> Result<()> {
        let words = self.words(mode)?.list().await?;
        let shown: Vec<&Word> = words
            .iter()
            .filter(|w| status.is_none_or(|s| w.status == s))
            .collect();

        if shown.is_empty() {
            println!("No words yet. Try `mywords lookup <word>`.");
            return Ok(());
        }
        for word in shown {
            println!("{}", render_row(word));
        }
        Ok(())
    }

    async fn set_status(&self, mode: Mode, id: &str, status: WordStatus) -> Result<()> {
        self.words(mode)?.update_status(id, status).await?;
        println!("{} is now {}", id, status);
        Ok(())
    }

    async fn story(&self, mode: Mode, ids: &[String]) -> Result<()> {
        let words = self.words(mode)?.list().await?;
        let selected: Vec<&Word> = if ids.is_empty() {
            words.iter().collect()
        } else {
            let mut selected = Vec::with_capacity(ids.len());
            for id in ids {
                let word = words
                    .iter()
                    .find(|w| &w.id == id)
                    .with_context(|| format!("No word with id {}", id))?;
                selected.push(word);
            }
            selected
        };

        validate_word_count(selected.len())?;

        let story_words: Vec<StoryWord> = selected.iter().map(|w| StoryWord::from(*w)).collect();
        let story = self.api.story(&story_words).await?;

        let tokens: Vec<&str> = selected.iter().map(|w| w.word.as_str()).collect();
        let styled = std::io::stdout().is_terminal();
        println!("{}\n", render_segments(&highlight(&story.english_text, &tokens), styled));
        println!("{}", story.translated_text);
        Ok(())
    }
}

fn print_migration(report: &MigrationReport) {
    if report.is_noop() {
        return;
    }
    println!(
        "Moved {} guest words into your account ({} already there)",
        report.migrated(),
        report.skipped()
    );
    if report.failed() > 0 {
        println!("{} words could not be moved and were dropped", report.failed());
    }
}

fn render_row(word: &Word) -> String {
    let mark = match word.status {
        WordStatus::Learned => "✓",
        WordStatus::Unlearned => " ",
    };
    format!(
        "[{}] {}  {:<16} {}",
        mark,
        word.id,
        word.word,
        word.meaning
    )
}

fn render_segments(segments: &[Segment], styled: bool) -> String {
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Plain(text) => text.clone(),
            Segment::Highlight(text) if styled => format!("\x1b[1;4m{}\x1b[0m", text),
            Segment::Highlight(text) => format!("*{}*", text),
        })
        .collect()
}

fn read_password(arg: Option<String>) -> Result<String> {
    if let Some(password) = arg.or_else(|| std::env::var("MYWORDS_PASSWORD").ok()) {
        return Ok(password);
    }

    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password")?;

    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        anyhow::bail!("Password cannot be empty");
    }
    Ok(password)
}
