use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use verbox::ai::{Conversation, GeminiClient, GenerativeApi, QUICK_ACTIONS};
use verbox::bookmarks::{
    self, BookmarkQuery, Bookmarks, PartOfSpeechFilter, SortDirection, SortKey,
};
use verbox::capabilities::{
    AudioPlayer, ClipboardWriter, DirectoryDownloader, SpeechSynthesizer, SystemClipboard,
};
use verbox::config::Config;
use verbox::dictionary::{FreeDictionaryClient, LookupFlow};
use verbox::entry::WordEntry;
use verbox::storage::{FileStore, KeyValueStore};
use verbox::theme::ThemePreference;
use verbox::types::{Rating, Role};

const HELP: &str = "\
commands:
  search <word>              look a word up
  audio                      play the pronunciation
  bookmark                   save or unsave the displayed word
  open <word>                show a saved word
  list [term]                list saved words matching a term
  filter <part|all>          filter saved words by part of speech
  sort <word|date|part> <asc|desc>
  select <word> | select-all | delete-selected
  export                     save the current list as JSON
  ask <question>             talk to the assistant
  rate <up|down> | copy | speak | clear-chat
  theme                      toggle dark mode
  quit";

/// Prints the URL instead of playing it
struct TerminalAudio;

impl AudioPlayer for TerminalAudio {
    fn play(&self, url: &str) {
        println!("▶ {url}");
    }
}

/// No speech engine in a terminal; echo what would be read
struct TerminalSpeech;

impl SpeechSynthesizer for TerminalSpeech {
    fn speak(&self, text: &str, rate: f32) {
        println!("🔊 ({rate}x) {text}");
    }
}

struct App {
    lookup: LookupFlow,
    bookmarks: Bookmarks,
    chat: Conversation,
    theme: ThemePreference,
    query: BookmarkQuery,
    export: DirectoryDownloader,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("verbox=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env();
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.data_dir.clone()));
    let dictionary =
        FreeDictionaryClient::new(config.dictionary_api_url.clone(), config.http_timeout);
    let assistant = config.gemini_api_key.clone().map(|key| {
        Arc::new(GeminiClient::new(
            config.gemini_api_url.clone(),
            config.gemini_model.clone(),
            key,
            config.http_timeout,
        )) as Arc<dyn GenerativeApi>
    });

    let mut app = App {
        lookup: LookupFlow::new(Arc::new(dictionary)),
        bookmarks: Bookmarks::load(Arc::clone(&store)),
        chat: Conversation::new(assistant),
        theme: ThemePreference::load(store),
        query: BookmarkQuery::default(),
        export: config
            .export_dir
            .clone()
            .map(DirectoryDownloader::new)
            .unwrap_or_else(DirectoryDownloader::default_location),
    };

    tracing::info!(
        data_dir = %config.data_dir.display(),
        assistant = app.chat.has_credential(),
        "verbox started"
    );
    println!("VerboX ({} mode). Type `help` for commands.", theme_label(&app.theme));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        match command {
            "" => {}
            "quit" | "exit" | "q" => break,
            "help" => println!("{HELP}"),
            "search" | "define" => search(&mut app, rest).await,
            "audio" => {
                if let Err(err) = app.lookup.play_audio(&TerminalAudio) {
                    println!("{err}");
                }
            }
            "bookmark" => match app.lookup.current() {
                Some(entry) => {
                    let saved = app.bookmarks.toggle(entry);
                    println!("{} {}", if saved { "★ saved" } else { "☆ removed" }, entry.word);
                }
                None => println!("Search for a word first."),
            },
            "open" => match app.bookmarks.get(rest).cloned() {
                Some(entry) => {
                    app.lookup.select_bookmark(entry);
                    if let Some(entry) = app.lookup.current() {
                        print_entry(entry, true);
                    }
                }
                None => println!("\"{rest}\" is not saved."),
            },
            "remove" => {
                if !app.bookmarks.remove(rest) {
                    println!("This word is not saved.");
                }
            }
            "list" => {
                app.query.search = rest.to_string();
                print_bookmarks(&app);
            }
            "filter" => {
                app.query.part_of_speech = PartOfSpeechFilter::parse(rest);
                print_bookmarks(&app);
            }
            "sort" => {
                let mut parts = rest.split_whitespace();
                app.query.sort_key = match parts.next() {
                    Some("word") => SortKey::Word,
                    Some("part") => SortKey::PartOfSpeech,
                    _ => SortKey::Date,
                };
                app.query.direction = match parts.next() {
                    Some("asc") => SortDirection::Asc,
                    _ => SortDirection::Desc,
                };
                print_bookmarks(&app);
            }
            "select" => app.bookmarks.toggle_selected(rest),
            "select-all" => {
                let view = app.bookmarks.query(&app.query);
                app.bookmarks.toggle_select_all(&view);
                println!("{} selected", app.bookmarks.selected().len());
            }
            "delete-selected" => {
                let removed = app.bookmarks.delete_selected();
                println!("Deleted {removed} word(s).");
            }
            "export" => {
                let view = app.bookmarks.query(&app.query);
                match app.bookmarks.export_to(&view, &app.export) {
                    Ok(path) => println!("Exported {} word(s) to {}", view.len(), path.display()),
                    Err(err) => println!("Export failed: {err}"),
                }
            }
            "ask" => ask(&mut app, rest).await,
            "rate" => {
                let rating = if rest == "down" { Rating::Down } else { Rating::Up };
                if let Some(id) = last_assistant_id(&app.chat) {
                    app.chat.rate(id, rating);
                }
            }
            "copy" => {
                if let Some(id) = last_assistant_id(&app.chat) {
                    copy(&app.chat, id);
                }
            }
            "speak" => {
                if let Some(id) = last_assistant_id(&app.chat) {
                    app.chat.speak_message(id, &TerminalSpeech);
                }
            }
            "clear-chat" => {
                app.chat.clear_chat();
                print_transcript_tail(&app.chat, 1);
            }
            "theme" => {
                app.theme.toggle();
                println!("{} mode", theme_label(&app.theme));
            }
            other => println!("Unknown command {other}."),
        }
    }
    Ok(())
}

async fn search(app: &mut App, word: &str) {
    match app.lookup.search_word(word).await {
        Ok(()) => {
            if let Some(entry) = app.lookup.current() {
                print_entry(entry, app.bookmarks.contains(&entry.word));
            }
        }
        Err(err) => println!("{err}"),
    }
}

async fn ask(app: &mut App, text: &str) {
    if app.chat.is_fresh() && text.is_empty() {
        for action in &QUICK_ACTIONS {
            println!("  {}: {}", action.label, action.prompt);
        }
        return;
    }
    if app.chat.send_message(text).await {
        print_transcript_tail(&app.chat, 1);
    }
}

fn copy(chat: &Conversation, id: u64) {
    let result = SystemClipboard::new().and_then(|mut clipboard| {
        let clipboard: &mut dyn ClipboardWriter = &mut clipboard;
        chat.copy_message(id, clipboard)
    });
    match result {
        Ok(true) => println!("Copied."),
        Ok(false) => {}
        Err(err) => println!("{err}"),
    }
}

fn last_assistant_id(chat: &Conversation) -> Option<u64> {
    chat.messages()
        .iter()
        .rev()
        .find(|msg| msg.role == Role::Assistant)
        .map(|msg| msg.id)
}

fn theme_label(theme: &ThemePreference) -> &'static str {
    if theme.is_dark() { "dark" } else { "light" }
}

fn print_prompt() {
    use std::io::Write;
    print!(">> ");
    let _ = std::io::stdout().flush();
}

fn print_entry(entry: &WordEntry, saved: bool) {
    let star = if saved { '★' } else { '☆' };
    match &entry.phonetic {
        Some(phonetic) => println!("{star} {} {phonetic}", entry.word),
        None => println!("{star} {}", entry.word),
    }
    for meaning in &entry.meanings {
        println!("    {}:", meaning.part_of_speech);
        let definition = meaning.definitions.first();
        println!(
            "        {}",
            definition.map(|d| d.definition.as_str()).unwrap_or("N/A")
        );
        if let Some(example) = definition.and_then(|d| d.example.as_deref()) {
            println!("          example: \"{example}\"");
        }
        if !meaning.synonyms.is_empty() {
            println!("      synonyms: {}", meaning.synonyms.join(", "));
        }
    }
}

fn print_bookmarks(app: &App) {
    let view = app.bookmarks.query(&app.query);
    if app.bookmarks.is_empty() {
        println!("No bookmarks yet. Search for words to save them!");
        return;
    }
    println!(
        "{} of {} saved word(s); parts of speech: {}",
        view.len(),
        app.bookmarks.len(),
        app.bookmarks.parts_of_speech().join(", ")
    );
    for entry in &view {
        let mark = if app.bookmarks.is_selected(&entry.word) { "[x]" } else { "[ ]" };
        println!("{mark} {}  {}", entry.word, bookmarks::preview(entry));
    }
}

fn print_transcript_tail(chat: &Conversation, count: usize) {
    let messages = chat.messages();
    for msg in &messages[messages.len().saturating_sub(count)..] {
        let who = match msg.role {
            Role::User => "you",
            Role::Assistant => "assistant",
        };
        println!("[{who}] {}", msg.content);
    }
}
