use std::cell::Cell;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

use clap::{Args, Parser, Subcommand};
use speed_reader::{
    DirStore, EpubDocument, Error, Library, PlaybackEngine, PlaybackObservers,
    PunctuationMultipliers, ReaderSettings, ReadingProgress,
};

#[derive(Parser)]
#[command(name = "speed-reader", about = "Read EPUB books one word at a time")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show metadata and the table of contents
    Info {
        /// Input EPUB file
        book: PathBuf,
    },
    /// Play the book in the terminal
    Read(ReadArgs),
}

#[derive(Args)]
struct ReadArgs {
    /// Input EPUB file
    book: PathBuf,
    /// Words per minute (defaults to the saved rate, then 250)
    #[arg(long)]
    wpm: Option<u32>,
    /// Word index to start from (defaults to the saved position)
    #[arg(long)]
    from: Option<usize>,
    #[arg(long)]
    period: Option<f64>,
    #[arg(long)]
    comma: Option<f64>,
    /// Multiplier for semicolons and colons
    #[arg(long)]
    semicolon: Option<f64>,
    /// Multiplier for exclamation and question marks
    #[arg(long)]
    exclamation: Option<f64>,
    /// Where reading progress is kept (defaults to $SPEED_READER_DATA, then ~/.speed-reader)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let book = match &cli.command {
        Command::Info { book } | Command::Read(ReadArgs { book, .. }) => book,
    };
    if !book.is_file() {
        eprintln!("Error: file not found: {}", book.display());
        std::process::exit(1);
    }

    let result = match cli.command {
        Command::Info { book } => speed_reader::parse_file(&book).map(|doc| print_info(&doc)),
        Command::Read(args) => read(args),
    };
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn print_info(doc: &EpubDocument) {
    println!("{}", doc.title);
    println!("by {}", doc.author);
    println!("{} words, {} chapters", doc.total_words(), doc.chapters.len());
    println!();
    for entry in &doc.table_of_contents {
        println!("{:>9}  {}", entry.word_start_index, entry.title);
    }
}

fn data_dir(flag: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = flag {
        return dir;
    }
    if let Ok(dir) = std::env::var("SPEED_READER_DATA")
        && !dir.trim().is_empty()
    {
        return PathBuf::from(dir);
    }
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(".speed-reader")
}

fn multipliers(args: &ReadArgs) -> PunctuationMultipliers {
    let defaults = PunctuationMultipliers::default();
    PunctuationMultipliers {
        period: args.period.unwrap_or(defaults.period),
        comma: args.comma.unwrap_or(defaults.comma),
        semicolon: args.semicolon.unwrap_or(defaults.semicolon),
        exclamation: args.exclamation.unwrap_or(defaults.exclamation),
    }
}

fn read(args: ReadArgs) -> Result<(), Error> {
    let doc = speed_reader::parse_file(&args.book)?;

    let mut library = Library::new(DirStore::open(data_dir(args.data_dir.clone()))?);
    let book_id = match library.find_book(&doc.title, &doc.author)? {
        Some(stored) => stored.id,
        None => library.save_book(&doc)?,
    };
    let saved = library.progress(book_id)?;

    let settings = ReaderSettings {
        words_per_minute: args
            .wpm
            .or(saved.as_ref().map(|p| p.words_per_minute))
            .unwrap_or(speed_reader::DEFAULT_WORDS_PER_MINUTE),
        multipliers: multipliers(&args),
    };
    let start_at = args
        .from
        .or(saved.as_ref().map(|p| p.current_word_index))
        .unwrap_or(0);

    let crossed_chapter = Rc::new(Cell::new(None));
    let observers = PlaybackObservers::new().on_chapter_change({
        let crossed_chapter = Rc::clone(&crossed_chapter);
        move |chapter| crossed_chapter.set(Some(chapter))
    });
    let mut engine = PlaybackEngine::with_settings(settings, observers);
    engine.load_document(&doc);
    engine.navigate_to_word(start_at);
    engine.start();

    let mut stdout = std::io::stdout().lock();
    let mut shown = None;
    loop {
        // Paused on a chapter boundary: announce it and carry on.
        if let Some(chapter) = crossed_chapter.take() {
            if let Some(entry) = engine.state().current_chapter() {
                writeln!(stdout, "\n== {} ==\n", entry.title)?;
            }
            save_progress(&mut library, book_id, &engine, doc.total_words())?;
            log::debug!("continuing into chapter {chapter}");
            engine.start();
        }

        let state = engine.state();
        if shown != Some(state.current_word_index)
            && let Some(word) = state.current_word()
        {
            writeln!(stdout, "{word}")?;
            stdout.flush()?;
            shown = Some(state.current_word_index);
        }

        let Some(wait) = engine.time_until_next_event() else {
            break;
        };
        std::thread::sleep(wait);
        engine.advance(wait);
    }

    save_progress(&mut library, book_id, &engine, doc.total_words())
}

fn save_progress(
    library: &mut Library<DirStore>,
    book_id: speed_reader::BookId,
    engine: &PlaybackEngine,
    total_words: usize,
) -> Result<(), Error> {
    let state = engine.state();
    library.save_progress(&ReadingProgress::new(
        book_id,
        state.current_word_index,
        state.words_per_minute,
        total_words,
    ))
}
