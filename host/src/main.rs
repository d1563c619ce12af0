use host::command::{COMPETITIVE_PROMPT, SOLO_PROMPT};
use host::{
    ascii_board, Command, Difficulty, Direction, Frontend, GameConfig, GameEvent, GameLoop,
    ModeKind, Session, Turn,
};
use std::env;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tokio::signal;
use tokio::sync::mpsc::UnboundedSender;

/// Prints the board and messages to the terminal
struct TerminalFrontend;

impl Frontend for TerminalFrontend {
    fn redraw(&mut self, session: &Session, overlay: Option<&[Direction]>) {
        println!();
        println!("{}", ascii_board(session, overlay));
        if session.is_running() {
            let prompt = match session.mode().turn() {
                None => SOLO_PROMPT,
                Some(Turn::Human) => COMPETITIVE_PROMPT,
                Some(Turn::Ai) => return,
            };
            print!("{}", prompt);
            let _ = std::io::stdout().flush();
        }
    }

    fn message(&mut self, text: &str) {
        println!("{}", text);
    }
}

/// Parsed command line
struct Options {
    config: GameConfig,
    load: bool,
}

#[tokio::main]
async fn main() {
    // Initialize tracing for debug output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    println!("🧩 Welcome to the Maze Game!");
    println!("{}", "=".repeat(70));

    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage(&args[0]);
        return;
    }

    let options = parse_args(&args).unwrap_or_else(|e| {
        eprintln!("❌ Error: {}", e);
        print_usage(&args[0]);
        std::process::exit(1);
    });

    let config = options.config.with_env_overrides().unwrap_or_else(|e| {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    });

    println!("  Maze size: {}x{}", config.width, config.height);
    println!("  Mode: {}", config.mode);
    if let Some(seed) = config.seed {
        println!("  Seed: {}", seed);
    }
    println!("  Save file: {}", config.save_path.display());
    println!();

    let session = if options.load {
        match Session::load(&config.save_path, &config) {
            Ok(session) => {
                println!("📂 Continuing the loaded game...");
                Some(session)
            }
            Err(e) => {
                println!("No saved game found or error occurred ({}). Starting a new game...", e);
                None
            }
        }
    } else {
        None
    };

    let session = match session {
        Some(session) => Ok(session),
        None => Session::new(&config),
    };
    let session = match session {
        Ok(session) => session,
        Err(e) => {
            eprintln!("❌ Error starting game: {}", e);
            std::process::exit(1);
        }
    };

    let mut game = GameLoop::new(session, config, TerminalFrontend);
    spawn_input_reader(game.sender());

    let quit = game.sender();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            let _ = quit.send(GameEvent::Command(Command::Quit));
        }
    });

    match game.run().await {
        Ok(Some(outcome)) => {
            println!();
            println!("🏁 Finished in {}", host::format_time(outcome.elapsed_secs));
        }
        Ok(None) => println!("👋 Bye!"),
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
    println!("{}", "=".repeat(70));

    // The input thread is still blocked reading stdin
    std::process::exit(0);
}

/// Read commands from stdin on a plain thread and post them into the loop
fn spawn_input_reader(events: UnboundedSender<GameEvent>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<Command>() {
                Ok(command) => {
                    if events.send(GameEvent::Command(command)).is_err() {
                        return;
                    }
                }
                Err(e) => eprintln!("❌ {}", e),
            }
        }
        let _ = events.send(GameEvent::InputClosed);
    });
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut config = GameConfig::default();
    let mut load = false;
    let mut iter = args.iter().skip(1);

    while let Some(arg) = iter.next() {
        let mut value = || {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("{} requires a value", arg))
        };

        match arg.as_str() {
            "--difficulty" => {
                let difficulty: Difficulty = value()?.parse()?;
                config.width = difficulty.size();
                config.height = difficulty.size();
            }
            "--size" => {
                let size = value()?;
                let (w, h) = size
                    .split_once('x')
                    .ok_or_else(|| format!("Invalid size '{}'. Expected WxH, e.g. 15x10", size))?;
                config.width = w
                    .parse()
                    .map_err(|_| format!("Invalid width '{}'", w))?;
                config.height = h
                    .parse()
                    .map_err(|_| format!("Invalid height '{}'", h))?;
            }
            "--mode" => {
                config.mode = value()?.parse::<ModeKind>()?;
            }
            "--seed" => {
                let seed = value()?;
                config.seed = Some(seed.parse().map_err(|_| {
                    format!("Invalid maze seed '{}'. Must be a positive integer.", seed)
                })?);
            }
            "--cell-size" => {
                let size = value()?;
                config.cell_size = size
                    .parse()
                    .map_err(|_| format!("Invalid cell size '{}'", size))?;
            }
            "--save-file" => {
                config.save_path = PathBuf::from(value()?);
            }
            "--load" => load = true,
            other => return Err(format!("Unknown option: {}", other)),
        }
    }

    config.validate().map_err(|e| e.to_string())?;
    Ok(Options { config, load })
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [options]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --difficulty <easy|medium|hard>");
    eprintln!("      Square maze of 10x10, 20x20 or 30x30 cells (default: easy)");
    eprintln!("  --size <WxH>");
    eprintln!("      Any maze size, e.g. 15x10");
    eprintln!("  --mode <solo|competitive>");
    eprintln!("      Play alone, or take turns against the AI (default: solo)");
    eprintln!("  --seed <N>");
    eprintln!("      Seed for maze generation; same seed, same mazes");
    eprintln!("  --cell-size <PX>");
    eprintln!("      Cell size for drawing, at least 10 (default: 20)");
    eprintln!("  --save-file <PATH>");
    eprintln!("      Where save/load read and write (default: savegame.json)");
    eprintln!("  --load");
    eprintln!("      Continue the last saved game");
    eprintln!();
    eprintln!("Commands while playing:");
    eprintln!("  w/a/s/d  Move up/left/down/right");
    eprintln!("  solve    Show the full path to the exit (solo only)");
    eprintln!("  next     Show the next 10 steps (solo only)");
    eprintln!("  save     Save the game");
    eprintln!("  load     Load the saved game");
    eprintln!("  q        Quit");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  MAZE_SAVE_FILE          Overrides the save file path");
    eprintln!("  MAZE_REGENERATION_SECS  Overrides the 180 second regeneration interval");
    eprintln!("  RUST_LOG                Log filter, e.g. RUST_LOG=debug");
}
