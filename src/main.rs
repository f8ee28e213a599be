use clap::Parser;
use ndproof::rules::{InputKind, Outcome, Rule};
use ndproof::{Config, Session};
use std::io::{BufRead, Write};
use tracing::Level;

/// Interactive natural deduction for first-order logic.
///
/// Reads commands from standard input:
///   show                    print the proof
///   apply <rule> <line>...  apply a rule to the selected lines
///   input <text>            answer the question of the pending rule
///   cancel                  abandon the pending rule
///   check                   run the completion pass
///   rules                   list the rule names
///   quit
#[derive(Parser)]
#[command(name = "ndproof", version, verbatim_doc_comment)]
struct Cli {
  /// Print formulas with ASCII operators
  #[arg(long)]
  ascii: bool,
  /// Print the proof as JSON
  #[arg(long)]
  json: bool,
  /// Do not close goals automatically after each rule
  #[arg(long)]
  no_auto_complete: bool,
  /// More log output on stderr (-v, -vv, -vvv)
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
  /// The formula to prove
  goal: String,
  /// The formulas to prove it from
  givens: Vec<String>,
}

fn show(session: &Session, json: bool) {
  let Some(snap) = session.snapshot() else { return };
  if json {
    match snap.to_json() {
      Ok(s) => println!("{s}"),
      Err(e) => eprintln!("error: {e}"),
    }
  } else {
    print!("{snap}")
  }
}

fn prompt(session: &Session) {
  let Some(req) = session.request() else { return };
  println!("{}", req.prompt);
  match &req.kind {
    InputKind::Formula => println!("  (input <formula>)"),
    InputKind::Terms(n) => println!("  (input <{n} comma separated term(s)>)"),
    InputKind::Choice(opts) =>
      for (i, opt) in opts.iter().enumerate() {
        println!("  {}: {opt}", i + 1)
      },
  }
}

fn apply(session: &mut Session, args: &str) -> Result<Outcome, String> {
  let mut words = args.split_whitespace();
  let rule = words.next().ok_or("usage: apply <rule> <line>...")?.parse::<Rule>()?;
  let lines = words
    .map(|w| w.parse::<u32>().map_err(|_| format!("'{w}' is not a line number")))
    .collect::<Result<Vec<_>, _>>()?;
  session.apply(rule, &lines).map_err(|e| e.to_string())
}

fn main() {
  let cli = Cli::parse();
  let level = match cli.verbose {
    0 => Level::WARN,
    1 => Level::INFO,
    2 => Level::DEBUG,
    _ => Level::TRACE,
  };
  tracing_subscriber::fmt().with_writer(std::io::stderr).with_max_level(level).without_time().init();

  let mut cfg = Config::DEFAULT;
  cfg.ascii = cli.ascii || std::env::var("NDPROOF_ASCII").is_ok();
  cfg.auto_complete = !cli.no_auto_complete;
  cfg.check_skolem_scope = std::env::var("NDPROOF_NO_SKOLEM_CHECK").is_err();

  let mut session = Session::new(cfg);
  if let Err(e) = session.start(cli.givens.iter().map(|s| &**s), &cli.goal) {
    eprintln!("error: {e}");
    std::process::exit(1)
  }
  show(&session, cli.json);

  let stdin = std::io::stdin();
  loop {
    print!("> ");
    let _ = std::io::stdout().flush();
    let mut line = String::new();
    match stdin.lock().read_line(&mut line) {
      Ok(0) => break,
      Ok(_) => {}
      Err(e) => {
        eprintln!("error: {e}");
        break
      }
    }
    let line = line.trim();
    let (cmd, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let res = match cmd {
      "" => continue,
      "quit" | "exit" => break,
      "show" => Ok(None),
      "rules" => {
        for r in Rule::ALL {
          println!("{:5} {}", r.name(), r.aliases().join(", "))
        }
        continue
      }
      "apply" => apply(&mut session, rest).map(Some),
      "input" => session.resume_text(rest.trim()).map(Some).map_err(|e| e.to_string()),
      "cancel" => {
        if !session.cancel() {
          eprintln!("nothing to cancel")
        }
        continue
      }
      "check" => session.check().map(|_| None).map_err(|e| e.to_string()),
      _ => Err(format!("unknown command '{cmd}'")),
    };
    match res {
      Ok(Some(Outcome::NeedsInput(_))) => prompt(&session),
      Ok(_) => show(&session, cli.json),
      Err(e) => eprintln!("error: {e}"),
    }
  }
}
