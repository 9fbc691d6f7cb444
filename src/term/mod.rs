use amos::mach::{Io, Part, Program, Scheduler, Val};
use ansi_term::{Colour, Style};
use linefeed::{DefaultTerminal, Interface, ReadResult, Signal};
use rand::rngs::ThreadRng;
use rand::Rng;
use std::convert::TryFrom;
use std::io::{self, BufRead, Write};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Run a program to completion, or until Ctrl-C. Ctrl-C is noticed between
/// slices, so a tight loop still stops at its next yield.
pub fn run(program: &Rc<Program>) -> io::Result<()> {
    let interrupted = Arc::new(AtomicBool::new(false));
    let int_moved = interrupted.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        int_moved.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Ctrl-C handler not installed");
    }

    let mut runtime = program.bind(Terminal::new(interrupted.clone()));
    let finished = {
        let mut scheduler = Scheduler::new();
        scheduler.spawn(&mut runtime);
        scheduler.run_until(|| interrupted.load(Ordering::SeqCst))
    };
    if !finished {
        let msg = format!("BREAK IN {}", runtime.ip());
        runtime.io_mut().error(&msg);
    } else if let Some(e) = runtime.error() {
        let msg = e.to_string();
        runtime.io_mut().error(&msg);
    }
    Ok(())
}

/// `Io` for an interactive terminal. Falls back to plain stdio when there
/// is no tty.
pub struct Terminal {
    interface: Option<Interface<DefaultTerminal>>,
    interrupted: Arc<AtomicBool>,
    rng: ThreadRng,
    style: Style,
}

impl Terminal {
    pub fn new(interrupted: Arc<AtomicBool>) -> Terminal {
        let interface = match Interface::new("AMOS") {
            Ok(interface) => {
                interface.set_report_signal(Signal::Interrupt, true);
                Some(interface)
            }
            Err(e) => {
                debug!(error = %e, "no line editor, using stdio");
                None
            }
        };
        Terminal {
            interface,
            interrupted,
            rng: rand::thread_rng(),
            style: Style::new(),
        }
    }

    pub fn error(&mut self, msg: &str) {
        let text = Colour::Red.bold().paint(msg).to_string();
        if let Err(e) = self.write(&text) {
            warn!(error = %e, "terminal write failed");
        }
    }

    fn write(&self, text: &str) -> io::Result<()> {
        match &self.interface {
            Some(interface) => interface.write_fmt(format_args!("{}\n", text)),
            None => writeln!(io::stdout(), "{}", text),
        }
    }

    fn read(&self, prompt: &str) -> io::Result<Option<String>> {
        let interface = match &self.interface {
            Some(interface) => interface,
            None => {
                let mut stdout = io::stdout();
                write!(stdout, "{}", prompt)?;
                stdout.flush()?;
                let mut line = String::new();
                if io::stdin().lock().read_line(&mut line)? == 0 {
                    return Ok(None);
                }
                return Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()));
            }
        };
        interface.set_prompt(prompt)?;
        match interface.read_line()? {
            ReadResult::Input(line) => {
                interface.add_history_unique(line.clone());
                Ok(Some(line))
            }
            ReadResult::Signal(_) | ReadResult::Eof => Ok(None),
        }
    }
}

fn colour(part: Option<&Part>) -> Option<Colour> {
    let val = part.and_then(|p| p.args.first())?;
    let n = i32::try_from(val.clone()).ok()?;
    Some(Colour::Fixed((n & 0xFF) as u8))
}

impl Io for Terminal {
    fn print(&mut self, text: &str) {
        let text = self.style.paint(text).to_string();
        if let Err(e) = self.write(&text) {
            warn!(error = %e, "terminal write failed");
        }
    }

    fn input(&mut self, prompt: Option<&str>) -> String {
        match self.read(prompt.unwrap_or("")) {
            Ok(Some(line)) => line,
            Ok(None) => {
                self.interrupted.store(true, Ordering::SeqCst);
                String::new()
            }
            Err(e) => {
                warn!(error = %e, "terminal read failed");
                String::new()
            }
        }
    }

    fn func(&mut self, name: &str, args: &[Val]) -> Option<Val> {
        let first = args.first().cloned().unwrap_or_default();
        let val = match name {
            "LEN" => Val::from(first.to_string().chars().count() as f64),
            "VAL" => Val::from(first.to_string().trim().parse::<f64>().unwrap_or(0.0)),
            "STR$" => Val::from(first.to_string()),
            "UPPER$" => Val::from(first.to_string().to_uppercase()),
            "LOWER$" => Val::from(first.to_string().to_lowercase()),
            "ABS" => Val::from(f64::try_from(first).ok()?.abs()),
            "INT" => Val::from(f64::try_from(first).ok()?.floor()),
            "RND" => {
                let n = i32::try_from(first).ok()?;
                if n <= 0 {
                    Val::from(0)
                } else {
                    Val::from(self.rng.gen_range(0..=n))
                }
            }
            "TIME$" => Val::from(chrono::Local::now().format("%H:%M:%S").to_string()),
            "DATE$" => Val::from(chrono::Local::now().format("%d/%m/%Y").to_string()),
            _ => {
                debug!(name, "unknown function");
                return None;
            }
        };
        Some(val)
    }

    fn call(&mut self, name: &str, args: &[Val]) {
        debug!(name, args = args.len(), "call ignored");
    }

    fn cmd(&mut self, name: &str, parts: &[Part]) {
        match name {
            "CLS" => {
                if let Err(e) = self.write("\x1b[2J\x1b[H") {
                    warn!(error = %e, "terminal write failed");
                }
            }
            "INK" => {
                if let Some(c) = colour(parts.first()) {
                    self.style = self.style.fg(c);
                }
            }
            "PAPER" => {
                if let Some(c) = colour(parts.first()) {
                    self.style = self.style.on(c);
                }
            }
            _ => debug!(name, parts = parts.len(), "command ignored"),
        }
    }
}
