use std::fmt::Display;

use clap::{error::ErrorKind, CommandFactory, Parser};

/// Standard input filename
const STDIN_FILE: &str = "-";

const USAGE_SHORT: &str = r#"
This program accepts one raw weather product on its input and decodes it. Accepted products are printed as a single JSON object. Products which are malformed, or which do not meet the acceptance policy, print nothing and exit with status 2.

See --help for more details.
"#;

const USAGE_LONG: &str = r#"
This program accepts one raw weather product on its input and decodes it. Accepted products are printed as a single JSON object. Products which are malformed, or which do not meet the acceptance policy, print nothing and exit with status 2.

Two product shapes are supported:

* NWWS-OI transport stanzas carrying an entity-encoded CAP XML document; and
* legacy plain-text bulletins carrying a P-VTEC token, like
  /O.NEW.KDMX.SV.W.0030.240521T2254Z-240521T2330Z/

By default the shape is guessed from the input: payloads which begin with "<" are treated as CAP stanzas, and everything else as plain text. Use --cap or --plain to force a shape.

You can pipe in an archived product

    capdec < product.txt

or name it directly

    capdec --file product.xml --cap

Exit status is 0 when an alert is emitted, 2 when the product is discarded, and 1 on any other error.
"#;

/// Top-level program arguments
#[derive(Parser, Clone, Debug)]
#[command(version)]
#[command(about, long_about = None)]
#[command(after_help = USAGE_SHORT, after_long_help = USAGE_LONG)]
#[command(max_term_width = 100)]
pub struct Args {
    /// Verbosity level (-vvv for more)
    #[arg(short, long, default_value_t = 0, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print NOTHING, not even accepted alerts
    #[arg(short, long)]
    pub quiet: bool,

    /// Input file (or "-" for stdin)
    ///
    /// The input must be one complete product: either a transport
    /// stanza with a CAP document or a plain-text bulletin.
    #[arg(long, default_value_t = STDIN_FILE.to_string())]
    pub file: String,

    /// Treat the input as a CAP transport stanza
    #[arg(long, conflicts_with = "plain")]
    pub cap: bool,

    /// Treat the input as a plain-text bulletin
    #[arg(long, conflicts_with = "cap")]
    pub plain: bool,

    /// Pretty-print the output JSON
    #[arg(long)]
    pub pretty: bool,
}

impl Args {
    /// Return true if the user requests input from stdin
    pub fn input_is_stdin(&self) -> bool {
        self.file == STDIN_FILE
    }
}

/// A program-level error with exit code
#[derive(Debug)]
pub struct CliError {
    error: anyhow::Error,
    exit_code: i32,
}

impl CliError {
    /// Create new error with a custom exit code
    pub fn new(error: anyhow::Error, code: i32) -> CliError {
        CliError {
            error,
            exit_code: code,
        }
    }

    /// Print this error to the terminal
    ///
    /// Errors from clap are printed verbatim. Other types of errors
    /// are printed indirectly via clap's fancy formatter.
    pub fn print(&self) -> std::io::Result<()> {
        if let Some(e) = self.error.downcast_ref::<clap::Error>() {
            e.print()
        } else {
            Args::command()
                .error(ErrorKind::Format, self.to_string())
                .print()
        }
    }

    /// Print this error to the terminal and exit
    pub fn exit(&self) -> ! {
        drop(self.print());
        std::process::exit(self.exit_code);
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.error)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> CliError {
        CliError::new(err, 1)
    }
}

impl From<clap::Error> for CliError {
    fn from(err: clap::Error) -> CliError {
        let code = if err.use_stderr() { 1 } else { 0 };
        CliError::new(err.into(), code)
    }
}
